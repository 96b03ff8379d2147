//! Wall-clock conversion for calendar bucketing.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, Utc};

/// Zone in which instants are assigned to days, hours and months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucketing {
    /// One offset for every instant
    Fixed(FixedOffset),
    /// Machine time zone, resolved per instant so daylight-saving changes
    /// within the history are honored
    Local,
}

impl Bucketing {
    /// Fixed at UTC.
    pub fn utc() -> Self {
        Bucketing::Fixed(Utc.fix())
    }

    /// Wall-clock time of `ts` in this zone.
    pub fn localize(&self, ts: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Bucketing::Fixed(offset) => ts.with_timezone(offset).naive_local(),
            Bucketing::Local => ts.with_timezone(&Local).naive_local(),
        }
    }
}

impl Default for Bucketing {
    fn default() -> Self {
        Self::utc()
    }
}
