//! Local-time bucketing across a daylight-saving change.
//!
//! Lives in its own test binary because it pins the process time zone.

use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use wrapped_analytics::{Aggregator, Bucketing};
use wrapped_types::{Author, Conversation, Message, Platform};

#[test]
fn test_local_bucketing_uses_each_message_offset() {
    // US Eastern: UTC-5 in winter, UTC-4 in summer.
    std::env::set_var("TZ", "EST5EDT,M3.2.0,M11.1.0");

    // Both instants are Tuesday 23:30 on the local wall clock:
    // January 9 under EST and July 9 under EDT.
    let winter = Utc.with_ymd_and_hms(2024, 1, 10, 4, 30, 0).unwrap();
    let summer = Utc.with_ymd_and_hms(2024, 7, 10, 3, 30, 0).unwrap();
    let conversations = vec![Conversation::new(
        "c1",
        "Late nights",
        winter.timestamp(),
        vec![
            Message::new(Author::User, "winter reading list", winter),
            Message::new(Author::User, "summer reading list", summer),
        ],
    )];

    let a = Aggregator::new(Platform::Claude)
        .with_bucketing(Bucketing::Local)
        .aggregate_with_rng(&conversations, &mut StdRng::seed_from_u64(3))
        .unwrap();

    assert_eq!(a.busiest_day.day, "Tuesday");
    assert_eq!(a.busiest_day.count, 2);
    assert_eq!(a.busiest_hour.hour, "23:00");
    assert_eq!(a.busiest_hour.count, 2);
    let months: Vec<&str> = a.monthly_activity.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(months, vec!["Jan 2024", "Jul 2024"]);
    assert_eq!(a.active_days, 2);

    // A single offset cannot place both on the same wall-clock hour.
    let winter_offset = chrono::FixedOffset::west_opt(5 * 3600).unwrap();
    let fixed = Aggregator::new(Platform::Claude)
        .with_bucketing(Bucketing::Fixed(winter_offset))
        .aggregate_with_rng(&conversations, &mut StdRng::seed_from_u64(3))
        .unwrap();
    assert_eq!(fixed.busiest_hour.hour, "22:00");
    assert_eq!(fixed.busiest_hour.count, 1);
}
