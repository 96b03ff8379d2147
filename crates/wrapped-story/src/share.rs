//! URL-safe share tokens.
//!
//! A token is the camelCase JSON of an [`AnalyticsResult`] (raw user
//! messages are never serialized) encoded as unpadded URL-safe base64.
//! Decoding accepts padded tokens too and defaults missing chart arrays.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::debug;

use wrapped_types::{AnalyticsResult, WrappedError};

const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode analytics into a share token.
pub fn encode_share_token(analytics: &AnalyticsResult) -> Result<String, WrappedError> {
    let json = serde_json::to_vec(analytics)?;
    Ok(TOKEN_ENGINE.encode(json))
}

/// Decode a share token back into analytics.
///
/// The result has no raw user messages.
pub fn decode_share_token(token: &str) -> Result<AnalyticsResult, WrappedError> {
    let bytes = TOKEN_ENGINE
        .decode(token.trim())
        .map_err(|e| WrappedError::share_token(format!("not valid base64 ({e})")))?;
    let analytics: AnalyticsResult = serde_json::from_slice(&bytes)
        .map_err(|e| WrappedError::share_token(format!("unexpected payload ({e})")))?;
    debug!(
        platform = %analytics.platform,
        messages = analytics.total_messages,
        "Decoded share token"
    );
    Ok(analytics)
}
