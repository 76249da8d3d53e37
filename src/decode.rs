//! Bytes -> typed feed decoding

use crate::error::DecodeError;
use crate::kind::FeedKind;
use crate::model::timestamp::INVALID_TIMESTAMP;
use crate::model::{AnyFeed, Feed, Ios, MacOS, Platform};
use serde_json::error::Category;
use tracing::debug;

/// Decode a feed of variant `P` from UTF-8 JSON bytes
///
/// Unknown keys are ignored and missing keys take their default values. The
/// decode either returns a complete document or fails:
///
/// - [`DecodeError::Empty`] for zero-length input or input of JSON whitespace only
/// - [`DecodeError::Syntax`] for malformed or truncated JSON
/// - [`DecodeError::InvalidTimestamp`] for a date-time that is not RFC 3339
/// - [`DecodeError::Schema`] for a value of the wrong JSON type
///
/// # Examples
///
/// ```
/// use sofafeed::{decode, MacOS};
///
/// let feed = decode::<MacOS>(br#"{"OSVersions": []}"#).unwrap();
/// assert!(feed.os_versions.is_empty());
/// assert!(feed.installation_apps().is_none());
/// ```
pub fn decode<P: Platform>(data: &[u8]) -> Result<Feed<P>, DecodeError> {
    if data
        .iter()
        .all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
    {
        return Err(DecodeError::Empty);
    }

    let feed: Feed<P> = serde_json::from_slice(data).map_err(classify)?;
    debug!(
        kind = %P::KIND,
        os_versions = feed.os_versions.len(),
        update_hash = %feed.update_hash,
        "Decoded feed"
    );
    Ok(feed)
}

/// Decode a feed of variant `P` from JSON text. Same semantics as [`decode`].
pub fn decode_str<P: Platform>(data: &str) -> Result<Feed<P>, DecodeError> {
    decode(data.as_bytes())
}

/// Decode into the document shape chosen by `kind`
pub fn decode_kind(kind: FeedKind, data: &[u8]) -> Result<AnyFeed, DecodeError> {
    match kind {
        FeedKind::MacOS => decode::<MacOS>(data).map(AnyFeed::MacOS),
        FeedKind::Ios => decode::<Ios>(data).map(AnyFeed::Ios),
    }
}

fn classify(err: serde_json::Error) -> DecodeError {
    let (line, column) = (err.line(), err.column());
    match err.classify() {
        Category::Data if err.to_string().starts_with(INVALID_TIMESTAMP) => {
            DecodeError::InvalidTimestamp {
                line,
                column,
                source: err,
            }
        }
        Category::Data => DecodeError::Schema {
            line,
            column,
            source: err,
        },
        // Reading from a slice cannot fail with Io; treat it like a syntax failure
        Category::Syntax | Category::Eof | Category::Io => DecodeError::Syntax {
            line,
            column,
            source: err,
        },
    }
}
