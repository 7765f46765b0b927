//! Encoding of client-supplied redirect targets.
//!
//! The target is encoded, never rewritten: relative references stay
//! relative and are resolved by the browser against the request URL.
//! Characters that are not allowed in a URL come out percent-encoded and
//! tabs or line breaks are dropped, so the result is always safe to put in a
//! `Location` header. No allow-listing happens here.
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::{ParseError, Url};

// Bytes a URL reference may not carry literally. `%` is kept so targets that
// are already encoded are not encoded twice.
const UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Returns the encoded target, or `None` when the value is blank or is an
/// absolute URL that does not parse.
///
/// - absolute URLs are normalized and keep their scheme and host
/// - relative references (`home`, `?x=1`, `../x`, `//host/x`) are returned
///   as given, encoded
pub fn encode_untrusted(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match Url::parse(raw) {
        Ok(absolute) => Some(absolute.into()),
        Err(ParseError::RelativeUrlWithoutBase) => Some(encode_relative(raw)),
        Err(_) => None,
    }
}

fn encode_relative(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
        .collect();

    utf8_percent_encode(&stripped, UNSAFE).to_string()
}
