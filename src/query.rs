//! Raw query-string access for the probe endpoints.
//!
//! axum's `Query` extractor percent-decodes every value, but `/greet` must
//! echo `mode` back exactly as sent while decoding `name`. These helpers work
//! on the undecoded query string instead: split on `&`, then on the first `=`.
//! Pairs without an `=` are ignored, and the first pair with a matching key
//! wins. Nothing is ever rejected.

use std::borrow::Cow;

/// Return the raw (undecoded) value for `key`, if present.
pub fn raw_param<'q>(query: Option<&'q str>, key: &str) -> Option<&'q str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Return the form-decoded value for `key`, if present.
///
/// `+` becomes a space and `%XX` escapes are decoded. Escapes that do not
/// decode to valid UTF-8 leave the value as sent; a client cannot make the
/// lookup fail.
pub fn decoded_param<'q>(query: Option<&'q str>, key: &str) -> Option<Cow<'q, str>> {
    raw_param(query, key).map(decode_component)
}

fn decode_component(raw: &str) -> Cow<'_, str> {
    let spaced: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };

    let decoded = match urlencoding::decode(&spaced) {
        Ok(Cow::Owned(decoded)) => Some(decoded),
        Ok(Cow::Borrowed(_)) | Err(_) => None,
    };
    decoded.map_or(spaced, Cow::Owned)
}
