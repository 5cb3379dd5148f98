//! Utility functions and types.

use std::borrow::Cow;
use std::fmt::Debug;

use percent_encoding::percent_decode_str;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

use crate::{Error, Result};

/// AsciiSet used when a query string has to be rebuilt from parameters.
///
/// Every byte except the unreserved characters `A-Z a-z 0-9 - . _ ~` is encoded.
pub static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Redacts a secret for `Debug` output.
///
/// Strings shorter than 12 characters are fully hidden, longer ones keep
/// their first and last three characters so different secrets can still be
/// told apart in logs.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref().unwrap_or_default())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.0;
        match s.len() {
            0 => f.write_str("EMPTY"),
            n if n < 12 || !s.is_char_boundary(3) || !s.is_char_boundary(n - 3) => {
                f.write_str("***")
            }
            n => write!(f, "{}***{}", &s[..3], &s[n - 3..]),
        }
    }
}

/// Check that every `%` in `input` starts a `%XX` escape with two hex digits.
///
/// `what` names the URI component in the error message.
pub fn check_percent_encoding(input: &str, what: &str) -> Result<()> {
    let bs = input.as_bytes();
    let mut idx = 0;
    while idx < bs.len() {
        if bs[idx] == b'%' {
            let valid = bs.len() > idx + 2
                && bs[idx + 1].is_ascii_hexdigit()
                && bs[idx + 2].is_ascii_hexdigit();
            if !valid {
                return Err(Error::request_invalid(format!(
                    "malformed URI: invalid percent-encoding in {what} at index {idx}"
                )));
            }
            idx += 3;
        } else {
            idx += 1;
        }
    }
    Ok(())
}

/// Decode a raw URI path exactly once.
///
/// The input must be well formed, see [`check_percent_encoding`]. Encoded
/// escapes that decode to another escape (`%252C`) are left as `%2C`.
pub fn decode_path(raw: &str) -> Result<Cow<'_, str>> {
    check_percent_encoding(raw, "path")?;
    percent_decode_str(raw).decode_utf8().map_err(|e| {
        Error::request_invalid("malformed URI: path is not valid utf-8 after decoding")
            .with_source(e)
    })
}
