//! Percent-encoding for free text carried in response headers.
//!
//! Transcripts and replies may contain any Unicode. They are encoded with the
//! same unreserved set as JavaScript's `encodeURIComponent`, so browser clients
//! can recover them with `decodeURIComponent`.

use std::borrow::Cow;
use std::str::Utf8Error;

use http::HeaderValue;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

pub fn decode_uri_component(encoded: &str) -> Result<Cow<'_, str>, Utf8Error> {
    percent_decode_str(encoded).decode_utf8()
}

/// Encode `text` into a header value.
///
/// The encoded form is plain visible ASCII, so conversion cannot fail in
/// practice; an empty value is used if it ever does.
pub fn encoded_header_value(text: &str) -> HeaderValue {
    HeaderValue::from_str(&encode_uri_component(text))
        .unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreserved_characters_pass_through() {
        assert_eq!(
            encode_uri_component("Az09-_.!~*'()"),
            "Az09-_.!~*'()"
        );
    }

    #[test]
    fn test_reserved_and_space_are_encoded() {
        assert_eq!(encode_uri_component("a b"), "a%20b");
        assert_eq!(encode_uri_component("x=1&y=2"), "x%3D1%26y%3D2");
        assert_eq!(encode_uri_component("what?"), "what%3F");
        assert_eq!(encode_uri_component("a/b#c"), "a%2Fb%23c");
    }

    #[test]
    fn test_unicode_is_utf8_encoded() {
        assert_eq!(encode_uri_component("é"), "%C3%A9");
        assert_eq!(encode_uri_component("مرحبا"), "%D9%85%D8%B1%D8%AD%D8%A8%D8%A7");
    }

    #[test]
    fn test_decode_recovers_original() {
        let original = "Hello, world! ¿Qué tal? 你好";
        let encoded = encode_uri_component(original);
        assert_eq!(decode_uri_component(&encoded).unwrap(), original);
    }

    #[test]
    fn test_header_value_is_ascii() {
        let value = encoded_header_value("line one\nline two");
        assert_eq!(value.to_str().unwrap(), "line%20one%0Aline%20two");
    }
}
