//! Form-body decoding.
//!
//! The adapter never reads bodies itself; this is the collaborator the server
//! uses to turn a buffered body into the form half of the parameter view.

use http::HeaderMap;
use http::header::CONTENT_TYPE;

use crate::headers;
use crate::params::{ParamMap, parse_urlencoded};

const URLENCODED: &str = "application/x-www-form-urlencoded";

/// Decodes `body` when the request declares an urlencoded form, else `None`.
pub fn decode(headers: &HeaderMap, body: &[u8]) -> Option<ParamMap> {
    let content_type = headers::first(headers, CONTENT_TYPE)?;
    is_urlencoded(content_type).then(|| parse_urlencoded(body))
}

// Compares the media type only; `charset` and other parameters are ignored.
fn is_urlencoded(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(URLENCODED))
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    fn with_type(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn decodes_urlencoded_bodies() {
        let headers = with_type("Application/X-WWW-Form-Urlencoded; charset=UTF-8");
        let form = decode(&headers, b"a=1&a=2&b=x%20y").unwrap();

        assert_eq!(form["a"], ["1", "2"]);
        assert_eq!(form["b"], ["x y"]);
    }

    #[test]
    fn other_types_are_ignored() {
        assert!(decode(&with_type("application/json"), b"{}").is_none());
        assert!(decode(&HeaderMap::new(), b"a=1").is_none());
    }

    #[test]
    fn empty_form_body_is_an_empty_map() {
        let form = decode(&with_type(URLENCODED), b"").unwrap();
        assert!(form.is_empty());
    }
}
