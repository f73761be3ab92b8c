//! Typed reads over the header store.
//!
//! All functions are stateless; nothing here needs synchronizing.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use http::HeaderMap;
use http::header::AsHeaderName;

use crate::error::Error;

/// First value of `name` as UTF-8 text. Non-text values read as absent.
pub fn first<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Every text value of `name`, in order.
pub fn all<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Vec<&str> {
    headers.get_all(name).iter().filter_map(|v| v.to_str().ok()).collect()
}

/// `-1` when absent, the parsed value when numeric.
pub fn int<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Result<i32, Error> {
    raw(headers, name).map_or(Ok(-1), |value| parse_number(&value))
}

/// As [`int`], widened to `i64`.
pub fn long<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Result<i64, Error> {
    raw(headers, name).map_or(Ok(-1), |value| parse_number(&value))
}

/// `Ok(None)` when absent, the instant when the value is an HTTP date.
pub fn date<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Result<Option<DateTime<Utc>>, Error> {
    raw(headers, name).map(|value| parse_http_date(&value)).transpose()
}

// Typed reads see every present value; non-UTF-8 bytes fail the parse
// instead of reading as absent.
fn raw<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Option<Cow<'_, str>> {
    headers.get(name).map(|value| String::from_utf8_lossy(value.as_bytes()))
}

/// Parses an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc2822(value)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|source| Error::InvalidDate { value: value.to_owned(), source })
}

fn parse_number<T>(value: &str) -> Result<T, Error>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    value
        .parse()
        .map_err(|source| Error::InvalidNumber { value: value.to_owned(), source })
}

#[cfg(test)]
mod tests {
    use http::header::{CONTENT_LENGTH, IF_MODIFIED_SINCE};
    use http::HeaderValue;

    use super::*;

    fn headers(entries: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn lookup_ignores_case() {
        let map = headers(&[("x-thing", "1"), ("x-thing", "2")]);

        assert_eq!(first(&map, "X-Thing"), Some("1"));
        assert_eq!(all(&map, "X-THING"), ["1", "2"]);
        assert!(all(&map, "x-missing").is_empty());
    }

    #[test]
    fn missing_numbers_are_minus_one() {
        let map = HeaderMap::new();

        assert_eq!(int(&map, CONTENT_LENGTH).unwrap(), -1);
        assert_eq!(long(&map, CONTENT_LENGTH).unwrap(), -1);
    }

    #[test]
    fn numbers_parse() {
        let map = headers(&[("content-length", "5000000000"), ("x-small", "42")]);

        assert_eq!(long(&map, CONTENT_LENGTH).unwrap(), 5_000_000_000);
        assert_eq!(int(&map, "x-small").unwrap(), 42);
        assert!(matches!(int(&map, CONTENT_LENGTH), Err(Error::InvalidNumber { .. })));
    }

    #[test]
    fn non_numeric_is_an_error() {
        let map = headers(&[("x-count", "ten")]);
        assert!(matches!(int(&map, "x-count"), Err(Error::InvalidNumber { .. })));
    }

    #[test]
    fn dates_parse() {
        let map = headers(&[("if-modified-since", "Sun, 06 Nov 1994 08:49:37 GMT")]);
        let date = date(&map, IF_MODIFIED_SINCE).unwrap().unwrap();

        assert_eq!(date.timestamp_millis(), 784_111_777_000);
    }

    #[test]
    fn missing_date_is_none() {
        assert!(date(&HeaderMap::new(), IF_MODIFIED_SINCE).unwrap().is_none());
    }

    #[test]
    fn bad_date_is_an_error() {
        let map = headers(&[("if-modified-since", "yesterday")]);
        assert!(matches!(date(&map, IF_MODIFIED_SINCE), Err(Error::InvalidDate { .. })));
    }

    #[test]
    fn non_utf8_numbers_and_dates_are_errors() {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_LENGTH, HeaderValue::from_bytes(b"12\xff").unwrap());
        map.insert(IF_MODIFIED_SINCE, HeaderValue::from_bytes(b"Sun\xff").unwrap());

        assert!(first(&map, CONTENT_LENGTH).is_none());
        assert!(matches!(long(&map, CONTENT_LENGTH), Err(Error::InvalidNumber { .. })));
        assert!(matches!(int(&map, CONTENT_LENGTH), Err(Error::InvalidNumber { .. })));
        assert!(matches!(date(&map, IF_MODIFIED_SINCE), Err(Error::InvalidDate { .. })));
    }
}
