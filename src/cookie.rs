//! `Cookie` request-header decoding.

/// One name/value pair from a `Cookie` header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn value(&self) -> &str { &self.value }
}

/// Decodes a `Cookie` header value into its pairs, in header order.
///
/// Malformed input yields an empty list rather than a partial one. `$`-prefixed
/// names are RFC 2965 attributes (`$Version`, `$Path`, `$Domain`) and are skipped.
pub fn parse(header: &str) -> Vec<Cookie> {
    let mut cookies = Vec::with_capacity(header.matches(';').count() + 1);

    for segment in header.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let Some((name, value)) = segment.split_once('=') else {
            return Vec::new();
        };
        let name = name.trim();
        if !is_token(name) {
            return Vec::new();
        }
        if name.starts_with('$') {
            continue;
        }

        cookies.push(Cookie::new(name, unquote(value.trim())));
    }

    cookies
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

// RFC 9110 token characters.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pairs_in_order() {
        let cookies = parse("a=1; b=two; c=");

        assert_eq!(
            cookies,
            [Cookie::new("a", "1"), Cookie::new("b", "two"), Cookie::new("c", "")]
        );
    }

    #[test]
    fn value_may_contain_equals() {
        assert_eq!(parse("token=abc==")[0].value(), "abc==");
    }

    #[test]
    fn quoted_values_are_unwrapped() {
        assert_eq!(parse(r#"a="quoted value""#)[0].value(), "quoted value");
    }

    #[test]
    fn rfc2965_attributes_are_skipped() {
        let cookies = parse("$Version=1; session=xyz; $Path=/");
        assert_eq!(cookies, [Cookie::new("session", "xyz")]);
    }

    #[test]
    fn malformed_header_is_empty() {
        assert!(parse("garbage").is_empty());
        assert!(parse("a=1; =2").is_empty());
        assert!(parse("a b=1").is_empty());
        assert!(parse("").is_empty());
        assert!(parse(" ; ").is_empty());
    }
}
