//! Request locale, taken from `Accept-Language`.

use std::fmt;

/// A BCP 47 language tag as sent by the client (`fr`, `en-US`, `zh-Hant-TW`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// `en-US`, used when the client states no preference.
    pub fn en_us() -> Self {
        Self::new("en-US")
    }

    /// The first language range of an `Accept-Language` value, quality stripped.
    ///
    /// Returns `None` for an empty header or a bare `*`.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let first = header.split(',').next()?;
        let tag = first.split(';').next()?.trim();
        if tag.is_empty() || tag == "*" {
            return None;
        }
        Some(Self::new(tag))
    }

    pub fn tag(&self) -> &str {
        &self.0
    }

    /// Primary language subtag, lowercased.
    pub fn language(&self) -> String {
        self.subtags().next().unwrap_or_default().to_ascii_lowercase()
    }

    /// Two-letter region subtag, uppercased, if present.
    pub fn country(&self) -> Option<String> {
        self.subtags()
            .skip(1)
            .find(|s| s.len() == 2 && s.bytes().all(|b| b.is_ascii_alphabetic()))
            .map(str::to_ascii_uppercase)
    }

    fn subtags(&self) -> impl Iterator<Item = &str> {
        self.0.split(['-', '_'])
    }
}

impl Default for Locale {
    fn default() -> Self { Self::en_us() }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_range_wins() {
        let locale = Locale::from_accept_language("fr-CA,fr;q=0.9,en;q=0.8").unwrap();

        assert_eq!(locale.tag(), "fr-CA");
        assert_eq!(locale.language(), "fr");
        assert_eq!(locale.country().as_deref(), Some("CA"));
    }

    #[test]
    fn quality_is_stripped() {
        assert_eq!(Locale::from_accept_language(" de ;q=1").unwrap().tag(), "de");
    }

    #[test]
    fn bare_language() {
        let locale = Locale::from_accept_language("fr").unwrap();

        assert_eq!(locale, Locale::new("fr"));
        assert_eq!(locale.country(), None);
    }

    #[test]
    fn wildcard_and_empty_have_no_locale() {
        assert_eq!(Locale::from_accept_language("*"), None);
        assert_eq!(Locale::from_accept_language(""), None);
    }

    #[test]
    fn default_is_en_us() {
        assert_eq!(Locale::default().to_string(), "en-US");
    }
}
