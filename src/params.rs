//! Parameter reconciliation.
//!
//! A legacy request exposes one parameter namespace, but the values come from
//! two places: the URL query (parsed by the network layer) and a decoded form
//! body (parsed by whoever read the body). [`ParamView`] merges them without
//! copying. Query values always come first.

use std::collections::{BTreeMap, BTreeSet};

use url::form_urlencoded;

/// Parameter name → values in arrival order. Names are case-sensitive.
pub type ParamMap = BTreeMap<String, Vec<String>>;

/// Parses `application/x-www-form-urlencoded` text into a [`ParamMap`].
///
/// Repeated names accumulate in order. Pairs with an empty name are skipped.
pub fn parse_urlencoded(input: &[u8]) -> ParamMap {
    let mut map = ParamMap::new();
    for (name, value) in form_urlencoded::parse(input) {
        if name.is_empty() {
            continue;
        }
        map.entry(name.into_owned()).or_default().push(value.into_owned());
    }
    map
}

/// Read-only merged view over query and form parameters.
#[derive(Clone, Copy, Debug)]
pub struct ParamView<'a> {
    query: &'a ParamMap,
    form: Option<&'a ParamMap>,
}

impl<'a> ParamView<'a> {
    /// An absent form map behaves exactly like an empty one.
    pub fn new(query: &'a ParamMap, form: Option<&'a ParamMap>) -> Self {
        Self { query, form }
    }

    /// First query value for `name`, else first form value.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        first(self.query, name).or_else(|| self.form.and_then(|form| first(form, name)))
    }

    /// All query values for `name` followed by all form values. Never absent.
    pub fn get_all(&self, name: &str) -> Vec<&'a str> {
        let query = self.query.get(name).into_iter().flatten();
        let form = self.form.and_then(|form| form.get(name)).into_iter().flatten();
        query.chain(form).map(String::as_str).collect()
    }

    /// Every name present in either source, once.
    pub fn names(&self) -> BTreeSet<&'a str> {
        self.query
            .keys()
            .chain(self.form.into_iter().flat_map(|form| form.keys()))
            .map(String::as_str)
            .collect()
    }

    /// Owned snapshot; each entry agrees with [`get_all`](Self::get_all).
    pub fn to_map(&self) -> ParamMap {
        let mut merged = self.query.clone();
        if let Some(form) = self.form {
            for (name, values) in form {
                merged.entry(name.clone()).or_default().extend(values.iter().cloned());
            }
        }
        merged
    }
}

fn first<'a>(map: &'a ParamMap, name: &str) -> Option<&'a str> {
    map.get(name).and_then(|values| values.first()).map(String::as_str)
}
