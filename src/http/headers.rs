use std::collections::BTreeMap;

/// A map of header names to values.
///
/// Backed by a `BTreeMap` so headers serialize in a stable order. Names are matched
/// case-insensitively; inserting a name that is already present replaces the old
/// entry, so the last occurrence wins and its spelling is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    /// Returns an empty header map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts a header, replacing any existing entry with the same name.
    ///
    /// # Examples
    /// ```
    /// let mut headers = embedhttp::http::headers::Headers::new();
    /// headers.insert("Drink", "milk");
    /// headers.insert("drink", "water");
    /// assert_eq!(headers.get("DRINK"), Some("water"));
    /// assert_eq!(headers.len(), 1);
    /// ```
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.remove(&key);
        self.0.insert(key, value.into());
    }

    /// Retrieves the value of a header, ignoring ASCII case of the name.
    ///
    /// # Examples
    /// ```
    /// let mut headers = embedhttp::http::headers::Headers::new();
    /// headers.insert("Content-Type", "text/plain");
    /// assert_eq!(headers.get("content-type"), Some("text/plain"));
    /// assert_eq!(headers.get("accept"), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .or_else(|| self.find(key).map(|(_, value)| value))
            .map(String::as_str)
    }

    /// Removes a header, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let stored = self.find(key).map(|(name, _)| name.clone())?;
        self.0.remove(&stored)
    }

    /// Returns whether a header with this name is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over `(name, value)` pairs in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the map holds no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn find(&self, key: &str) -> Option<(&String, &String)> {
        self.0.iter().find(|(name, _)| name.eq_ignore_ascii_case(key))
    }
}
