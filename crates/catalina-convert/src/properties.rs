//! Property placeholders
//!
//! Attribute values of the form `${key}` are indirections into a property
//! table. Only a value that is a placeholder in full is substituted;
//! `prefix-${key}` is read literally.

use indexmap::IndexMap;

/// Flat `key → value` table used to resolve placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: IndexMap<String, String>,
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `catalina.properties`-style text.
    ///
    /// Accepts `key=value` and `key: value`, skips blank lines and lines
    /// starting with `#` or `!`, joins lines ending in a backslash.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = IndexMap::new();
        let mut pending = String::new();
        for line in text.lines() {
            let line = line.trim_start();
            if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }
            if let Some(continued) = line.strip_suffix('\\') {
                pending.push_str(continued);
                continue;
            }
            pending.push_str(line);
            let logical = std::mem::take(&mut pending);
            let (key, value) = split_entry(&logical);
            entries.insert(key.to_owned(), value.to_owned());
        }
        if !pending.is_empty() {
            let (key, value) = split_entry(&pending);
            entries.insert(key.to_owned(), value.to_owned());
        }
        Self { entries }
    }

    /// Add or replace a property
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a raw attribute value for reading.
    ///
    /// Unknown keys leave the placeholder text as is.
    #[must_use]
    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        placeholder_key(raw)
            .and_then(|key| self.get(key))
            .unwrap_or(raw)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Key of a full-value placeholder, if `raw` is one
#[must_use]
pub fn placeholder_key(raw: &str) -> Option<&str> {
    let key = raw.strip_prefix("${")?.strip_suffix('}')?;
    (!key.is_empty() && !key.contains(['$', '{', '}'])).then_some(key)
}

/// Whether `raw` is exactly one `${key}` placeholder
#[inline]
#[must_use]
pub fn is_placeholder(raw: &str) -> bool {
    placeholder_key(raw).is_some()
}

fn split_entry(line: &str) -> (&str, &str) {
    match line.find(['=', ':']) {
        Some(at) => (line[..at].trim(), line[at + 1..].trim()),
        None => (line.trim(), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_full_placeholder_only() {
        let props = Properties::new().with("port", "8080");
        assert_eq!(props.resolve("${port}"), "8080");
        assert_eq!(props.resolve("x${port}"), "x${port}");
        assert_eq!(props.resolve("8081"), "8081");
    }

    #[test]
    fn unknown_key_stays_literal() {
        let props = Properties::new();
        assert_eq!(props.resolve("${missing}"), "${missing}");
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder("${a.b}"));
        assert!(!is_placeholder("${}"));
        assert!(!is_placeholder("${a}${b}"));
        assert!(!is_placeholder("$a"));
    }

    #[test]
    fn parses_properties_text() {
        let text = "# comment\n! other\n\nhttp.port=8080\nshutdown.port : 8005\nlong=a,\\\n  b\nflag\n";
        let props = Properties::parse(text);
        assert_eq!(props.get("http.port"), Some("8080"));
        assert_eq!(props.get("shutdown.port"), Some("8005"));
        assert_eq!(props.get("long"), Some("a,b"));
        assert_eq!(props.get("flag"), Some(""));
        assert_eq!(props.len(), 4);
    }

    #[test]
    fn collects_from_pairs() {
        let props: Properties = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(props.get("b"), Some("2"));
    }
}
