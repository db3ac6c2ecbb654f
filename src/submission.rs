//! Flat form submissions: an ordered multi-map of key → entries.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SubmissionError;

/// A non-text payload (an uploaded file). Never decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePart {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Text(String),
    File(FilePart),
}

impl Entry {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Entry::Text(text) => Some(text),
            Entry::File(_) => None,
        }
    }
}

impl From<String> for Entry {
    fn from(value: String) -> Self {
        Entry::Text(value)
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Entry::Text(value.to_string())
    }
}

impl From<FilePart> for Entry {
    fn from(value: FilePart) -> Self {
        Entry::File(value)
    }
}

/// Keys keep first-insertion order; values under a key keep append order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    entries: IndexMap<String, Vec<Entry>>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<Entry>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    pub fn append_file(&mut self, key: impl Into<String>, file: FilePart) {
        self.append(key, Entry::File(file));
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// True if `prefix` itself or any key nested beneath it (`prefix.` /
    /// `prefix[`) was submitted.
    pub fn has_under(&self, prefix: &str) -> bool {
        self.entries.keys().any(|key| {
            key.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.') || rest.starts_with('['))
        })
    }

    /// First value under `key`.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key).and_then(|values| values.first())
    }

    pub fn get_all(&self, key: &str) -> &[Entry] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value)))
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse an `application/x-www-form-urlencoded` body.
    pub fn from_urlencoded(body: &str) -> Self {
        form_urlencoded::parse(body.trim().as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    /// Accepts either `[[key, value], ...]` or `{ key: value | [value, ...] }`,
    /// where a value is a string or a file object.
    pub fn from_json_str(src: &str) -> Result<Self, SubmissionError> {
        let document: Value = serde_json::from_str(src)?;
        let mut submission = Submission::new();
        match document {
            Value::Array(pairs) => {
                for pair in pairs {
                    let (key, entry): (String, Entry) = serde_json::from_value(pair)?;
                    submission.append(key, entry);
                }
            }
            Value::Object(map) => {
                for (key, value) in map {
                    match value {
                        Value::Array(values) => {
                            for value in values {
                                submission.append(key.clone(), serde_json::from_value::<Entry>(value)?);
                            }
                        }
                        value => submission.append(key, serde_json::from_value::<Entry>(value)?),
                    }
                }
            }
            _ => return Err(SubmissionError::Shape),
        }
        Ok(submission)
    }
}

impl<K, V> FromIterator<(K, V)> for Submission
where
    K: Into<String>,
    V: Into<Entry>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut submission = Submission::new();
        for (key, value) in iter {
            submission.append(key, value);
        }
        submission
    }
}

impl<K, V> Extend<(K, V)> for Submission
where
    K: Into<String>,
    V: Into<Entry>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.append(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn repeated_keys_keep_append_order() {
        let form: Submission = [("tags", "a"), ("name", "x"), ("tags", "b"), ("tags", "c")]
            .into_iter()
            .collect();
        let tags: Vec<_> = form.get_all("tags").iter().filter_map(Entry::as_text).collect();
        assert_eq!(tags, ["a", "b", "c"]);
        assert_eq!(form.get("tags"), Some(&Entry::from("a")));
        assert_eq!(form.len(), 4);
        assert_eq!(form.keys().collect::<Vec<_>>(), ["tags", "name"]);
    }

    #[test]
    fn missing_keys_are_empty() {
        let form = Submission::new();
        assert!(form.get("nope").is_none());
        assert!(form.get_all("nope").is_empty());
        assert!(!form.has("nope"));
    }

    #[test]
    fn has_under_respects_segment_boundaries() {
        let form: Submission = [("items.0.address.city", "Oslo"), ("names", "x")]
            .into_iter()
            .collect();
        assert!(form.has_under("items.0.address"));
        assert!(form.has_under("items.0"));
        assert!(!form.has_under("items.0.add"));
        assert!(form.has_under("names"));
        assert!(!form.has_under("name"));
    }

    #[test]
    fn parses_urlencoded_bodies() {
        let form = Submission::from_urlencoded("name=Ada+Lovelace&tags=a&tags=b%26c&empty=");
        assert_eq!(form.get("name"), Some(&Entry::from("Ada Lovelace")));
        let tags: Vec<_> = form.get_all("tags").iter().filter_map(Entry::as_text).collect();
        assert_eq!(tags, ["a", "b&c"]);
        assert_eq!(form.get("empty"), Some(&Entry::from("")));
    }

    #[test]
    fn parses_both_json_layouts() {
        let pairs = Submission::from_json_str(r#"[["a", "1"], ["b", "2"], ["a", "3"]]"#).unwrap();
        let object = Submission::from_json_str(r#"{"a": ["1", "3"], "b": "2"}"#).unwrap();
        assert_eq!(pairs, object);

        let with_file = Submission::from_json_str(
            r#"{"avatar": {"filename": "me.png", "content_type": "image/png"}}"#,
        )
        .unwrap();
        assert!(matches!(with_file.get("avatar"), Some(Entry::File(file)) if file.filename == "me.png"));

        assert!(matches!(Submission::from_json_str("42"), Err(SubmissionError::Shape)));
    }
}
