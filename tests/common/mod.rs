#![allow(dead_code)]

use std::path::PathBuf;

use formtree::{FormValue, Submission};

pub fn form<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Submission {
    pairs.into_iter().collect()
}

pub fn obj<'a>(fields: impl IntoIterator<Item = (&'a str, FormValue)>) -> FormValue {
    FormValue::Object(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

pub fn strings<'a>(values: impl IntoIterator<Item = &'a str>) -> FormValue {
    FormValue::Array(values.into_iter().map(FormValue::from).collect())
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Keys the decoder can address unambiguously: no separators, not the
/// array key sentinel.
pub fn plain_key(key: &str) -> bool {
    !key.is_empty() && key != "key" && !key.contains(['.', '[', ']'])
}
