use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;

use crate::validate::{PathSegment, Violation};

/// Deserialize an accepted tree, reporting failures at their field path.
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, Violation> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err
                .path()
                .iter()
                .filter_map(|segment| match segment {
                    Segment::Seq { index } => Some(PathSegment::Index(*index)),
                    Segment::Map { key } => Some(PathSegment::Key(key.clone())),
                    Segment::Enum { variant } => Some(PathSegment::Key(variant.clone())),
                    Segment::Unknown => None,
                })
                .collect();
            Err(Violation { path, message: err.into_inner().to_string() })
        }
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(format!("at JSON path {path} → {}", err.into_inner()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Order {
        items: Vec<Item>,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Item {
        qty: u8,
    }

    #[test]
    fn reports_nested_path() {
        let err = from_value_with_path::<Order>(json!({ "items": [{ "qty": 1 }, { "qty": 300 }] })).unwrap_err();
        assert_eq!(err.path, [PathSegment::from("items"), PathSegment::from(1), PathSegment::from("qty")]);
    }

    #[test]
    fn string_source_errors_carry_path() {
        let err = from_str_with_path::<Order>(r#"{ "items": [{ "qty": "x" }] }"#).unwrap_err();
        assert!(err.starts_with("at JSON path items[0].qty"), "{err}");
    }
}
