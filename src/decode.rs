//! Schema-driven form decoding.
//!
//! The walk follows the schema, never the submission: every declared field is
//! visited once, in declaration order, and keys the schema does not mention
//! are ignored. Each nesting level asks the shape introspector how to consume
//! keys under the current dotted path:
//!
//! - objects recurse with `prefix.field`
//! - arrays of primitives collect every value under the exact path
//! - arrays of objects use the `<path>.key` list or positional indices
//! - leaves coerce their first value by primitive kind
//!
//! The finished tree is validated once; a file payload anywhere aborts the
//! whole decode instead.
pub mod coerce;
mod array;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::outcome::{Outcome, project_violations};
use crate::path_de;
use crate::schema::PrimitiveKind;
use crate::shape::{Introspect, Shape};
use crate::submission::Submission;
use crate::validate::Validator;
use crate::value::FormValue;

// ————————————————————————————————————————————————————————————————————————————
// PUBLIC API
// ————————————————————————————————————————————————————————————————————————————

/// Decode with the default configuration into `T`.
pub fn decode<T, S>(schema: &S, submission: &Submission) -> Result<Outcome<T>, DecodeError>
where
    T: DeserializeOwned,
    S: Introspect + Validator,
{
    Decoder::new(schema).decode(submission)
}

/// Decode with the default configuration, keeping the untyped tree.
pub fn decode_value<S>(
    schema: &S,
    submission: &Submission,
) -> Result<Outcome<FormValue>, DecodeError>
where
    S: Introspect + Validator,
{
    Decoder::new(schema).decode_value(submission)
}

#[derive(Debug, Clone)]
pub struct Decoder<'s, S> {
    schema: &'s S,
    config: DecoderConfig,
}

impl<'s, S: Introspect> Decoder<'s, S> {
    pub fn new(schema: &'s S) -> Self {
        Decoder { schema, config: DecoderConfig::default() }
    }

    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Candidate tree, before validation.
    pub fn tree(&self, submission: &Submission) -> Result<FormValue, DecodeError> {
        Walk { config: &self.config, submission }.node(self.schema, "")
    }
}

impl<'s, S: Introspect + Validator> Decoder<'s, S> {
    pub fn decode_value(
        &self,
        submission: &Submission,
    ) -> Result<Outcome<FormValue>, DecodeError> {
        let tree = self.tree(submission)?;
        Ok(validate_tree(self.schema, tree))
    }

    pub fn decode<T: DeserializeOwned>(
        &self,
        submission: &Submission,
    ) -> Result<Outcome<T>, DecodeError> {
        let tree = self.tree(submission)?;
        Ok(finish(self.schema, tree))
    }
}

/// Validate a tree and project violations into field errors.
pub fn validate_tree<V: Validator>(validator: &V, tree: FormValue) -> Outcome<FormValue> {
    match validator.validate(tree) {
        Ok(data) => {
            debug!("form is valid");
            Outcome::Valid { data }
        }
        Err(violations) => {
            debug!(violations = violations.len(), "form is invalid");
            Outcome::Invalid { errors: project_violations(violations) }
        }
    }
}

/// Validate, then deserialize the accepted tree into `T`. A tree the schema
/// accepts but `T` cannot hold is reported at the offending path.
pub fn finish<T: DeserializeOwned, V: Validator>(validator: &V, tree: FormValue) -> Outcome<T> {
    match validate_tree(validator, tree) {
        Outcome::Valid { data } => match path_de::from_value_with_path::<T>(data.to_json()) {
            Ok(data) => Outcome::Valid { data },
            Err(violation) => Outcome::Invalid { errors: project_violations([violation]) },
        },
        Outcome::Invalid { errors } => Outcome::Invalid { errors },
    }
}

/// Lift an already structured JSON document into a value tree. The schema
/// only guides leaves JSON cannot express: strings under date and bigint
/// leaves (and integers under bigint leaves) go through the form coercion
/// rules. Everything else maps one to one.
pub fn lift_json<S: Introspect>(schema: &S, value: &Value) -> FormValue {
    match (schema.shape(), value) {
        (Shape::Object(fields), Value::Object(map)) => {
            let mut out = IndexMap::with_capacity(map.len());
            for (key, child) in map {
                let lifted = match fields.iter().find(|(name, _)| *name == key.as_str()) {
                    Some((_, node)) => lift_json(*node, child),
                    None => FormValue::from_json(child),
                };
                out.insert(key.clone(), lifted);
            }
            FormValue::Object(out)
        }
        (Shape::Array(element), Value::Array(items)) => {
            FormValue::Array(items.iter().map(|item| lift_json(element, item)).collect())
        }
        (Shape::Primitive(PrimitiveKind::Date), Value::String(text)) => {
            coerce::primitive(PrimitiveKind::Date, Some(text))
        }
        (Shape::Primitive(PrimitiveKind::BigInt), Value::String(text)) => {
            coerce::primitive(PrimitiveKind::BigInt, Some(text))
        }
        (Shape::Primitive(PrimitiveKind::BigInt), Value::Number(n)) if n.is_i64() || n.is_u64() => {
            coerce::primitive(PrimitiveKind::BigInt, Some(&n.to_string()))
        }
        _ => FormValue::from_json(value),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// WALK
// ————————————————————————————————————————————————————————————————————————————

struct Walk<'a> {
    config: &'a DecoderConfig,
    submission: &'a Submission,
}

impl Walk<'_> {
    fn node<S: Introspect>(&self, node: &S, path: &str) -> Result<FormValue, DecodeError> {
        if node.is_optional() && !path.is_empty() && self.absent(node, path) {
            return Ok(FormValue::Undefined);
        }
        match node.shape() {
            Shape::Object(fields) => self.object(&fields, path),
            Shape::Array(element) => self.array(element, path),
            Shape::Primitive(kind) => coerce::leaf(kind, self.submission.get(path), path),
            Shape::Unsupported => coerce::passthrough(self.submission.get(path), path),
        }
    }

    /// Nothing was submitted for the node: no entry for a leaf, no entry at or
    /// beneath the path for a container.
    fn absent<S: Introspect>(&self, node: &S, path: &str) -> bool {
        match node.shape() {
            Shape::Primitive(_) | Shape::Unsupported => !self.submission.has(path),
            Shape::Object(_) | Shape::Array(_) => !self.submission.has_under(path),
        }
    }

    fn object<S: Introspect>(
        &self,
        fields: &[(&str, &S)],
        prefix: &str,
    ) -> Result<FormValue, DecodeError> {
        let mut out = IndexMap::with_capacity(fields.len());
        for (name, child) in fields {
            let path = child_path(prefix, name);
            out.insert(name.to_string(), self.node(*child, &path)?);
        }
        Ok(FormValue::Object(out))
    }
}

fn child_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArrayStrategy, IndexNotation};
    use crate::schema::SchemaNode;
    use pretty_assertions::assert_eq;

    fn obj(fields: impl IntoIterator<Item = (&'static str, FormValue)>) -> FormValue {
        FormValue::Object(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn line_items() -> SchemaNode {
        SchemaNode::object([(
            "items",
            SchemaNode::array(SchemaNode::object([
                ("sku", SchemaNode::string()),
                ("qty", SchemaNode::number()),
            ])),
        )])
    }

    #[test]
    fn absent_fields_are_still_visited() {
        let schema = SchemaNode::object([
            ("name", SchemaNode::string()),
            ("address", SchemaNode::object([("zip", SchemaNode::string())])),
        ]);
        let tree = Decoder::new(&schema).tree(&Submission::new()).unwrap();
        assert_eq!(
            tree,
            obj([
                ("name", FormValue::Undefined),
                ("address", obj([("zip", FormValue::Undefined)])),
            ])
        );
    }

    #[test]
    fn output_follows_declaration_order_not_submission_order() {
        let schema = SchemaNode::object([("b", SchemaNode::string()), ("a", SchemaNode::string())]);
        let form: Submission = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        let tree = Decoder::new(&schema).tree(&form).unwrap();
        let keys: Vec<&str> = tree.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn bracketed_index_notation() {
        let form: Submission = [("items[0].sku", "A"), ("items[0].qty", "2"), ("items.1.sku", "B")]
            .into_iter()
            .collect();
        let config = DecoderConfig::default().with_index_notation(IndexNotation::Bracketed);
        let schema = line_items();
        let tree = Decoder::new(&schema).with_config(config).tree(&form).unwrap();
        assert_eq!(
            tree,
            obj([(
                "items",
                FormValue::Array(vec![obj([
                    ("sku", FormValue::from("A")),
                    ("qty", FormValue::Number(2.0)),
                ])])
            )])
        );
    }

    #[test]
    fn index_only_ignores_key_sentinel() {
        let form: Submission = [("items.key", "x"), ("items[x].sku", "X"), ("items.0.sku", "A")]
            .into_iter()
            .collect();
        let schema = line_items();
        let config = DecoderConfig::default().with_array_strategy(ArrayStrategy::IndexOnly);
        let tree = Decoder::new(&schema).with_config(config).tree(&form).unwrap();
        let items = tree.as_object().unwrap()["items"].as_array().unwrap().to_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_object().unwrap()["sku"], FormValue::from("A"));
    }

    #[test]
    fn key_only_without_sentinel_is_empty() {
        let form: Submission = [("items.0.sku", "A")].into_iter().collect();
        let schema = line_items();
        let config = DecoderConfig::default().with_array_strategy(ArrayStrategy::KeyOnly);
        let tree = Decoder::new(&schema).with_config(config).tree(&form).unwrap();
        assert_eq!(tree, obj([("items", FormValue::Array(vec![]))]));
    }

    #[test]
    fn custom_key_sentinel() {
        let form: Submission = [("items.id", "q"), ("items[q].sku", "Q")].into_iter().collect();
        let schema = line_items();
        let config = DecoderConfig { key_sentinel: "id".to_string(), ..DecoderConfig::default() };
        let tree = Decoder::new(&schema).with_config(config).tree(&form).unwrap();
        let items = tree.as_object().unwrap()["items"].as_array().unwrap().to_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_object().unwrap()["sku"], FormValue::from("Q"));
    }

    #[test]
    fn element_with_only_nested_object_fields_is_found() {
        let schema = SchemaNode::object([(
            "people",
            SchemaNode::array(SchemaNode::object([(
                "address",
                SchemaNode::object([("city", SchemaNode::string())]),
            )])),
        )]);
        let form: Submission = [("people.0.address.city", "Oslo")].into_iter().collect();
        let tree = Decoder::new(&schema).tree(&form).unwrap();
        assert_eq!(
            tree,
            obj([(
                "people",
                FormValue::Array(vec![obj([("address", obj([("city", FormValue::from("Oslo"))]))])])
            )])
        );
    }

    #[test]
    fn nested_and_unsupported_array_elements_decode_absent() {
        let schema = SchemaNode::object([
            ("grid", SchemaNode::array(SchemaNode::array(SchemaNode::number()))),
            ("u", SchemaNode::array(SchemaNode::unsupported("union"))),
        ]);
        let form: Submission = [("grid", "1"), ("grid.0", "2"), ("u", "x")].into_iter().collect();
        let tree = Decoder::new(&schema).tree(&form).unwrap();
        assert_eq!(tree, obj([("grid", FormValue::Undefined), ("u", FormValue::Undefined)]));

        let outcome = Decoder::new(&schema).decode_value(&form).unwrap();
        assert_eq!(
            outcome.errors().unwrap().keys().map(String::as_str).collect::<Vec<_>>(),
            ["grid", "u"]
        );
    }

    #[test]
    fn absent_optional_leaves_stay_absent() {
        let schema = SchemaNode::object([
            ("age", SchemaNode::number().optional()),
            ("born", SchemaNode::date().optional()),
            ("flag", SchemaNode::boolean().optional()),
            ("address", SchemaNode::object([("zip", SchemaNode::string())]).optional()),
        ]);
        let tree = Decoder::new(&schema).tree(&Submission::new()).unwrap();
        assert_eq!(
            tree,
            obj([
                ("age", FormValue::Undefined),
                ("born", FormValue::Undefined),
                ("flag", FormValue::Undefined),
                ("address", FormValue::Undefined),
            ])
        );
        assert!(Decoder::new(&schema).decode_value(&Submission::new()).unwrap().is_valid());
    }

    #[test]
    fn present_optional_leaves_are_still_coerced() {
        let schema = SchemaNode::object([
            ("age", SchemaNode::number().optional()),
            ("address", SchemaNode::object([("zip", SchemaNode::string())]).optional()),
        ]);
        let form: Submission = [("age", "abc"), ("address.city", "Oslo")].into_iter().collect();
        let outcome = Decoder::new(&schema).decode_value(&form).unwrap();
        assert_eq!(
            outcome.errors().unwrap(),
            &crate::outcome::FieldErrors::from([
                ("age".to_string(), "Expected number, received nan".to_string()),
                ("address.zip".to_string(), "Required".to_string()),
            ])
        );
    }

    #[test]
    fn structured_input_parses_dates_and_bigints() {
        let schema = SchemaNode::object([
            ("born", SchemaNode::date()),
            ("ids", SchemaNode::array(SchemaNode::bigint())),
            ("name", SchemaNode::string()),
        ]);
        let lifted = lift_json(
            &schema,
            &serde_json::json!({
                "born": "2024-02-29",
                "ids": ["123456789012345678901234567890", 7],
                "name": "2024-02-29",
                "extra": "kept until validation"
            }),
        );
        let born = chrono::NaiveDate::from_ymd_opt(2024, 2, 29)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc());
        let big: num_bigint::BigInt = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(
            lifted,
            obj([
                ("born", FormValue::Date(born)),
                (
                    "ids",
                    FormValue::Array(vec![FormValue::BigInt(big), FormValue::BigInt(7.into())])
                ),
                ("name", FormValue::from("2024-02-29")),
                ("extra", FormValue::from("kept until validation")),
            ])
        );
    }

    #[test]
    fn unsupported_fields_pass_raw_text_through() {
        let schema = SchemaNode::object([("choice", SchemaNode::unsupported("union"))]);
        let form: Submission = [("choice", "7")].into_iter().collect();
        let tree = Decoder::new(&schema).tree(&form).unwrap();
        assert_eq!(tree, obj([("choice", FormValue::from("7"))]));
    }
}
