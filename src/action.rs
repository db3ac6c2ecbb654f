//! Form actions: a schema bound to result hooks.
//!
//! ```
//! use formtree::{FormAction, SchemaNode, Submission};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Signup { email: String, age: u32 }
//!
//! let action = FormAction::<Signup>::new(SchemaNode::object([
//!     ("email", SchemaNode::string()),
//!     ("age", SchemaNode::number()),
//! ]))
//! .on_valid(|signup| format!("welcome {} ({})", signup.email, signup.age));
//!
//! let form: Submission = [("email", "ada@example.com"), ("age", "36")].into_iter().collect();
//! let outcome = action.run(form).unwrap();
//! assert_eq!(outcome.data().map(String::as_str), Some("welcome ada@example.com (36)"));
//! ```
use std::future::Future;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::config::DecoderConfig;
use crate::decode::{Decoder, finish, lift_json};
use crate::error::DecodeError;
use crate::fields::FieldPaths;
use crate::outcome::{FieldErrors, Outcome};
use crate::schema::SchemaNode;
use crate::submission::Submission;
use crate::value::FormValue;

type ValidHook<T, V> = Box<dyn Fn(T) -> V + Send + Sync>;
type InvalidHook<E> = Box<dyn Fn(FieldErrors) -> E + Send + Sync>;

/// What an action can be invoked with.
#[derive(Debug, Clone)]
pub enum Input {
    /// Flat submission, decoded first.
    Form(Submission),
    /// Already structured value, validated as is.
    Value(FormValue),
    /// JSON document, lifted against the schema and then validated.
    Json(serde_json::Value),
}

impl From<Submission> for Input {
    fn from(value: Submission) -> Self {
        Input::Form(value)
    }
}

impl From<FormValue> for Input {
    fn from(value: FormValue) -> Self {
        Input::Value(value)
    }
}

impl From<serde_json::Value> for Input {
    fn from(value: serde_json::Value) -> Self {
        Input::Json(value)
    }
}

pub struct FormAction<T, V = T, E = FieldErrors> {
    schema: SchemaNode,
    config: DecoderConfig,
    on_valid: ValidHook<T, V>,
    on_invalid: InvalidHook<E>,
    _data: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned + 'static> FormAction<T> {
    pub fn new(schema: SchemaNode) -> Self {
        FormAction {
            schema,
            config: DecoderConfig::default(),
            on_valid: Box::new(|data| data),
            on_invalid: Box::new(|errors| errors),
            _data: PhantomData,
        }
    }
}

impl<T: DeserializeOwned, V, E> FormAction<T, V, E> {
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Transform applied to validated data.
    pub fn on_valid<V2>(self, hook: impl Fn(T) -> V2 + Send + Sync + 'static) -> FormAction<T, V2, E> {
        FormAction {
            schema: self.schema,
            config: self.config,
            on_valid: Box::new(hook),
            on_invalid: self.on_invalid,
            _data: PhantomData,
        }
    }

    /// Transform applied to the field error map; decides the error payload.
    pub fn on_invalid<E2>(
        self,
        hook: impl Fn(FieldErrors) -> E2 + Send + Sync + 'static,
    ) -> FormAction<T, V, E2> {
        FormAction {
            schema: self.schema,
            config: self.config,
            on_valid: self.on_valid,
            on_invalid: Box::new(hook),
            _data: PhantomData,
        }
    }

    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    pub fn fields(&self) -> FieldPaths<'_, SchemaNode> {
        FieldPaths::new(&self.schema)
    }

    pub fn run(&self, input: impl Into<Input>) -> Result<Outcome<V, E>, DecodeError> {
        let outcome = match input.into() {
            Input::Form(submission) => Decoder::new(&self.schema)
                .with_config(self.config.clone())
                .decode::<T>(&submission)?,
            Input::Value(value) => finish::<T, _>(&self.schema, value),
            Input::Json(json) => finish::<T, _>(&self.schema, lift_json(&self.schema, &json)),
        };
        Ok(match outcome {
            Outcome::Valid { data } => Outcome::Valid { data: (self.on_valid)(data) },
            Outcome::Invalid { errors } => Outcome::Invalid { errors: (self.on_invalid)(errors) },
        })
    }

    /// Like [`run`](Self::run), then awaits `hook` on valid data. Decoding and
    /// validation finish before the hook is polled.
    pub async fn run_async<F, Fut, R>(&self, input: impl Into<Input>, hook: F) -> Result<Outcome<R, E>, DecodeError>
    where
        F: FnOnce(V) -> Fut,
        Fut: Future<Output = R>,
    {
        Ok(match self.run(input)? {
            Outcome::Valid { data } => Outcome::Valid { data: hook(data).await },
            Outcome::Invalid { errors } => Outcome::Invalid { errors },
        })
    }
}
