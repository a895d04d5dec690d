//! Built-in decoders for JSON shaped request data.
//!
//! | decoder | accepts | output | name |
//! |---|---|---|---|
//! | [`number`] | any JSON number | [`Number`] | `number` |
//! | [`integer`] | a number that fits an `i64` | `i64` | `Integer` |
//! | [`string`] | a JSON string | `String` | `string` |
//! | [`boolean`] | `true` / `false` | `bool` | `boolean` |
//! | [`array`] | an array of `d` | `Vec<_>` | `Array<d>` |
//! | [`optional`] | an absent value or `d` | `Option<_>` | `(d \| undefined)` |
//! | [`interface`] | an object with the declared fields | [`Map`] | `{ k: d, .. }` |
//! | [`serde`] | whatever `T` deserializes from | `T` | `T` |
//!
//! Query strings, path parameters and headers arrive as strings, so `number` rejects
//! `"1"`: parse such values with a decoder of your own or [`DecoderExt::typed`](crate::decode::DecoderExt::typed).

use crate::decode::{Context, Decoder, Errors, SerdeDecoder, Validation, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

fn invalid<T>(value: Option<&Value>, context: &Context) -> Validation<T> {
    Err(Errors::new(ValidationError::new(value, context)))
}

macro_rules! scalar_decoder {
    ($(#[$doc:meta])* $fn_name:ident, $ty:ident, $name:literal, $output:ty, |$value:ident| $extract:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        $(#[$doc])*
        pub fn $fn_name() -> $ty {
            $ty
        }

        impl Decoder for $ty {
            type Output = $output;

            fn name(&self) -> String {
                $name.to_string()
            }

            fn validate(&self, value: Option<&Value>, context: &Context) -> Validation<$output> {
                let extracted = value.and_then(|$value| $extract);
                match extracted {
                    Some(decoded) => Ok(decoded),
                    None => invalid(value, context),
                }
            }
        }
    };
}

scalar_decoder!(
    /// Any JSON number, integers keep their integer representation.
    number, NumberDecoder, "number", Number, |v| if let Value::Number(n) = v { Some(n.clone()) } else { None }
);
scalar_decoder!(integer, IntegerDecoder, "Integer", i64, |v| v.as_i64());
scalar_decoder!(string, StringDecoder, "string", String, |v| v.as_str().map(str::to_owned));
scalar_decoder!(boolean, BooleanDecoder, "boolean", bool, |v| v.as_bool());

#[derive(Debug, Clone)]
pub struct ArrayDecoder<D> {
    item: D,
}

/// An array whose every item matches `item`.
pub fn array<D: Decoder>(item: D) -> ArrayDecoder<D> {
    ArrayDecoder { item }
}

impl<D: Decoder> Decoder for ArrayDecoder<D> {
    type Output = Vec<D::Output>;

    fn name(&self) -> String {
        format!("Array<{}>", self.item.name())
    }

    fn validate(&self, value: Option<&Value>, context: &Context) -> Validation<Self::Output> {
        let Some(items) = value.and_then(Value::as_array) else {
            return invalid(value, context);
        };

        let item_name = self.item.name();
        let mut decoded = Vec::with_capacity(items.len());
        let mut errors: Option<Errors> = None;
        for (i, item) in items.iter().enumerate() {
            match self.item.validate(Some(item), &context.child(i.to_string(), item_name.as_str())) {
                Ok(output) => decoded.push(output),
                Err(e) => collect(&mut errors, e),
            }
        }

        match errors {
            Some(errors) => Err(errors),
            None => Ok(decoded),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptionalDecoder<D> {
    inner: D,
}

/// Accepts an absent value, otherwise decodes with `inner`.
pub fn optional<D: Decoder>(inner: D) -> OptionalDecoder<D> {
    OptionalDecoder { inner }
}

impl<D: Decoder> Decoder for OptionalDecoder<D> {
    type Output = Option<D::Output>;

    fn name(&self) -> String {
        format!("({} | undefined)", self.inner.name())
    }

    fn validate(&self, value: Option<&Value>, context: &Context) -> Validation<Self::Output> {
        match value {
            None => Ok(None),
            Some(_) => self.inner.validate(value, context).map(Some),
        }
    }
}

/// A field decoder whose output is brought back to JSON.
trait FieldDecoder: Send + Sync {
    fn field_name(&self) -> String;

    fn validate_value(&self, value: Option<&Value>, context: &Context) -> Validation<Value>;
}

impl<D> FieldDecoder for D
where
    D: Decoder + Send + Sync,
    D::Output: Into<Value>,
{
    fn field_name(&self) -> String {
        self.name()
    }

    fn validate_value(&self, value: Option<&Value>, context: &Context) -> Validation<Value> {
        self.validate(value, context).map(Into::into)
    }
}

/// An object with declared fields, built with [`Interface::field`].
///
/// Fields that are not declared are kept as they are. A declared field that is absent
/// from the input only passes when its decoder accepts an absent value, see [`optional`].
pub struct Interface {
    fields: Vec<(String, Box<dyn FieldDecoder>)>,
}

impl std::fmt::Debug for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interface").field("name", &self.name()).finish()
    }
}

pub fn interface() -> Interface {
    Interface { fields: Vec::new() }
}

impl Interface {
    #[must_use]
    pub fn field<D>(mut self, key: impl Into<String>, decoder: D) -> Self
    where
        D: Decoder + Send + Sync + 'static,
        D::Output: Into<Value>,
    {
        self.fields.push((key.into(), Box::new(decoder)));
        self
    }
}

impl Decoder for Interface {
    type Output = Map<String, Value>;

    fn name(&self) -> String {
        let fields: Vec<String> =
            self.fields.iter().map(|(key, decoder)| format!("{key}: {}", decoder.field_name())).collect();
        format!("{{ {} }}", fields.join(", "))
    }

    fn validate(&self, value: Option<&Value>, context: &Context) -> Validation<Self::Output> {
        let Some(object) = value.and_then(Value::as_object) else {
            return invalid(value, context);
        };

        let mut decoded = object.clone();
        let mut errors: Option<Errors> = None;
        for (key, decoder) in &self.fields {
            let field = object.get(key);
            match decoder.validate_value(field, &context.child(key.as_str(), decoder.field_name())) {
                Ok(output) => {
                    if field.is_some() {
                        decoded.insert(key.clone(), output);
                    }
                }
                Err(e) => collect(&mut errors, e),
            }
        }

        match errors {
            Some(errors) => Err(errors),
            None => Ok(decoded),
        }
    }
}

/// Decodes with the [`serde::Deserialize`] implementation of `T`.
pub fn serde<T: DeserializeOwned>() -> SerdeDecoder<T> {
    SerdeDecoder::new()
}

fn collect(errors: &mut Option<Errors>, more: Errors) {
    match errors {
        Some(errors) => errors.extend(more),
        None => *errors = Some(more),
    }
}
