use crate::decode::{Context, Errors, Validation, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

/// Validates a raw value against a shape and turns it into a typed value.
///
/// `value` is `None` when the raw value is absent, e.g. a missing header or object field.
/// Implementations report every invalid leaf, each with the [`Context`] that leads to it.
pub trait Decoder {
    type Output;

    /// The name of the shape, used in error paths.
    fn name(&self) -> String;

    fn validate(&self, value: Option<&Value>, context: &Context) -> Validation<Self::Output>;

    /// Validates a root value.
    fn decode(&self, value: Option<&Value>) -> Validation<Self::Output> {
        self.validate(value, &Context::root(self.name()))
    }
}

pub trait DecoderExt: Decoder {
    /// Transforms the decoded value.
    fn map<B, F>(self, f: F) -> MapDecoder<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> B,
    {
        MapDecoder { decoder: self, f }
    }

    /// Deserializes the validated value into `T`.
    ///
    /// # Example
    /// ```
    /// use micro_middleware::decode::schema::{interface, number, string};
    /// use micro_middleware::decode::{Decoder, DecoderExt};
    /// use serde::Deserialize;
    /// use serde_json::json;
    ///
    /// #[derive(Deserialize, Debug, PartialEq)]
    /// struct User {
    ///     name: String,
    ///     age: u32,
    /// }
    ///
    /// let decoder = interface().field("name", string()).field("age", number()).typed::<User>();
    /// let user = decoder.decode(Some(&json!({"name": "tobi", "age": 3}))).unwrap();
    /// assert_eq!(user, User { name: "tobi".into(), age: 3 });
    /// ```
    fn typed<T>(self) -> TypedDecoder<Self, T>
    where
        Self: Sized,
        Self::Output: Into<Value>,
        T: DeserializeOwned,
    {
        TypedDecoder { decoder: self, _target: PhantomData }
    }
}

impl<D: Decoder + ?Sized> DecoderExt for D {}

#[derive(Clone, Copy)]
pub struct MapDecoder<D, F> {
    decoder: D,
    f: F,
}

impl<D: fmt::Debug, F> fmt::Debug for MapDecoder<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapDecoder").field("decoder", &self.decoder).finish_non_exhaustive()
    }
}

impl<D, F, B> Decoder for MapDecoder<D, F>
where
    D: Decoder,
    F: Fn(D::Output) -> B,
{
    type Output = B;

    fn name(&self) -> String {
        self.decoder.name()
    }

    fn validate(&self, value: Option<&Value>, context: &Context) -> Validation<B> {
        self.decoder.validate(value, context).map(&self.f)
    }
}

pub struct TypedDecoder<D, T> {
    decoder: D,
    _target: PhantomData<fn() -> T>,
}

impl<D: fmt::Debug, T> fmt::Debug for TypedDecoder<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedDecoder").field("decoder", &self.decoder).field("target", &type_name::<T>()).finish()
    }
}

impl<D, T> Decoder for TypedDecoder<D, T>
where
    D: Decoder,
    D::Output: Into<Value>,
    T: DeserializeOwned,
{
    type Output = T;

    fn name(&self) -> String {
        self.decoder.name()
    }

    fn validate(&self, value: Option<&Value>, context: &Context) -> Validation<T> {
        let validated: Value = self.decoder.validate(value, context)?.into();
        deserialize(validated, context)
    }
}

/// Decodes straight through serde, for types that carry their own shape.
///
/// The name in error paths is the last segment of the type name. A serde failure
/// yields a single error at the root, its message carries serde's own description.
pub struct SerdeDecoder<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for SerdeDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerdeDecoder").field("target", &type_name::<T>()).finish()
    }
}

impl<T> Clone for SerdeDecoder<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SerdeDecoder<T> {}

impl<T> SerdeDecoder<T> {
    pub(crate) fn new() -> Self {
        Self { _target: PhantomData }
    }
}

impl<T: DeserializeOwned> Decoder for SerdeDecoder<T> {
    type Output = T;

    fn name(&self) -> String {
        let full = type_name::<T>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base).to_string()
    }

    fn validate(&self, value: Option<&Value>, context: &Context) -> Validation<T> {
        match value {
            Some(value) => deserialize(value.clone(), context),
            None => Err(Errors::new(ValidationError::new(None, context))),
        }
    }
}

fn deserialize<T: DeserializeOwned>(value: Value, context: &Context) -> Validation<T> {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => Ok(decoded),
        Err(e) => {
            let report = ValidationError::new(Some(&value), context);
            let message = format!("{report} ({e})");
            Err(Errors::new(ValidationError::with_message(Some(&value), context, message)))
        }
    }
}
