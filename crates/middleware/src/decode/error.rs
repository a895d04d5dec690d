use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// The outcome of decoding a raw value.
pub type Validation<T> = Result<T, Errors>;

/// One step of the path from the decoded root to a value: the key it was found
/// under and the name of the decoder applied to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    pub key: String,
    pub type_name: String,
}

/// The path from the decoded root to the value currently being decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    entries: Vec<ContextEntry>,
}

impl Context {
    /// The context of a root value, which has an empty key.
    pub fn root(type_name: impl Into<String>) -> Self {
        Self { entries: vec![ContextEntry { key: String::new(), type_name: type_name.into() }] }
    }

    /// The context of the value found under `key`.
    #[must_use]
    pub fn child(&self, key: impl Into<String>, type_name: impl Into<String>) -> Self {
        let mut entries = self.entries.clone();
        entries.push(ContextEntry { key: key.into(), type_name: type_name.into() });
        Self { entries }
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}: {}", entry.key, entry.type_name)?;
        }
        Ok(())
    }
}

/// A value that does not match its decoder.
///
/// Renders as `Invalid value <json> supplied to <path>`, an absent value renders as `undefined`:
///
/// ```text
/// Invalid value "a" supplied to : { foo: number }/foo: number
/// Invalid value undefined supplied to : string
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    value: Option<Value>,
    context: Context,
    message: String,
}

impl ValidationError {
    pub fn new(value: Option<&Value>, context: &Context) -> Self {
        let message = format!("Invalid value {} supplied to {context}", render_value(value));
        Self { value: value.cloned(), context: context.clone(), message }
    }

    /// An error with a message of its own instead of the path report.
    pub fn with_message(value: Option<&Value>, context: &Context, message: impl Into<String>) -> Self {
        Self { value: value.cloned(), context: context.clone(), message: message.into() }
    }

    /// The offending value, `None` when it was absent.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn render_value(value: Option<&Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "undefined".to_string(),
    }
}

/// A non-empty, ordered list of validation errors, one per invalid leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Errors {
    errors: Vec<ValidationError>,
}

impl Errors {
    pub fn new(error: ValidationError) -> Self {
        Self { errors: vec![error] }
    }

    /// Collects `errors`, `None` when there are none.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() { None } else { Some(Self { errors }) }
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: Errors) {
        self.errors.extend(other.errors);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// The rendered message of every error, in order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }
}

impl IntoIterator for Errors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl From<ValidationError> for Errors {
    fn from(error: ValidationError) -> Self {
        Errors::new(error)
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}
