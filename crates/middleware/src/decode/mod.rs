//! Decoding of request data.
//!
//! Each combinator reads one raw value from the connection and validates it with a
//! [`Decoder`]. They work in any phase, leave the phase unchanged and never write to the
//! connection. The [`Validation`] is the value of the middleware, so a failed decode does
//! not stop the chain by itself: use [`Middleware::flatten`] to turn it into a failure, or
//! inspect it in the next step to answer with a client error.
//!
//! # Example
//! ```
//! use http::StatusCode;
//! use micro_conn::HttpConn;
//! use micro_middleware::decode::{self, schema};
//! use micro_middleware::response::{close_headers, end, send, status};
//! use std::convert::Infallible;
//!
//! let m = decode::header("token", schema::string()).and_then(|token| match token {
//!     Ok(_) => status::<Infallible>(StatusCode::OK).and(close_headers()).and(send("welcome")),
//!     Err(errors) => status(StatusCode::UNAUTHORIZED).and(close_headers()).and(send(errors.to_string())),
//! }).and(end());
//!
//! let mut conn = HttpConn::builder().build().unwrap();
//! futures::executor::block_on(m.eval(&mut conn).run()).unwrap();
//!
//! let response = conn.into_response();
//! assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
//! assert_eq!(&response.body()[..], b"Invalid value undefined supplied to : string");
//! ```

mod decoder;
mod error;
pub mod schema;

pub use decoder::Decoder;
pub use decoder::DecoderExt;
pub use decoder::MapDecoder;
pub use decoder::SerdeDecoder;
pub use decoder::TypedDecoder;
pub use error::Context;
pub use error::ContextEntry;
pub use error::Errors;
pub use error::Validation;
pub use error::ValidationError;

use serde_json::Value;
use tracing::debug;

use crate::phase::Phase;
use crate::Middleware;

fn report<T>(source: &str, validation: Validation<T>) -> Validation<T> {
    if let Err(errors) = &validation {
        debug!(source, errors = errors.len(), "request validation failed");
    }
    validation
}

/// Decodes the path parameter `name`.
pub fn param<I, L, D>(name: impl Into<String>, decoder: D) -> Middleware<I, I, L, Validation<D::Output>>
where
    I: Phase,
    L: Send + 'static,
    D: Decoder + Send + 'static,
    D::Output: Send + 'static,
{
    let name = name.into();
    Middleware::from_conn(move |conn| {
        let params = conn.params();
        Ok(report("param", decoder.decode(params.get(name.as_str()))))
    })
}

/// Decodes all path parameters as one value.
pub fn params<I, L, D>(decoder: D) -> Middleware<I, I, L, Validation<D::Output>>
where
    I: Phase,
    L: Send + 'static,
    D: Decoder + Send + 'static,
    D::Output: Send + 'static,
{
    Middleware::from_conn(move |conn| Ok(report("params", decoder.decode(Some(&conn.params())))))
}

/// Decodes the parsed query string.
pub fn query<I, L, D>(decoder: D) -> Middleware<I, I, L, Validation<D::Output>>
where
    I: Phase,
    L: Send + 'static,
    D: Decoder + Send + 'static,
    D::Output: Send + 'static,
{
    Middleware::from_conn(move |conn| Ok(report("query", decoder.decode(Some(&conn.query())))))
}

/// Decodes the request body.
pub fn body<I, L, D>(decoder: D) -> Middleware<I, I, L, Validation<D::Output>>
where
    I: Phase,
    L: Send + 'static,
    D: Decoder + Send + 'static,
    D::Output: Send + 'static,
{
    Middleware::from_conn(move |conn| Ok(report("body", decoder.decode(conn.body().as_ref()))))
}

/// Decodes the request header `name`, an absent header decodes as an absent value.
pub fn header<I, L, D>(name: impl Into<String>, decoder: D) -> Middleware<I, I, L, Validation<D::Output>>
where
    I: Phase,
    L: Send + 'static,
    D: Decoder + Send + 'static,
    D::Output: Send + 'static,
{
    let name = name.into();
    Middleware::from_conn(move |conn| {
        let value = conn.header(&name).map(Value::String);
        Ok(report("header", decoder.decode(value.as_ref())))
    })
}

#[cfg(test)]
mod tests {
    use super::schema::{array, interface, number, string};
    use super::*;
    use crate::mock::MockConn;
    use crate::phase::{HeadersOpen, StatusOpen};
    use serde_json::{json, Number};
    use std::collections::BTreeMap;
    use std::convert::Infallible;

    async fn run<T: Send + 'static>(
        m: Middleware<StatusOpen, StatusOpen, Infallible, Validation<T>>,
        mut conn: MockConn,
    ) -> Validation<T> {
        let Ok(validation) = m.eval(&mut conn).run().await;
        assert!(conn.log.is_empty());
        validation
    }

    fn messages<T: std::fmt::Debug>(validation: Validation<T>) -> Vec<String> {
        validation.unwrap_err().messages()
    }

    #[tokio::test]
    async fn test_param_success() {
        let conn = MockConn::new().with_params(json!({"foo": 1}));
        assert_eq!(run(param("foo", number()), conn).await, Ok(Number::from(1)));
    }

    #[tokio::test]
    async fn test_param_failure() {
        let conn = MockConn::new().with_params(json!({"foo": "a"}));
        assert_eq!(messages(run(param("foo", number()), conn).await), vec![r#"Invalid value "a" supplied to : number"#]);
    }

    #[tokio::test]
    async fn test_missing_param() {
        let conn = MockConn::new().with_params(json!({}));
        assert_eq!(
            messages(run(param("foo", number()), conn).await),
            vec!["Invalid value undefined supplied to : number"]
        );
    }

    #[tokio::test]
    async fn test_params_success() {
        let conn = MockConn::new().with_params(json!({"foo": 1}));
        let decoded = run(params(interface().field("foo", number())), conn).await.unwrap();
        assert_eq!(Value::Object(decoded), json!({"foo": 1}));
    }

    #[tokio::test]
    async fn test_params_failure() {
        let conn = MockConn::new().with_params(json!({"foo": "a"}));
        assert_eq!(
            messages(run(params(interface().field("foo", number())), conn).await),
            vec![r#"Invalid value "a" supplied to : { foo: number }/foo: number"#]
        );
    }

    #[tokio::test]
    async fn test_query_success() {
        let conn = MockConn::new().with_query("q=tobi+ferret");
        let decoded = run(query(interface().field("q", string())), conn).await.unwrap();
        assert_eq!(Value::Object(decoded), json!({"q": "tobi ferret"}));
    }

    #[tokio::test]
    async fn test_nested_query_success() {
        let conn = MockConn::new().with_query("order=desc&shoe[color]=blue&shoe[type]=converse");
        let decoder = interface()
            .field("order", string())
            .field("shoe", interface().field("color", string()).field("type", string()));
        let decoded = run(query(decoder), conn).await.unwrap();
        assert_eq!(Value::Object(decoded), json!({"order": "desc", "shoe": {"color": "blue", "type": "converse"}}));
    }

    #[tokio::test]
    async fn test_query_failure() {
        let conn = MockConn::new().with_query("q=tobi+ferret");
        assert_eq!(
            messages(run(query(interface().field("q", number())), conn).await),
            vec![r#"Invalid value "tobi ferret" supplied to : { q: number }/q: number"#]
        );
    }

    #[tokio::test]
    async fn test_nested_query_failure() {
        let conn = MockConn::new().with_query("shoe[color]=blue");
        let decoder = interface().field("shoe", interface().field("size", number()));
        assert_eq!(
            messages(run(query(decoder), conn).await),
            vec!["Invalid value undefined supplied to : { shoe: { size: number } }/shoe: { size: number }/size: number"]
        );
    }

    #[tokio::test]
    async fn test_repeated_query_key_decodes_as_array() {
        let conn = MockConn::new().with_query("tag=a&tag=b");
        let decoded = run(query(interface().field("tag", array(string()))), conn).await.unwrap();
        assert_eq!(Value::Object(decoded), json!({"tag": ["a", "b"]}));
    }

    #[tokio::test]
    async fn test_body_success() {
        let conn = MockConn::new().with_body(json!(1));
        assert_eq!(run(body(number()), conn).await, Ok(Number::from(1)));
    }

    #[tokio::test]
    async fn test_body_failure() {
        let conn = MockConn::new().with_body(json!("a"));
        assert_eq!(messages(run(body(number()), conn).await), vec![r#"Invalid value "a" supplied to : number"#]);
    }

    #[tokio::test]
    async fn test_header_success() {
        let conn = MockConn::new().with_header("token", "mytoken");
        assert_eq!(run(header("token", string()), conn).await, Ok("mytoken".to_string()));
    }

    #[tokio::test]
    async fn test_header_failure() {
        let conn = MockConn::new();
        assert_eq!(
            messages(run(header("token", string()), conn).await),
            vec!["Invalid value undefined supplied to : string"]
        );
    }

    #[tokio::test]
    async fn test_decode_in_any_phase() {
        let mut conn = MockConn::new().with_header("token", "mytoken");
        let m = crate::response::status::<Infallible>(http::StatusCode::OK)
            .and(header::<HeadersOpen, _, _>("token", string()))
            .and_then(|token| crate::response::header("x-token", token.unwrap_or_default()));

        assert_eq!(m.eval(&mut conn).run().await, Ok(()));
        assert_eq!(conn.headers, BTreeMap::from([("x-token".to_string(), "mytoken".to_string())]));
    }
}
