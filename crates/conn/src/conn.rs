use crate::CookieOptions;
use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use serde_json::Value;

/// The capabilities a transport adapter exposes for one in-flight exchange.
///
/// Readers are independent of the response phase and hand out owned values, so a
/// decoder never holds a borrow of the connection. Writers are not checked against
/// the phase here: the middleware algebra only lets them run in the right order.
///
/// A connection is used by exactly one running middleware at a time, it is borrowed
/// mutably for the whole run and is never shared between exchanges.
#[async_trait]
pub trait Conn: Send {
    /// The path parameters as a structured value, an empty object when there are none.
    fn params(&self) -> Value;

    /// The query string, already parsed with nested brackets expanded.
    fn query(&self) -> Value;

    /// The request body, `None` when the request carried no body.
    fn body(&self) -> Option<Value>;

    /// The value of the named request header.
    ///
    /// A value that is not text is reported as absent, like a missing header.
    fn header(&self, name: &str) -> Option<String>;

    fn set_status(&mut self, status: StatusCode);

    fn set_header(&mut self, name: &str, value: &str);

    fn set_cookie(&mut self, name: &str, value: &str, options: &CookieOptions);

    fn clear_cookie(&mut self, name: &str, options: &CookieOptions);

    fn set_body(&mut self, body: Bytes);

    /// Completes the response. Calling it more than once has no further effect.
    async fn end_response(&mut self);
}
