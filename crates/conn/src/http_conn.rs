//! In-memory adapter binding [`Conn`] to the [`http`] crate types.
//!
//! [`HttpConn`] is built from the head of an [`http::Request`], the raw body bytes and
//! the path parameters a router extracted. Request data is parsed once, at build time:
//!
//! - the query string through [`parse_query`]
//! - the body according to its `Content-Type`: JSON, url encoded form, or text
//!
//! Response writes accumulate in the connection and are turned into an
//! [`http::Response`] with [`HttpConn::into_response`] once the middleware has run.

use crate::{parse_query, Conn, ConnError, CookieOptions, MediaType};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, SET_COOKIE};
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, Request, Response, StatusCode};
use mime::Mime;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Configures and builds an [`HttpConn`].
#[derive(Debug)]
pub struct HttpConnBuilder {
    head: Option<Parts>,
    params: Map<String, Value>,
    query: Option<String>,
    body: Option<Bytes>,
    default_media_type: MediaType,
}

impl HttpConnBuilder {
    fn new() -> Self {
        Self { head: None, params: Map::new(), query: None, body: None, default_media_type: MediaType::TextPlain }
    }

    /// The request line and headers, an empty `GET /` request when not set.
    #[must_use]
    pub fn head(mut self, head: Parts) -> Self {
        self.head = Some(head);
        self
    }

    /// Adds one path parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), Value::String(value.into()));
        self
    }

    /// Replaces the path parameters, `params` must be an object.
    pub fn params(mut self, params: Value) -> Result<Self, ConnError> {
        match params {
            Value::Object(map) => {
                self.params = map;
                Ok(self)
            }
            other => Err(ConnError::invalid_params(format!("expected an object, got {other}"))),
        }
    }

    /// Overrides the query string taken from the request uri.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// The raw request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// How to read a body whose request carries no `Content-Type`, `text/plain` by default.
    #[must_use]
    pub fn default_media_type(mut self, media_type: MediaType) -> Self {
        self.default_media_type = media_type;
        self
    }

    pub fn build(self) -> Result<HttpConn, ConnError> {
        let head = self.head.unwrap_or_else(|| Request::new(()).into_parts().0);

        let query = match self.query.as_deref().or_else(|| head.uri.query()) {
            Some(query) => parse_query(query)?,
            None => Value::Object(Map::new()),
        };

        let body = match self.body {
            Some(bytes) => Some(decode_body(&head.headers, bytes, self.default_media_type)?),
            None => None,
        };

        Ok(HttpConn {
            head,
            params: Value::Object(self.params),
            query,
            body,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            cookies: Vec::new(),
            response_body: Bytes::new(),
            ended: false,
        })
    }
}

fn decode_body(headers: &HeaderMap, bytes: Bytes, default_media_type: MediaType) -> Result<Value, ConnError> {
    let media_type = match headers.get(CONTENT_TYPE) {
        Some(value) => {
            let mime = value
                .to_str()
                .map_err(ConnError::invalid_header)?
                .parse::<Mime>()
                .map_err(ConnError::invalid_header)?;
            MediaType::from_mime(&mime).unwrap_or(MediaType::ApplicationOctetStream)
        }
        None => default_media_type,
    };

    match media_type {
        MediaType::ApplicationJson => serde_json::from_slice(&bytes).map_err(ConnError::invalid_body),
        MediaType::ApplicationFormUrlEncoded => {
            let form = std::str::from_utf8(&bytes).map_err(ConnError::invalid_body)?;
            parse_query(form).map_err(ConnError::invalid_body)
        }
        _ => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Ok(Value::String(text)),
            Err(_) => Ok(Value::Array(bytes.iter().map(|b| Value::from(*b)).collect())),
        },
    }
}

/// A connection over an already received request, collecting the response in memory.
#[derive(Debug)]
pub struct HttpConn {
    head: Parts,
    params: Value,
    query: Value,
    body: Option<Value>,

    status: StatusCode,
    headers: HeaderMap,
    cookies: Vec<(String, String)>,
    response_body: Bytes,
    ended: bool,
}

impl HttpConn {
    pub fn builder() -> HttpConnBuilder {
        HttpConnBuilder::new()
    }

    pub fn request_head(&self) -> &Parts {
        &self.head
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers written so far, cookies excluded.
    pub fn response_headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The pending `Set-Cookie` values, one per cookie name.
    pub fn cookies(&self) -> impl Iterator<Item = &str> {
        self.cookies.iter().map(|(_, cookie)| cookie.as_str())
    }

    pub fn response_body(&self) -> &Bytes {
        &self.response_body
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Assembles the response written to this connection.
    pub fn into_response(self) -> Response<Bytes> {
        let mut headers = self.headers;
        for (name, cookie) in self.cookies {
            match HeaderValue::try_from(cookie) {
                Ok(value) => {
                    headers.append(SET_COOKIE, value);
                }
                Err(e) => warn!(cookie = %name, cause = %e, "dropping cookie that is not a valid header value"),
            }
        }

        let mut response = Response::new(self.response_body);
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }

    fn replace_cookie(&mut self, name: &str, cookie: Result<String, ConnError>) {
        match cookie {
            Ok(cookie) => {
                self.cookies.retain(|(cookie_name, _)| cookie_name != name);
                self.cookies.push((name.to_owned(), cookie));
            }
            Err(e) => warn!(cookie = name, cause = %e, "dropping cookie"),
        }
    }
}

#[async_trait]
impl Conn for HttpConn {
    fn params(&self) -> Value {
        self.params.clone()
    }

    fn query(&self) -> Value {
        self.query.clone()
    }

    fn body(&self) -> Option<Value> {
        self.body.clone()
    }

    fn header(&self, name: &str) -> Option<String> {
        let value = self.head.headers.get(name)?;
        match value.to_str() {
            Ok(value) => Some(value.to_owned()),
            Err(e) => {
                debug!(header = name, cause = %e, "request header is not visible ascii, reading it as absent");
                None
            }
        }
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn set_header(&mut self, name: &str, value: &str) {
        let header_name = match HeaderName::try_from(name) {
            Ok(header_name) => header_name,
            Err(e) => {
                warn!(header = name, cause = %e, "dropping invalid header name");
                return;
            }
        };
        match HeaderValue::try_from(value) {
            Ok(header_value) => {
                self.headers.insert(header_name, header_value);
            }
            Err(e) => warn!(header = name, cause = %e, "dropping invalid header value"),
        }
    }

    fn set_cookie(&mut self, name: &str, value: &str, options: &CookieOptions) {
        self.replace_cookie(name, options.to_set_cookie(name, value));
    }

    fn clear_cookie(&mut self, name: &str, options: &CookieOptions) {
        self.replace_cookie(name, options.to_removal_cookie(name));
    }

    fn set_body(&mut self, body: Bytes) {
        self.response_body = body;
    }

    async fn end_response(&mut self) {
        if self.ended {
            debug!("response already ended");
            return;
        }
        self.ended = true;
    }
}
