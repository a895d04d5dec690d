//! A recording connection for unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use micro_conn::{parse_query, Conn, CookieOptions};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug)]
pub(crate) struct MockConn {
    params: Value,
    query: Value,
    request_body: Option<Value>,
    request_headers: BTreeMap<String, String>,

    pub status: Option<StatusCode>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
    pub cookies: BTreeMap<String, (String, CookieOptions)>,
    pub ended: bool,
    /// every write, in the order it happened
    pub log: Vec<String>,
}

impl MockConn {
    pub fn new() -> Self {
        Self {
            params: Value::Object(Map::new()),
            query: Value::Object(Map::new()),
            request_body: None,
            request_headers: BTreeMap::new(),
            status: None,
            headers: BTreeMap::new(),
            body: None,
            cookies: BTreeMap::new(),
            ended: false,
            log: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = parse_query(query).unwrap();
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.request_headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn assert_response(
        &self,
        status: Option<StatusCode>,
        headers: &BTreeMap<String, String>,
        body: Option<&str>,
        cookies: &BTreeMap<String, (String, CookieOptions)>,
    ) {
        assert_eq!(self.status, status);
        assert_eq!(&self.headers, headers);
        assert_eq!(self.body.as_deref(), body.map(str::as_bytes));
        assert_eq!(&self.cookies, cookies);
    }
}

#[async_trait]
impl Conn for MockConn {
    fn params(&self) -> Value {
        self.params.clone()
    }

    fn query(&self) -> Value {
        self.query.clone()
    }

    fn body(&self) -> Option<Value> {
        self.request_body.clone()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.request_headers.get(name).cloned()
    }

    fn set_status(&mut self, status: StatusCode) {
        self.log.push(format!("status {}", status.as_u16()));
        self.status = Some(status);
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.log.push(format!("header {name}"));
        self.headers.insert(name.to_string(), value.to_string());
    }

    fn set_cookie(&mut self, name: &str, value: &str, options: &CookieOptions) {
        self.log.push(format!("cookie {name}"));
        self.cookies.insert(name.to_string(), (value.to_string(), options.clone()));
    }

    fn clear_cookie(&mut self, name: &str, _options: &CookieOptions) {
        self.log.push(format!("clear cookie {name}"));
        self.cookies.remove(name);
    }

    fn set_body(&mut self, body: Bytes) {
        self.log.push("body".to_string());
        self.body = Some(body);
    }

    async fn end_response(&mut self) {
        self.log.push("end".to_string());
        self.ended = true;
    }
}
