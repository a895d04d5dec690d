//! Phase-indexed HTTP middleware
//!
//! This crate builds HTTP responses out of small composable steps whose order is
//! checked by the compiler, and decodes request data into typed values with
//! path-qualified validation errors.
//!
//! - [`Middleware`]: the step type, indexed by the response [`phase`] it starts and ends in
//! - [`response`]: primitive steps: status, headers, cookies, content type, body, end
//! - [`decode`]: steps that read and validate params, query, body and headers
//!
//! A composed middleware is evaluated against a [`micro_conn::Conn`], which yields a
//! deferred [`Task`]. Nothing is written to the connection before the task runs.
//!
//! # Example
//!
//! ```
//! use http::StatusCode;
//! use micro_conn::HttpConn;
//! use micro_middleware::decode::{self, schema, Errors};
//! use micro_middleware::response::{end, json, status};
//!
//! let m = decode::param("id", schema::string())
//!     .flatten()
//!     .and_then(|id| status::<Errors>(StatusCode::OK).and(json(serde_json::json!({ "id": id }).to_string())))
//!     .and(end());
//!
//! let mut conn = HttpConn::builder().param("id", "42").build().unwrap();
//! futures::executor::block_on(m.eval(&mut conn).run()).unwrap();
//!
//! let response = conn.into_response();
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(&response.body()[..], br#"{"id":"42"}"#);
//! ```

mod middleware;

pub mod decode;
pub mod phase;
pub mod response;

#[cfg(test)]
mod mock;

pub use middleware::Middleware;
pub use middleware::Task;
