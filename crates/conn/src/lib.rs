//! The connection side of a phase-indexed HTTP exchange
//!
//! This crate defines what a transport adapter has to provide so that response
//! pipelines built with `micro-middleware` can run against it:
//!
//! - [`Conn`]: the capability contract, read access to the request and write access to the response
//! - [`CookieOptions`] and [`SameSite`]: cookie attributes, passed through untouched
//! - [`MediaType`]: the fixed catalog of media types used for `Content-Type`
//! - [`HttpConn`]: an in-memory adapter over the [`http`] crate types
//!
//! The connection is never asked which phase of the response it is in. Ordering of
//! writes is enforced by the middleware algebra at compile time, the connection only
//! executes what it is told.
//!
//! # Example
//!
//! ```
//! use http::{Request, StatusCode};
//! use micro_conn::{Conn, HttpConn};
//!
//! let (head, ()) = Request::get("/users?page=2").body(()).unwrap().into_parts();
//! let mut conn = HttpConn::builder().head(head).build().unwrap();
//!
//! assert_eq!(conn.query()["page"], "2");
//!
//! conn.set_status(StatusCode::NO_CONTENT);
//! let response = conn.into_response();
//! assert_eq!(response.status(), StatusCode::NO_CONTENT);
//! ```

mod conn;
mod cookie;
mod error;
mod http_conn;
mod media_type;
mod query;

pub use conn::Conn;
pub use cookie::CookieOptions;
pub use cookie::SameSite;
pub use error::ConnError;
pub use http_conn::HttpConn;
pub use http_conn::HttpConnBuilder;
pub use media_type::MediaType;
pub use query::parse_query;
