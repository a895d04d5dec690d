//! Primitive response combinators.
//!
//! Each combinator is a [`Middleware`] with a fixed phase transition:
//!
//! | combinator | from | to |
//! |---|---|---|
//! | [`status`], [`redirect`] | `StatusOpen` | `HeadersOpen` |
//! | [`header`], [`headers`], [`cookie`], [`clear_cookie`], [`content_type`] | `HeadersOpen` | `HeadersOpen` |
//! | [`close_headers`], [`json`] | `HeadersOpen` | `BodyOpen` |
//! | [`send`] | `BodyOpen` | `BodyOpen` |
//! | [`end`] | `BodyOpen` | `ResponseEnded` |
//!
//! The error type `L` is left open so the primitives fit in any chain, none of them fails.
//!
//! # Example
//! ```
//! use http::StatusCode;
//! use micro_conn::HttpConn;
//! use micro_middleware::response::{end, json, status};
//! use std::convert::Infallible;
//!
//! let m = status::<Infallible>(StatusCode::OK).and(json(r#"{"ok":true}"#)).and(end());
//!
//! let mut conn = HttpConn::builder().build().unwrap();
//! futures::executor::block_on(m.eval(&mut conn).run()).unwrap();
//!
//! let response = conn.into_response();
//! assert_eq!(response.headers()["content-type"], "application/json");
//! assert_eq!(&response.body()[..], br#"{"ok":true}"#);
//! ```

use bytes::Bytes;
use http::StatusCode;
use micro_conn::{CookieOptions, MediaType};

use crate::phase::{BodyOpen, HeadersOpen, Phase, ResponseEnded, StatusOpen};
use crate::Middleware;

/// A step that only moves the phase forward.
fn transition<I: Phase, O: Phase, L: Send + 'static>() -> Middleware<I, O, L, ()> {
    Middleware::from_fn(|_conn| Box::pin(async { Ok(()) }))
}

/// Writes the status code.
pub fn status<L: Send + 'static>(status: StatusCode) -> Middleware<StatusOpen, HeadersOpen, L, ()> {
    Middleware::from_fn(move |conn| {
        Box::pin(async move {
            conn.set_status(status);
            Ok(())
        })
    })
}

/// Writes one header.
pub fn header<L: Send + 'static>(
    name: impl Into<String>,
    value: impl Into<String>,
) -> Middleware<HeadersOpen, HeadersOpen, L, ()> {
    let (name, value) = (name.into(), value.into());
    Middleware::from_fn(move |conn| {
        Box::pin(async move {
            conn.set_header(&name, &value);
            Ok(())
        })
    })
}

/// Writes every header of `headers`, in iteration order.
pub fn headers<L, H, K, V>(headers: H) -> Middleware<HeadersOpen, HeadersOpen, L, ()>
where
    L: Send + 'static,
    H: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let headers: Vec<(String, String)> = headers.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
    Middleware::from_fn(move |conn| {
        Box::pin(async move {
            for (name, value) in &headers {
                conn.set_header(name, value);
            }
            Ok(())
        })
    })
}

pub fn cookie<L: Send + 'static>(
    name: impl Into<String>,
    value: impl Into<String>,
    options: CookieOptions,
) -> Middleware<HeadersOpen, HeadersOpen, L, ()> {
    let (name, value) = (name.into(), value.into());
    Middleware::from_fn(move |conn| {
        Box::pin(async move {
            conn.set_cookie(&name, &value, &options);
            Ok(())
        })
    })
}

/// Removes a cookie set earlier, `options` must match the scope it was set with.
pub fn clear_cookie<L: Send + 'static>(
    name: impl Into<String>,
    options: CookieOptions,
) -> Middleware<HeadersOpen, HeadersOpen, L, ()> {
    let name = name.into();
    Middleware::from_fn(move |conn| {
        Box::pin(async move {
            conn.clear_cookie(&name, &options);
            Ok(())
        })
    })
}

/// Writes the `Content-Type` header for a media type of the catalog.
pub fn content_type<L: Send + 'static>(media_type: MediaType) -> Middleware<HeadersOpen, HeadersOpen, L, ()> {
    header("Content-Type", media_type.as_str())
}

/// Commits the headers, the body may be written next.
pub fn close_headers<L: Send + 'static>() -> Middleware<HeadersOpen, BodyOpen, L, ()> {
    transition()
}

/// Writes the body.
pub fn send<L: Send + 'static>(content: impl Into<Bytes>) -> Middleware<BodyOpen, BodyOpen, L, ()> {
    let content = content.into();
    Middleware::from_fn(move |conn| {
        Box::pin(async move {
            conn.set_body(content);
            Ok(())
        })
    })
}

/// Completes the response.
pub fn end<L: Send + 'static>() -> Middleware<BodyOpen, ResponseEnded, L, ()> {
    Middleware::from_fn(|conn| {
        Box::pin(async move {
            conn.end_response().await;
            Ok(())
        })
    })
}

/// Responds with `302 Found` and a `Location` header.
pub fn redirect<L: Send + 'static>(location: impl Into<String>) -> Middleware<StatusOpen, HeadersOpen, L, ()> {
    status(StatusCode::FOUND).and(header("Location", location))
}

/// Declares a JSON body and writes `content` as is.
pub fn json<L: Send + 'static>(content: impl Into<Bytes>) -> Middleware<HeadersOpen, BodyOpen, L, ()> {
    content_type(MediaType::ApplicationJson).and(close_headers()).and(send(content))
}
