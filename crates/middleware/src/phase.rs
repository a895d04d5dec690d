//! The phases of building a response.
//!
//! ```text
//! StatusOpen -> HeadersOpen -> BodyOpen -> ResponseEnded
//! ```
//!
//! Phases only exist at the type level. They are uninhabited marker types carried by
//! [`Middleware`](crate::Middleware) and are never stored or inspected at runtime.

mod sealed {
    pub trait Sealed {}
}

/// Marker for the closed set of response phases.
pub trait Phase: sealed::Sealed + 'static {}

/// Nothing has been written yet, the status line is still open.
#[derive(Debug)]
pub enum StatusOpen {}

/// The status is committed, headers may be written.
#[derive(Debug)]
pub enum HeadersOpen {}

/// Headers are committed, the body may be written.
#[derive(Debug)]
pub enum BodyOpen {}

/// The response is complete.
#[derive(Debug)]
pub enum ResponseEnded {}

macro_rules! impl_phase {
    ($($phase:ident)*) => {
        $(
            impl sealed::Sealed for $phase {}
            impl Phase for $phase {}
        )*
    };
}

impl_phase! { StatusOpen HeadersOpen BodyOpen ResponseEnded }
