use thiserror::Error;

/// Errors raised while an adapter prepares the request side of a connection.
#[derive(Error, Debug)]
pub enum ConnError {
    #[error("invalid query string: {reason}")]
    InvalidQuery { reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid path params: {reason}")]
    InvalidParams { reason: String },

    #[error("invalid cookie: {reason}")]
    InvalidCookie { reason: String },
}

impl ConnError {
    pub fn invalid_query<S: ToString>(str: S) -> Self {
        Self::InvalidQuery { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_params<S: ToString>(str: S) -> Self {
        Self::InvalidParams { reason: str.to_string() }
    }

    pub fn invalid_cookie<S: ToString>(str: S) -> Self {
        Self::InvalidCookie { reason: str.to_string() }
    }
}
