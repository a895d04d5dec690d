//! Cookie attributes handed to [`Conn::set_cookie`](crate::Conn::set_cookie) and
//! [`Conn::clear_cookie`](crate::Conn::clear_cookie).
//!
//! The middleware layer treats [`CookieOptions`] as an opaque value and passes it
//! to the adapter unchanged. [`HttpConn`](crate::HttpConn) renders it as the
//! attribute list of a `Set-Cookie` header.

use crate::ConnError;
use std::fmt;
use std::fmt::Write;
use std::time::Duration;

/// The `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of a cookie: scope, lifetime and flags.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use micro_conn::{CookieOptions, SameSite};
///
/// let options = CookieOptions::new()
///     .path("/")
///     .max_age(Duration::from_secs(3600))
///     .http_only(true)
///     .same_site(SameSite::Lax);
///
/// assert_eq!(
///     options.to_set_cookie("session", "abc").unwrap(),
///     "session=abc; Path=/; Max-Age=3600; HttpOnly; SameSite=Lax"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    domain: Option<String>,
    path: Option<String>,
    max_age: Option<Duration>,
    secure: bool,
    http_only: bool,
    same_site: Option<SameSite>,
}

impl CookieOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    #[must_use]
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn get_domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn get_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn get_max_age(&self) -> Option<Duration> {
        self.max_age
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    pub fn get_same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    /// Renders a `Set-Cookie` header value for `name=value` with these attributes.
    ///
    /// Fails when the name is not a token, or when the value, domain or path holds a
    /// character that would end the attribute it is written in.
    pub fn to_set_cookie(&self, name: &str, value: &str) -> Result<String, ConnError> {
        check_name(name)?;
        check_value(value)?;
        let mut cookie = format!("{name}={value}");
        self.write_attributes(&mut cookie, self.max_age)?;
        Ok(cookie)
    }

    /// Renders a `Set-Cookie` header value that makes the client drop the cookie.
    ///
    /// The cookie is scoped by these options and expires immediately.
    pub fn to_removal_cookie(&self, name: &str) -> Result<String, ConnError> {
        check_name(name)?;
        let mut cookie = format!("{name}=");
        self.write_attributes(&mut cookie, Some(Duration::ZERO))?;
        Ok(cookie)
    }

    fn write_attributes(&self, cookie: &mut String, max_age: Option<Duration>) -> Result<(), ConnError> {
        // writing into a String never fails
        if let Some(domain) = &self.domain {
            check_attribute("Domain", domain)?;
            let _ = write!(cookie, "; Domain={domain}");
        }
        if let Some(path) = &self.path {
            check_attribute("Path", path)?;
            let _ = write!(cookie, "; Path={path}");
        }
        if let Some(max_age) = max_age {
            let _ = write!(cookie, "; Max-Age={}", max_age.as_secs());
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if let Some(same_site) = self.same_site {
            let _ = write!(cookie, "; SameSite={same_site}");
        }
        Ok(())
    }
}

/// `token` of RFC 7230: visible ASCII except separators.
fn check_name(name: &str) -> Result<(), ConnError> {
    let is_token = |b: u8| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b);
    if name.is_empty() || !name.bytes().all(is_token) {
        return Err(ConnError::invalid_cookie(format!("invalid cookie name {name:?}")));
    }
    Ok(())
}

/// `cookie-octet` of RFC 6265: visible ASCII except `"`, `,`, `;` and `\`.
fn check_value(value: &str) -> Result<(), ConnError> {
    let is_cookie_octet = |b: u8| b.is_ascii_graphic() && !b"\",;\\".contains(&b);
    if !value.bytes().all(is_cookie_octet) {
        return Err(ConnError::invalid_cookie(format!("invalid cookie value {value:?}")));
    }
    Ok(())
}

fn check_attribute(attribute: &str, value: &str) -> Result<(), ConnError> {
    if !value.bytes().all(|b| (b == b' ' || b.is_ascii_graphic()) && b != b';') {
        return Err(ConnError::invalid_cookie(format!("invalid {attribute} attribute {value:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_cookie() {
        let options = CookieOptions::new();
        assert_eq!(options.to_set_cookie("name", "value").unwrap(), "name=value");
    }

    #[test]
    fn test_all_attributes() {
        let options = CookieOptions::new()
            .domain("example.com")
            .path("/app")
            .max_age(Duration::from_secs(60))
            .secure(true)
            .http_only(true)
            .same_site(SameSite::Strict);

        assert_eq!(
            options.to_set_cookie("id", "42").unwrap(),
            "id=42; Domain=example.com; Path=/app; Max-Age=60; Secure; HttpOnly; SameSite=Strict"
        );
    }

    #[test]
    fn test_removal_cookie_overrides_max_age() {
        let options = CookieOptions::new().path("/").max_age(Duration::from_secs(60));
        assert_eq!(options.to_removal_cookie("id").unwrap(), "id=; Path=/; Max-Age=0");
    }

    #[test]
    fn test_value_cannot_add_attributes() {
        let options = CookieOptions::new().path("/");
        assert!(matches!(
            options.to_set_cookie("session", "x; Domain=evil.com"),
            Err(ConnError::InvalidCookie { .. })
        ));
        assert!(options.to_set_cookie("session", "a,b").is_err());
        assert!(options.to_set_cookie("session", "quote\"d").is_err());
        assert!(options.to_set_cookie("session", "").is_ok());
    }

    #[test]
    fn test_invalid_name() {
        let options = CookieOptions::new();
        assert!(options.to_set_cookie("", "v").is_err());
        assert!(options.to_set_cookie("a b", "v").is_err());
        assert!(options.to_set_cookie("a=b", "v").is_err());
        assert!(options.to_removal_cookie("a;b").is_err());
    }

    #[test]
    fn test_invalid_attributes() {
        let domain = CookieOptions::new().domain("example.com; Secure");
        assert!(domain.to_set_cookie("id", "1").is_err());

        let path = CookieOptions::new().path("/a\nSet-Cookie: x=y");
        assert!(path.to_removal_cookie("id").is_err());
    }
}
