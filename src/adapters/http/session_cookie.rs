//! Session cookie transport.
//!
//! The cookie carries the signed session token and nothing else; all
//! authority comes from verifying it with the `SessionCodec`.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::domain::auth::SESSION_TTL_DAYS;

pub const SESSION_COOKIE_NAME: &str = "nextlevel_session";

/// Cookie attributes fixed at start.
#[derive(Debug, Clone, Default)]
pub struct SessionCookie {
    /// `Secure` flag; set in production.
    pub secure: bool,
    /// Host-locked when absent.
    pub domain: Option<String>,
}

impl SessionCookie {
    pub fn new(secure: bool, domain: Option<String>) -> Self {
        Self {
            secure,
            domain: domain.filter(|d| !d.trim().is_empty()),
        }
    }

    /// Raw session token from the request cookies.
    pub fn read(jar: &CookieJar) -> Option<&str> {
        jar.get(SESSION_COOKIE_NAME)
            .map(|c| c.value())
            .filter(|v| !v.is_empty())
    }

    pub fn set(&self, jar: CookieJar, token: String) -> CookieJar {
        jar.add(self.build(token, time::Duration::days(SESSION_TTL_DAYS)))
    }

    /// Overwrites the cookie with an empty, immediately expiring one.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(String::new(), time::Duration::ZERO))
    }

    fn build(&self, value: String, max_age: time::Duration) -> Cookie<'static> {
        let mut cookie = Cookie::build((SESSION_COOKIE_NAME, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age);
        if let Some(domain) = &self.domain {
            cookie = cookie.domain(domain.clone());
        }
        cookie.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(jar: CookieJar) -> String {
        jar.get(SESSION_COOKIE_NAME).unwrap().to_string()
    }

    #[test]
    fn set_cookie_attributes() {
        let cookie = SessionCookie::new(true, None);
        let value = header(cookie.set(CookieJar::new(), "tok".to_string()));

        assert!(value.starts_with("nextlevel_session=tok"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Secure"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Path=/"));
        assert!(value.contains("Max-Age=604800"));
        assert!(!value.contains("Domain"));
    }

    #[test]
    fn clear_expires_immediately_with_domain() {
        let cookie = SessionCookie::new(false, Some("nextlevelweb.ie".to_string()));
        let value = header(cookie.clear(CookieJar::new()));

        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("Domain=nextlevelweb.ie"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn blank_domain_is_host_locked() {
        assert_eq!(SessionCookie::new(false, Some(" ".to_string())).domain, None);
    }

    #[test]
    fn empty_cookie_reads_as_absent() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE_NAME, ""));
        assert_eq!(SessionCookie::read(&jar), None);
    }
}
