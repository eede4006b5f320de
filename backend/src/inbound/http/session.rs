//! Cookie-pair session transport.
//!
//! The session is the `(username, passwordHash)` cookie pair the client
//! stores and replays on every request; there is no signed token and no
//! server-side session table. The password digest itself functions as the
//! bearer credential — a known weakness of this scheme, kept deliberately
//! rather than fixed silently. Handlers only ever act on the username and
//! re-read the server-held digest; the replayed hash is never fed into
//! identifier derivation.

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{Ready, ready};

use crate::domain::Error;

/// Cookie carrying the account name in plaintext.
pub const USERNAME_COOKIE: &str = "username";
/// Cookie carrying the password digest.
pub const PASSWORD_HASH_COOKIE: &str = "passwordHash";
/// Session lifetime: thirty days.
pub const SESSION_TTL: Duration = Duration::days(30);

/// Cookie-transport settings resolved once at startup.
#[derive(Clone, Copy, Debug)]
pub struct SessionSettings {
    /// Whether issued cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
}

/// The identity a request asserts through its session cookies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionCredentials {
    username: String,
    password_hash: String,
}

impl SessionCredentials {
    /// Account name asserted by the client.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Digest replayed by the client. Kept for completeness; derivation and
    /// lookups always use the stored digest instead.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }
}

/// Extractor reading the session cookie pair off the request.
///
/// Extraction itself never fails; [`SessionCookies::require`] turns an
/// absent pair into `401 Unauthorized`.
pub struct SessionCookies(Option<SessionCredentials>);

impl SessionCookies {
    /// The asserted identity, if both cookies are present.
    pub fn credentials(&self) -> Option<&SessionCredentials> {
        self.0.as_ref()
    }

    /// Require an authenticated session or return `401 Unauthorized`.
    pub fn require(&self) -> Result<&SessionCredentials, Error> {
        self.credentials()
            .ok_or_else(|| Error::unauthorized("Unauthorized"))
    }

    fn from_http_request(req: &HttpRequest) -> Self {
        let username = req.cookie(USERNAME_COOKIE).map(|c| c.value().to_owned());
        let password_hash = req
            .cookie(PASSWORD_HASH_COOKIE)
            .map(|c| c.value().to_owned());
        match (username, password_hash) {
            (Some(username), Some(password_hash)) if !username.is_empty() => Self(Some(
                SessionCredentials {
                    username,
                    password_hash,
                },
            )),
            _ => Self(None),
        }
    }
}

impl FromRequest for SessionCookies {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_http_request(req)))
    }
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(SESSION_TTL)
        .finish()
}

/// Build the cookie pair set on successful login or signup.
pub fn issue_cookies(
    username: &str,
    password_hash: &str,
    settings: SessionSettings,
) -> [Cookie<'static>; 2] {
    [
        session_cookie(USERNAME_COOKIE, username.to_owned(), settings.cookie_secure),
        session_cookie(
            PASSWORD_HASH_COOKIE,
            password_hash.to_owned(),
            settings.cookie_secure,
        ),
    ]
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// Expired cookies clearing the whole pair on logout.
///
/// Clears both halves; leaving `passwordHash` behind would keep a live
/// bearer credential on the client after logout.
pub fn removal_cookies() -> [Cookie<'static>; 2] {
    [
        removal_cookie(USERNAME_COOKIE),
        removal_cookie(PASSWORD_HASH_COOKIE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn extract(request: &HttpRequest) -> SessionCookies {
        SessionCookies::from_http_request(request)
    }

    #[rstest]
    fn both_cookies_present_yield_credentials() {
        let request = TestRequest::default()
            .cookie(Cookie::new(USERNAME_COOKIE, "bob"))
            .cookie(Cookie::new(PASSWORD_HASH_COOKIE, "abc123"))
            .to_http_request();

        let session = extract(&request);
        let credentials = session.require().expect("session present");
        assert_eq!(credentials.username(), "bob");
        assert_eq!(credentials.password_hash(), "abc123");
    }

    #[rstest]
    fn a_lone_username_cookie_is_no_session() {
        let request = TestRequest::default()
            .cookie(Cookie::new(USERNAME_COOKIE, "bob"))
            .to_http_request();

        assert!(extract(&request).credentials().is_none());
    }

    #[rstest]
    fn an_empty_username_cookie_is_no_session() {
        let request = TestRequest::default()
            .cookie(Cookie::new(USERNAME_COOKIE, ""))
            .cookie(Cookie::new(PASSWORD_HASH_COOKIE, "abc123"))
            .to_http_request();

        assert!(extract(&request).credentials().is_none());
    }

    #[rstest]
    fn missing_session_is_unauthorised() {
        let request = TestRequest::default().to_http_request();
        let error = extract(&request).require().expect_err("no session");
        assert_eq!(error.code(), crate::domain::ErrorCode::Unauthorized);
    }

    #[rstest]
    fn issued_cookies_carry_the_session_attributes() {
        let settings = SessionSettings {
            cookie_secure: true,
        };
        for cookie in issue_cookies("bob", "abc123", settings) {
            assert_eq!(cookie.path(), Some("/"));
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::Lax));
            assert_eq!(cookie.max_age(), Some(Duration::seconds(2_592_000)));
        }
    }

    #[rstest]
    fn development_mode_issues_insecure_cookies() {
        let settings = SessionSettings {
            cookie_secure: false,
        };
        let [username, _] = issue_cookies("bob", "abc123", settings);
        assert_eq!(username.secure(), Some(false));
    }

    #[rstest]
    fn removal_clears_both_halves_of_the_pair() {
        let [username, password_hash] = removal_cookies();
        assert_eq!(username.name(), USERNAME_COOKIE);
        assert_eq!(password_hash.name(), PASSWORD_HASH_COOKIE);
        for cookie in [username, password_hash] {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
    }
}
