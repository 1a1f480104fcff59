use crate::config::app_config;
use cookie::{
    time::{self, OffsetDateTime},
    Cookie, SameSite,
};
use http::{HeaderMap, HeaderValue};
use rand_chacha::ChaCha8Rng;
use rand_core::RngCore;

pub const SESSION_ID_COOKIE_NAME: &str = "sid";
pub const SESSION_DAYS_DURATION: i64 = 5;

/// a u128 that identifies a user session stored on the `session` database table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionId(u128);

impl SessionId {
    /// Creates a random session token from a random number generator
    pub fn generate_new(rng: &mut ChaCha8Rng) -> Self {
        let mut u128_pool = [0u8; 16];

        rng.fill_bytes(&mut u128_pool);

        Self(u128::from_le_bytes(u128_pool))
    }

    /// Creates a session id from a database value created by `into_database_value`
    ///
    /// returns `None` on error
    pub fn from_database_value(bytes: Vec<u8>) -> Option<Self> {
        <[u8; 16]>::try_from(bytes.as_slice())
            .ok()
            .map(|b| SessionId(u128::from_le_bytes(b)))
    }

    /// Converts the session id into a vec of bytes to be stored as binary
    pub fn into_database_value(self) -> Vec<u8> {
        self.0.to_le_bytes().to_vec()
    }

    /// converts the token into a session cookie
    fn into_cookie<'a>(self) -> Cookie<'a> {
        let mut cookie = Cookie::new(SESSION_ID_COOKIE_NAME, self.0.to_string());

        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(!app_config().is_development);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(time::Duration::days(SESSION_DAYS_DURATION));

        cookie
    }

    /// converts the token into a session cookie and parses it into a header value to be sent as a "Set-Cookie" header
    ///
    /// reference: https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Set-Cookie
    pub fn into_set_cookie_header(self) -> Option<HeaderValue> {
        cookie_to_header_value(self.into_cookie())
    }

    /// converts the token into a session cookie and parses it into a header value to be sent as a "Set-Cookie" header
    /// with a already expired date, this will cause the client browser to delete the cookie and thus end the session
    /// on the client side
    pub fn into_delete_cookie_header(self) -> Option<HeaderValue> {
        let mut cookie = self.into_cookie();

        cookie.set_max_age(None);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);

        cookie_to_header_value(cookie)
    }
}

impl From<u128> for SessionId {
    fn from(v: u128) -> Self {
        SessionId(v)
    }
}

pub fn cookie_to_header_value(cookie: Cookie) -> Option<HeaderValue> {
    cookie.to_string().parse::<HeaderValue>().ok()
}

/// finds the value of a cookie on the request `Cookie` headers
pub fn get_cookie_from_request_headers(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|raw| Cookie::parse(raw.trim().to_owned()).ok())
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
}

pub fn get_session_id_from_request_headers(headers: &HeaderMap) -> Option<SessionId> {
    get_cookie_from_request_headers(headers, SESSION_ID_COOKIE_NAME)
        .and_then(|sid| sid.parse::<u128>().ok())
        .map(SessionId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::SeedableRng;

    #[test]
    fn database_value_round_trip() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let sid = SessionId::generate_new(&mut rng);

        let bytes = sid.into_database_value();
        assert_eq!(bytes.len(), 16);
        assert_eq!(SessionId::from_database_value(bytes), Some(sid));
        assert_eq!(SessionId::from_database_value(vec![1, 2, 3]), None);
    }

    #[test]
    fn reads_sid_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("theme=dark; sid=1234; lang=en"),
        );

        assert_eq!(
            get_session_id_from_request_headers(&headers),
            Some(SessionId::from(1234))
        );

        headers.insert(http::header::COOKIE, HeaderValue::from_static("sid=abc"));
        assert_eq!(get_session_id_from_request_headers(&headers), None);
    }
}
