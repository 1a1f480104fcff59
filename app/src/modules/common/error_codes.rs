/// a action could not be executed because the request user lacks the required role
pub static MISSING_PERMISSIONS: &str = "MISSING_PERMISSIONS";

/// a request to a endpoint was not authorized because it did not contain
/// the session id cookie nor a bearer token in the request headers
pub static NO_SID_COOKIE: &str = "NO_SID_COOKIE";

/// a request to a endpoint was not authorized because the session on the
/// session id cookie is expired or does not exist, or the bearer token is invalid
pub static INVALID_SESSION: &str = "INVALID_SESSION";

/// google sign in was requested but the oauth client credentials are not configured
pub static OAUTH_NOT_CONFIGURED: &str = "OAUTH_NOT_CONFIGURED";

/// the state returned by the oauth provider does not match the one sent to it
pub static INVALID_OAUTH_STATE: &str = "INVALID_OAUTH_STATE";
