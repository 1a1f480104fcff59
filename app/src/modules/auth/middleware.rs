use super::{
    dto::UserDto,
    session::{get_session_id_from_request_headers, SessionId},
};
use crate::{
    modules::common::{
        error_codes::{INVALID_SESSION, MISSING_PERMISSIONS, NO_SID_COOKIE},
        responses::{internal_error_msg, ApiError, SimpleError},
    },
    server::controller::AppState,
};
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use entity::{sea_orm_active_enums::UserRole, user};
use futures_util::future::BoxFuture;
use http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode};
use std::convert::Infallible;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::error;

/// The authenticated user of the request
#[derive(Clone, Debug)]
pub struct RequestUser(pub UserDto);

impl RequestUser {
    pub fn is_admin(&self) -> bool {
        self.0.role == UserRole::Admin
    }
}

/// the user of the request, if any, set by the `optional_user` middleware
#[derive(Clone, Debug)]
pub struct MaybeRequestUser(pub Option<UserDto>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeRequestUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestUser>()
            .map(|user| MaybeRequestUser(Some(user.0.clone())))
            .unwrap_or(MaybeRequestUser(None)))
    }
}

/// reads the token of a `Authorization: Bearer <token>` header
fn get_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// the credentials a request might be authenticated with
struct Credentials {
    session_id: Option<SessionId>,
    bearer_token: Option<String>,
}

impl Credentials {
    fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            session_id: get_session_id_from_request_headers(headers),
            bearer_token: get_bearer_token(headers),
        }
    }

    fn is_empty(&self) -> bool {
        self.session_id.is_none() && self.bearer_token.is_none()
    }

    /// finds the user of the credentials, the session cookie takes precedence over the token
    async fn resolve(&self, state: &AppState) -> anyhow::Result<Option<user::Model>> {
        if let Some(session_id) = self.session_id {
            if let Some(user) = state
                .auth_service
                .get_user_from_session_id(session_id)
                .await?
            {
                return Ok(Some(user));
            }
        }

        if let Some(token) = &self.bearer_token {
            return state.auth_service.get_user_from_token(token).await;
        }

        Ok(None)
    }
}

/// middleware for routes that require a user, authenticated by the session id cookie or a
/// bearer token, this queries the DB to get the request user, adds the following extensions:
///
/// - `RequestUser`
/// - `SessionId` (only for cookie sessions)
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, (StatusCode, SimpleError)> {
    let credentials = Credentials::from_headers(req.headers());

    if credentials.is_empty() {
        return Err((StatusCode::UNAUTHORIZED, SimpleError::from(NO_SID_COOKIE)));
    }

    let user = credentials.resolve(&state).await.map_err(|e| {
        error!("[AUTH] failed to fetch request user: {e}");
        internal_error_msg("failed to fetch user session")
    })?;

    match user {
        Some(user) => {
            if let Some(session_id) = credentials.session_id {
                req.extensions_mut().insert(session_id);
            }

            req.extensions_mut().insert(RequestUser(UserDto::from(user)));

            Ok(next.run(req).await)
        }
        None => Err((StatusCode::UNAUTHORIZED, SimpleError::from(INVALID_SESSION))),
    }
}

/// same as `require_user` but never rejects the request, routes using it should
/// extract `MaybeRequestUser`
pub async fn optional_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let credentials = Credentials::from_headers(req.headers());

    if !credentials.is_empty() {
        match credentials.resolve(&state).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(RequestUser(UserDto::from(user)));
            }
            Ok(None) => {}
            Err(e) => error!("[AUTH] failed to fetch optional request user: {e}"),
        }
    }

    next.run(req).await
}

/// A layer to be used as a middleware to authorize users by their role.
///
/// this requires the `RequestUser` extension to be available for the route
/// its protecting, otherwise the request will always fail since there is no
/// user to check the role of.
#[derive(Clone)]
pub struct RoleLayer {
    /// role the request user must have to allow the request to continue
    required_role: UserRole,
}

impl RoleLayer {
    pub fn admin() -> Self {
        RoleLayer {
            required_role: UserRole::Admin,
        }
    }
}

impl<S> Layer<S> for RoleLayer {
    type Service = RoleMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleMiddleware {
            inner,
            required_role: self.required_role,
        }
    }
}

#[derive(Clone)]
pub struct RoleMiddleware<S> {
    /// inner service to execute, normally the next middleware or the final route handler
    inner: S,
    required_role: UserRole,
}

impl<S> Service<Request<Body>> for RoleMiddleware<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let maybe_not_ready_inner = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, maybe_not_ready_inner);

        let role = req
            .extensions()
            .get::<RequestUser>()
            .map(|req_user| req_user.0.role);

        let required_role = self.required_role;

        Box::pin(async move {
            match role {
                Some(role) if role == required_role => inner.call(req).await,
                Some(_) => {
                    let err = ApiError {
                        error: String::from(MISSING_PERMISSIONS),
                        info: Some(vec![required_role.to_string()]),
                    };

                    Ok((StatusCode::FORBIDDEN, err).into_response())
                }
                None => Ok(internal_error_msg("cannot check user permissions").into_response()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn reads_bearer_tokens() {
        let mut headers = HeaderMap::new();
        assert_eq!(get_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(get_bearer_token(&headers), Some(String::from("abc.def.ghi")));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(get_bearer_token(&headers), None);
    }
}
