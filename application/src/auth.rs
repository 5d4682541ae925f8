//! Authorization of administrative requests.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse as _, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use secrecy::{ExposeSecret as _, SecretString};
use tracing as log;

use crate::{define_error, Error};

/// Secret [`Key`] expected in the `Authorization: Bearer` header of the
/// administrative requests.
#[derive(Clone, Debug)]
pub struct Key(Arc<SecretString>);

impl Key {
    /// Creates a new [`Key`] if the provided `key` is not blank.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        (!key.trim().is_empty())
            .then(|| Self(Arc::new(SecretString::from(key))))
    }

    /// Checks whether the provided `token` matches this [`Key`].
    fn matches(&self, token: &str) -> bool {
        self.0.expose_secret() == token
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Se requiere autorización"]
        AuthorizationRequired,

        #[code = "INVALID_AUTHORIZATION"]
        #[status = UNAUTHORIZED]
        #[message = "Código de autorización inválido"]
        InvalidAuthorization,
    }
}

/// Middleware rejecting requests not bearing the configured [`Key`].
///
/// `OPTIONS` requests are let through untouched, so CORS preflights work.
pub async fn authorize(
    State(key): State<Key>,
    header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    req: Request,
    next: Next,
) -> Response {
    if req.method() == http::Method::OPTIONS {
        return next.run(req).await;
    }

    let err = match header {
        Ok(TypedHeader(auth)) if key.matches(auth.token()) => {
            return next.run(req).await;
        }
        Ok(_) => AuthError::InvalidAuthorization,
        Err(e) if e.is_missing() => AuthError::AuthorizationRequired,
        Err(e) => {
            log::debug!("malformed `Authorization` header: {e}");
            AuthError::InvalidAuthorization
        }
    };
    Error::from(err).into_response()
}

#[cfg(test)]
mod spec {
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt as _;

    use super::{authorize, Key};

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }).options(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                Key::new("s3cr3t").unwrap(),
                authorize,
            ))
    }

    async fn status(
        method: http::Method,
        auth: Option<&str>,
    ) -> http::StatusCode {
        let mut req = http::Request::builder().method(method).uri("/");
        if let Some(auth) = auth {
            req = req.header(http::header::AUTHORIZATION, auth);
        }
        app()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn rejects_blank_key() {
        assert!(Key::new("").is_none());
        assert!(Key::new("  ").is_none());
    }

    #[tokio::test]
    async fn accepts_matching_bearer() {
        assert_eq!(
            status(http::Method::GET, Some("Bearer s3cr3t")).await,
            http::StatusCode::OK,
        );
    }

    #[tokio::test]
    async fn rejects_missing_or_wrong_bearer() {
        for auth in [None, Some("Bearer wrong"), Some("Basic s3cr3t")] {
            assert_eq!(
                status(http::Method::GET, auth).await,
                http::StatusCode::UNAUTHORIZED,
                "{auth:?}",
            );
        }
    }

    #[tokio::test]
    async fn lets_options_through() {
        assert_eq!(
            status(http::Method::OPTIONS, None).await,
            http::StatusCode::OK,
        );
    }
}
