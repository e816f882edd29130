//! HTTP basic authentication middleware.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose, Engine};

use crate::config::AuthSettings;

/// Credentials every request must present.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    username: String,
    password: String,
    realm: String,
}

impl BasicAuth {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            realm: realm.into(),
        }
    }

    /// Build from settings; `None` when no password is configured.
    #[must_use]
    pub fn from_settings(settings: &AuthSettings) -> Option<Self> {
        if !settings.is_enabled() {
            return None;
        }
        let password = settings.password.clone()?;
        Some(Self::new(
            settings.username.clone(),
            password,
            settings.realm.clone(),
        ))
    }

    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Check an `Authorization` header value.
    #[must_use]
    pub fn verify(&self, header_value: &str) -> bool {
        let Some(encoded) = header_value
            .strip_prefix("Basic ")
            .or_else(|| header_value.strip_prefix("basic "))
        else {
            return false;
        };

        let Ok(decoded) = general_purpose::STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return false;
        };

        match decoded.split_once(':') {
            Some((user, pass)) => user == self.username && pass == self.password,
            None => false,
        }
    }

    /// Whether the request headers carry valid credentials.
    #[must_use]
    pub fn authorizes(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| self.verify(v))
    }

    /// 401 response asking the browser for credentials.
    #[must_use]
    pub fn challenge(&self) -> Response {
        let value = format!("Basic realm=\"{}\"", self.realm.replace('"', "'"));
        let mut response = (StatusCode::UNAUTHORIZED, "Authentication required").into_response();
        if let Ok(value) = HeaderValue::from_str(&value) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("realm", &self.realm)
            .finish()
    }
}

/// Reject requests without valid basic-auth credentials.
pub async fn require_basic_auth(
    State(auth): State<Arc<BasicAuth>>,
    request: Request,
    next: Next,
) -> Response {
    if auth.authorizes(request.headers()) {
        next.run(request).await
    } else {
        tracing::debug!(uri = %request.uri(), "Rejected unauthenticated request");
        auth.challenge()
    }
}
