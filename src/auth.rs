//! Bearer-token authentication
//!
//! The identity provider sits behind the `TokenVerifier` trait; the server
//! only needs "token in, stable user id out". The middleware enforces the
//! `Authorization: Bearer <token>` shape and stashes the verified user id
//! as a request extension for handlers that need it.

use std::collections::HashMap;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::api::AppState;
use crate::error::ServiceError;

/// Verified caller identity, injected as a request extension
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub uid: String,
}

/// Trait for identity-token verification
///
/// Implementations map an opaque bearer token to a stable user id, or fail.
/// Object-safe so the app state can hold `Arc<dyn TokenVerifier>`.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<String, ServiceError>;
}

/// Config-driven verifier mapping known tokens to user ids
///
/// Suitable for development and tests; a real identity-provider client
/// implements `TokenVerifier` in its place.
#[derive(Debug, Default)]
pub struct TokenMapVerifier {
    tokens: HashMap<String, String>,
}

impl TokenMapVerifier {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

impl TokenVerifier for TokenMapVerifier {
    fn verify(&self, token: &str) -> Result<String, ServiceError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(ServiceError::Unauthorized("invalid token"))
    }
}

/// Middleware requiring a valid bearer token on the request
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let Some(token) = header.strip_prefix("Bearer ") else {
        tracing::warn!("Missing or malformed Authorization header");
        return Err(ServiceError::Unauthorized("missing auth token"));
    };

    let uid = state.verifier.verify(token).map_err(|e| {
        tracing::warn!("Token verification failed");
        e
    })?;

    tracing::debug!(%uid, "Authenticated request");
    request.extensions_mut().insert(AuthedUser { uid });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_map_verifier() {
        let mut tokens = HashMap::new();
        tokens.insert("dev-token".to_string(), "user-1".to_string());
        let verifier = TokenMapVerifier::new(tokens);

        assert_eq!(verifier.verify("dev-token").unwrap(), "user-1");
        assert!(matches!(
            verifier.verify("wrong"),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_empty_verifier_rejects_everything() {
        let verifier = TokenMapVerifier::default();
        assert!(verifier.verify("").is_err());
        assert!(verifier.verify("anything").is_err());
    }
}
