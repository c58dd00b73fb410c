use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Paths reachable without a token.
const PUBLIC_PATHS: &[&str] = &["/health"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: Option<String>,
}

/// Caller identity placed in request extensions after a successful check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
}

#[derive(Clone)]
pub struct JwtAuth {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn from_pem(pem: &str) -> Result<Self> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| Error::Config(format!("Failed to load public key: {}", e)))?;
        let mut validation = Validation::new(Algorithm::RS256);
        // `exp` is enforced when present but not required.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        Ok(Self { key, validation })
    }

    pub fn authenticate(&self, header: Option<&HeaderValue>) -> Result<AuthenticatedUser> {
        let token = header
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| Error::Unauthorized("Missing Authorization header".to_string()))?;

        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|_| Error::Unauthorized("Invalid token".to_string()))?
            .claims;

        match claims.email {
            Some(email) if !email.is_empty() => Ok(AuthenticatedUser { email }),
            _ => Err(Error::Unauthorized(
                "User not found in token claims".to_string(),
            )),
        }
    }
}

pub async fn require_bearer_auth(
    State(auth): State<Arc<JwtAuth>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if PUBLIC_PATHS.iter().any(|public| *public == path) {
        return next.run(req).await;
    }

    match auth.authenticate(req.headers().get(AUTHORIZATION)) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(err) => {
            tracing::warn!("Rejected {} {}: {}", req.method(), req.uri().path(), err.message());
            err.into_response()
        }
    }
}
