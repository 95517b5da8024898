/// HTTP middleware for livestream-service
///
/// Session verification: a Bearer token (HS256 JWT whose `sub` is the numeric
/// user id) is checked once per request and the resulting `SessionUser` is
/// stored in request extensions for handlers to extract.
use crate::error::AppError;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

// =====================================================================
// Session tokens
// =====================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    /// Expiry, unix seconds
    pub exp: i64,
}

/// Verifies session tokens signed with the shared secret
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Return the authenticated user id carried by `token`
    pub fn verify(&self, token: &str) -> Result<i64, AppError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)
            .map_err(|_| AppError::Unauthorized("invalid or expired session".to_string()))?;

        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("invalid user id in session".to_string()))
    }
}

/// Sign a session token for `user_id` valid for `ttl_secs`
pub fn issue_session_token(
    secret: &str,
    user_id: i64,
    ttl_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp: chrono::Utc::now().timestamp() + ttl_secs,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn bearer_token(req: &ServiceRequest) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing session".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("invalid authorization scheme".to_string()))
}

// =====================================================================
// Middleware
// =====================================================================

/// Authenticated user id stored in request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser(pub i64);

/// Actix middleware that rejects requests without a valid session.
#[derive(Clone)]
pub struct SessionAuth {
    verifier: Arc<SessionVerifier>,
}

impl SessionAuth {
    pub fn new(verifier: Arc<SessionVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
        }))
    }
}

pub struct SessionAuthService<S> {
    service: Rc<S>,
    verifier: Arc<SessionVerifier>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let verified = bearer_token(&req).and_then(|token| self.verifier.verify(token));

        Box::pin(async move {
            let user_id = verified?;
            req.extensions_mut().insert(SessionUser(user_id));
            service.call(req).await
        })
    }
}

impl FromRequest for SessionUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<SessionUser>()
                .copied()
                .ok_or_else(|| AppError::Unauthorized("missing session".to_string()).into()),
        )
    }
}
