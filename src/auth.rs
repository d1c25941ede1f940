use std::future::{ready, Ready};

use actix_web::error::InternalError;
use actix_web::http::{header, StatusCode};
use actix_web::{dev::Payload, web, Error, FromRequest, HttpRequest};

use crate::state::AppState;

/// External credential collaborator. The service keeps no sessions; anything
/// that can answer "is this bearer token valid" fits behind this seam.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> bool;
}

/// Checks tokens against a fixed set supplied at startup.
pub struct StaticTokenValidator {
    tokens: Vec<String>,
}

impl StaticTokenValidator {
    pub fn new(tokens: Vec<String>) -> Self {
        StaticTokenValidator { tokens }
    }
}

impl TokenValidator for StaticTokenValidator {
    fn validate(&self, token: &str) -> bool {
        self.tokens.iter().any(|known| known == token)
    }
}

/// Proof that the request carried a valid bearer credential. Extracted
/// before any handler body runs, so an unauthorized request never reaches
/// the transaction service.
pub struct BearerAuth;

impl FromRequest for BearerAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}

fn authorize(req: &HttpRequest) -> Result<BearerAuth, Error> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        log::error!("Token validator is not configured");
        return Err(InternalError::new(
            "Internal server error.",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .into());
    };

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if state.auth.validate(token) => Ok(BearerAuth),
        _ => {
            log::warn!("Rejected request with missing or invalid bearer token");
            Err(InternalError::new(
                "Missing or invalid bearer token.",
                StatusCode::UNAUTHORIZED,
            )
            .into())
        }
    }
}
