mod sellers;
mod transactions;

use actix_web::http::StatusCode;
use actix_web::{get, HttpResponse, Responder, ResponseError};
use serde_json::json;

pub use sellers::*;
pub use transactions::*;

use crate::auth::BearerAuth;
use crate::service::ServiceError;

#[get("/")]
pub async fn index(_auth: BearerAuth) -> impl Responder {
    HttpResponse::Ok().body("Welcome to the Commission Ledger Service!")
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Validation(errors) => HttpResponse::UnprocessableEntity().json(json!({
                "error": "validation failed",
                "errors": errors,
            })),
            ServiceError::NotFound(id) => HttpResponse::NotFound().json(json!({
                "error": format!("Transaction with id {} not found.", id),
            })),
            // Cause is logged server-side with the transaction id; the
            // caller only gets an opaque failure.
            ServiceError::Internal(_) => HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error. Please try again later.",
            })),
        }
    }
}
