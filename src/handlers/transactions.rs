use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{get, post, web, Error, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::BearerAuth;
use crate::schema::{ProcessTransactionRequest, TransactionStatus};
use crate::service::ServiceError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct TransactionQuery {
    #[serde(default)]
    status: Option<String>,
}

#[post("/transactions")]
pub async fn process_transaction(
    _auth: BearerAuth,
    request: web::Json<ProcessTransactionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let transaction = app_state
        .service
        .process_transaction(request.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(transaction))
}

#[get("/transactions")]
pub async fn get_transactions(
    _auth: BearerAuth,
    query: web::Query<TransactionQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let status = match query.status.as_deref() {
        Some(raw) => match TransactionStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return Err(InternalError::new(
                    "Transaction status must be 'pending', 'completed' or 'failed'.",
                    StatusCode::BAD_REQUEST,
                )
                .into());
            }
        },
        None => None,
    };

    let transactions = app_state.service.list_transactions(status).await?;

    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/transactions/{id}")]
pub async fn get_transaction(
    _auth: BearerAuth,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let raw = path.into_inner();

    // An id that does not parse can never have been issued.
    let id = match Uuid::parse_str(&raw) {
        Ok(id) => id,
        Err(_) => {
            log::warn!("Transaction lookup with malformed id: {}", raw);
            return Err(ServiceError::NotFound(raw).into());
        }
    };

    let transaction = app_state.service.get_transaction(id).await?;

    Ok(HttpResponse::Ok().json(transaction))
}
