use actix_web::{get, web, Error, HttpResponse};

use crate::auth::BearerAuth;
use crate::state::AppState;

#[get("/sellers/{id}/commission-summary")]
pub async fn get_commission_summary(
    _auth: BearerAuth,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let seller_id = path.into_inner();

    let summary = app_state
        .service
        .get_commission_summary(&seller_id)
        .await?;

    Ok(HttpResponse::Ok().json(summary))
}
