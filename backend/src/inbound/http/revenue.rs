//! Revenue ledger endpoints.
//!
//! ```text
//! GET  /revenue             Entries owned by the session user, newest first
//! POST /revenue {"amount":42.5}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::RevenueEntry;
use crate::domain::ledger;
use crate::domain::ports::LedgerStore;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionCookies;

/// Submission body for `POST /revenue`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AmountRequest {
    /// Positive currency amount.
    #[serde(default)]
    #[schema(example = 42.5)]
    pub amount: Option<f64>,
}

/// List the session user's ledger entries, newest first.
#[utoipa::path(
    get,
    path = "/revenue",
    responses(
        (status = 200, description = "Ledger entries, timestamp descending", body = [RevenueEntry]),
        (status = 401, description = "No session"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["revenue"],
    operation_id = "listRevenue"
)]
#[get("/revenue")]
pub async fn list_revenue(
    store: web::Data<dyn LedgerStore>,
    session: SessionCookies,
) -> ApiResult<web::Json<Vec<RevenueEntry>>> {
    let credentials = session.require()?;
    let entries = ledger::history(store.get_ref(), credentials.username()).await?;
    debug!(
        username = credentials.username(),
        entries = entries.len(),
        "listed revenue history"
    );
    Ok(web::Json(entries))
}

/// Record a new ledger entry for the session user.
#[utoipa::path(
    post,
    path = "/revenue",
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Created entry", body = RevenueEntry),
        (status = 400, description = "Missing or non-positive amount"),
        (status = 401, description = "No session"),
        (status = 404, description = "Session user no longer exists"),
        (status = 409, description = "An entry already exists for this instant"),
        (status = 500, description = "Internal server error")
    ),
    tags = ["revenue"],
    operation_id = "recordRevenue"
)]
#[post("/revenue")]
pub async fn record_revenue(
    store: web::Data<dyn LedgerStore>,
    session: SessionCookies,
    payload: web::Json<AmountRequest>,
) -> ApiResult<web::Json<RevenueEntry>> {
    let credentials = session.require()?;
    let entry = ledger::record(store.get_ref(), credentials.username(), payload.amount).await?;
    Ok(web::Json(entry))
}
