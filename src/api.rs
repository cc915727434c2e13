// 🌐 HTTP adapter - thin axum routes over the installment service
//
// Handlers parse ids and bodies, hand the blocking store work to
// `spawn_blocking`, and wrap results in the `ApiResponse` envelope.
// Amounts are accepted in major units (e.g. 1500.50) and reported in cents.

use crate::db::SqliteStore;
use crate::entities::{
    Client, ClientId, ClientStatusCount, DailyCollection, DashboardStats, NewClient, NewPayment,
    NewSale, Payment, PaymentId, Quota, QuotaId, QuotaMonthlySummary, Sale, SaleId,
};
use crate::error::Error;
use crate::money::Cents;
use crate::reconciliation::{BulkStateReconciler, ReconciliationReport};
use crate::service::InstallmentService;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: InstallmentService<SqliteStore>,
    pub reconciler: Arc<BulkStateReconciler<SqliteStore>>,
}

impl AppState {
    pub fn new(store: Arc<SqliteStore>, reconciler: Arc<BulkStateReconciler<SqliteStore>>) -> Self {
        AppState {
            service: InstallmentService::new(store),
            reconciler,
        }
    }
}

// ============================================================================
// Envelope + errors
// ============================================================================

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Library error carried out of a handler
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::InvalidId(_) | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
        Error::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: self.0.code(),
                message: self.0.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::ok(data))))
}

fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data))))
}

/// Run blocking service work off the async executor
async fn blocking<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&InstallmentService<SqliteStore>) -> crate::Result<T> + Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || work(&service))
        .await
        .map_err(|e| ApiError(Error::Persistence(format!("handler task failed: {}", e))))?
        .map_err(ApiError)
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub client_id: ClientId,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    /// Defaults to now
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub installments: u32,
    pub quota_amount: f64,
}

impl TryFrom<CreateSaleRequest> for NewSale {
    type Error = Error;

    fn try_from(req: CreateSaleRequest) -> Result<Self, Error> {
        Ok(NewSale {
            client_id: req.client_id,
            description: req.description,
            amount: Cents::try_from_major(req.amount)?,
            date: req.date.unwrap_or_else(Utc::now),
            installments: req.installments,
            quota_amount: Cents::try_from_major(req.quota_amount)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuotaRequest {
    pub amount: f64,
    pub due_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub quota_id: QuotaId,
    pub amount: f64,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl TryFrom<CreatePaymentRequest> for NewPayment {
    type Error = Error;

    fn try_from(req: CreatePaymentRequest) -> Result<Self, Error> {
        Ok(NewPayment {
            quota_id: req.quota_id,
            amount: Cents::try_from_major(req.amount)?,
            date: req.date,
        })
    }
}

/// `?year=2025` (default: current year) or `?year=all`
#[derive(Debug, Deserialize)]
pub struct MonthlySummaryParams {
    pub year: Option<String>,
}

impl MonthlySummaryParams {
    fn year_filter(&self) -> Result<Option<i32>, Error> {
        match self.year.as_deref().map(str::trim) {
            None | Some("") => Ok(Some(Utc::now().year())),
            Some("all") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| Error::InvalidInput(format!("invalid year: {:?}", raw))),
        }
    }
}

/// `?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`, both required
#[derive(Debug, Deserialize)]
pub struct DailyCollectionsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn parse_day(name: &str, value: Option<&str>) -> Result<NaiveDate, Error> {
    let raw = value.ok_or_else(|| Error::InvalidInput(format!("{} is required", name)))?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidInput(format!("{} must be YYYY-MM-DD, got {:?}", name, raw)))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/clients
async fn create_client(
    State(state): State<AppState>,
    Json(new_client): Json<NewClient>,
) -> ApiResult<Client> {
    let client = blocking(&state, move |svc| svc.create_client(&new_client)).await?;
    created(client)
}

/// GET /api/clients/:id
async fn get_client(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Client> {
    let id: ClientId = id.parse()?;
    ok(blocking(&state, move |svc| svc.get_client(id)).await?)
}

/// POST /api/sales - create a sale and its installment schedule
async fn create_sale(
    State(state): State<AppState>,
    Json(req): Json<CreateSaleRequest>,
) -> ApiResult<Sale> {
    let new_sale = NewSale::try_from(req)?;
    let sale = blocking(&state, move |svc| {
        let id = svc.create_sale(&new_sale)?;
        svc.get_sale(id)
    })
    .await?;
    created(sale)
}

/// GET /api/sales/:id - sale with its quotas
async fn get_sale(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Sale> {
    let id: SaleId = id.parse()?;
    ok(blocking(&state, move |svc| svc.get_sale(id)).await?)
}

/// DELETE /api/sales/:id
async fn delete_sale(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SaleId> {
    let id: SaleId = id.parse()?;
    blocking(&state, move |svc| svc.delete_sale(id)).await?;
    ok(id)
}

/// GET /api/quotas/:id - quota with its payments
async fn get_quota(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Quota> {
    let id: QuotaId = id.parse()?;
    ok(blocking(&state, move |svc| svc.get_quota(id)).await?)
}

/// PUT /api/quotas/:id - edit amount / due date
async fn update_quota(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateQuotaRequest>,
) -> ApiResult<Quota> {
    let id: QuotaId = id.parse()?;
    let amount = Cents::try_from_major(req.amount)?;
    ok(blocking(&state, move |svc| svc.update_quota(id, amount, req.due_date)).await?)
}

/// POST /api/payments
async fn create_payment(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentRequest>,
) -> ApiResult<Payment> {
    let new_payment = NewPayment::try_from(req)?;
    let payment = blocking(&state, move |svc| svc.create_payment(&new_payment)).await?;
    created(payment)
}

/// DELETE /api/payments/:id
async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PaymentId> {
    let id: PaymentId = id.parse()?;
    blocking(&state, move |svc| svc.delete_payment(id)).await?;
    ok(id)
}

/// GET /api/charts/clients/status-count
async fn client_status_count(State(state): State<AppState>) -> ApiResult<Vec<ClientStatusCount>> {
    ok(blocking(&state, |svc| svc.client_status_counts()).await?)
}

/// GET /api/charts/quotas/monthly-summary?year=
async fn quota_monthly_summary(
    State(state): State<AppState>,
    Query(params): Query<MonthlySummaryParams>,
) -> ApiResult<Vec<QuotaMonthlySummary>> {
    let year = params.year_filter()?;
    ok(blocking(&state, move |svc| svc.quota_monthly_summary(year)).await?)
}

/// GET /api/charts/quotas/available-years
async fn available_years(State(state): State<AppState>) -> ApiResult<Vec<i32>> {
    ok(blocking(&state, |svc| svc.available_years()).await?)
}

/// GET /api/charts/collections/daily?start_date=&end_date=
async fn daily_collections(
    State(state): State<AppState>,
    Query(params): Query<DailyCollectionsParams>,
) -> ApiResult<Vec<DailyCollection>> {
    let start = parse_day("start_date", params.start_date.as_deref())?;
    let end = parse_day("end_date", params.end_date.as_deref())?;
    ok(blocking(&state, move |svc| svc.daily_collections(start, end)).await?)
}

/// GET /api/charts/dashboard-stats
async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    ok(blocking(&state, |svc| svc.dashboard_stats()).await?)
}

/// POST /api/worker/update-states - run a full reconciliation now
async fn update_states(State(state): State<AppState>) -> ApiResult<ReconciliationReport> {
    ok(state.reconciler.run_full_reconciliation().await?)
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/clients", post(create_client))
        .route("/clients/:id", get(get_client))
        .route("/sales", post(create_sale))
        .route("/sales/:id", get(get_sale).delete(delete_sale))
        .route("/quotas/:id", get(get_quota).put(update_quota))
        .route("/payments", post(create_payment))
        .route("/payments/:id", delete(delete_payment))
        .route("/charts/clients/status-count", get(client_status_count))
        .route("/charts/quotas/monthly-summary", get(quota_monthly_summary))
        .route("/charts/quotas/available-years", get(available_years))
        .route("/charts/collections/daily", get(daily_collections))
        .route("/charts/dashboard-stats", get(dashboard_stats))
        .route("/worker/update-states", post(update_states))
        .with_state(state);

    Router::new().nest("/api", api_routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt; // oneshot

    fn make_router() -> Router {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let reconciler = Arc::new(BulkStateReconciler::new(Arc::clone(&store)));
        build_router(AppState::new(store, reconciler))
    }

    async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(json) => Body::from(json.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let router = make_router();
        let (status, body) = call(&router, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_sale_and_payment_flow() {
        let router = make_router();

        let (status, client) = call(
            &router,
            "POST",
            "/api/clients",
            Some(json!({ "name": "Carla", "lastname": "Sosa", "dni": "35111000" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let client_id = client["data"]["id"].as_i64().unwrap();
        assert_eq!(client["data"]["state"], "OK");

        let due = Utc::now() - chrono::Duration::days(40);
        let (status, sale) = call(
            &router,
            "POST",
            "/api/sales",
            Some(json!({
                "client_id": client_id,
                "description": "Cocina (1)",
                "amount": 2000.0,
                "date": due,
                "installments": 2,
                "quota_amount": 1000.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let quotas = sale["data"]["quotas"].as_array().unwrap();
        assert_eq!(quotas.len(), 2);
        assert_eq!(quotas[0]["amount"], 100_000);
        let quota_id = quotas[0]["id"].as_i64().unwrap();

        let (status, payment) = call(
            &router,
            "POST",
            "/api/payments",
            Some(json!({ "quota_id": quota_id, "amount": 250.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payment["data"]["client_id"], client_id);

        let (_, client) = call(&router, "GET", &format!("/api/clients/{}", client_id), None).await;
        assert_eq!(client["data"]["state"], "WARNING");

        let (status, quota) = call(&router, "GET", &format!("/api/quotas/{}", quota_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quota["data"]["is_paid"], false);
        assert_eq!(quota["data"]["payments"].as_array().unwrap().len(), 1);

        let payment_id = payment["data"]["id"].as_i64().unwrap();
        let (status, _) = call(&router, "DELETE", &format!("/api/payments/{}", payment_id), None).await;
        assert_eq!(status, StatusCode::OK);

        let sale_id = sale["data"]["id"].as_i64().unwrap();
        let (status, _) = call(&router, "DELETE", &format!("/api/sales/{}", sale_id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, client) = call(&router, "GET", &format!("/api/clients/{}", client_id), None).await;
        assert_eq!(client["data"]["state"], "OK");
    }

    #[tokio::test]
    async fn test_update_quota_propagates() {
        let router = make_router();
        let (_, client) = call(
            &router,
            "POST",
            "/api/clients",
            Some(json!({ "name": "Luis", "lastname": "Ríos" })),
        )
        .await;
        let client_id = client["data"]["id"].as_i64().unwrap();
        let (_, sale) = call(
            &router,
            "POST",
            "/api/sales",
            Some(json!({
                "client_id": client_id,
                "amount": 500.0,
                "installments": 1,
                "quota_amount": 500.0
            })),
        )
        .await;
        let quota_id = sale["data"]["quotas"][0]["id"].as_i64().unwrap();

        let (status, quota) = call(
            &router,
            "PUT",
            &format!("/api/quotas/{}", quota_id),
            Some(json!({ "amount": 500.0, "due_date": Utc::now() - chrono::Duration::days(70) })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(quota["data"]["state"], "SUSPENDED");
        let (_, client) = call(&router, "GET", &format!("/api/clients/{}", client_id), None).await;
        assert_eq!(client["data"]["state"], "SUSPENDED");
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let router = make_router();

        let (status, body) = call(&router, "GET", "/api/sales/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "invalid_id");

        let (status, body) = call(&router, "GET", "/api/clients/77", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");

        let (status, body) = call(
            &router,
            "POST",
            "/api/payments",
            Some(json!({ "quota_id": 1, "amount": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_params");
    }

    #[tokio::test]
    async fn test_status_count_and_manual_reconciliation() {
        let router = make_router();
        let (_, client) = call(
            &router,
            "POST",
            "/api/clients",
            Some(json!({ "name": "Ema", "lastname": "Gil" })),
        )
        .await;
        let client_id = client["data"]["id"].as_i64().unwrap();
        call(
            &router,
            "POST",
            "/api/sales",
            Some(json!({
                "client_id": client_id,
                "amount": 100.0,
                "date": Utc::now() - chrono::Duration::days(70),
                "installments": 1,
                "quota_amount": 100.0
            })),
        )
        .await;

        let (status, report) = call(&router, "POST", "/api/worker/update-states", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["data"]["quotas"]["applied"], 1);
        assert_eq!(report["data"]["clients"]["applied"], 1);

        let (status, counts) = call(&router, "GET", "/api/charts/clients/status-count", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            counts["data"],
            json!([
                { "state": "OK", "client_count": 0 },
                { "state": "WARNING", "client_count": 0 },
                { "state": "SUSPENDED", "client_count": 1 }
            ])
        );
    }

    #[tokio::test]
    async fn test_out_of_range_amounts_are_rejected() {
        let router = make_router();
        let (_, client) = call(
            &router,
            "POST",
            "/api/clients",
            Some(json!({ "name": "Iván", "lastname": "Mora" })),
        )
        .await;
        let client_id = client["data"]["id"].as_i64().unwrap();
        let (_, sale) = call(
            &router,
            "POST",
            "/api/sales",
            Some(json!({
                "client_id": client_id,
                "amount": 100.0,
                "installments": 1,
                "quota_amount": 100.0
            })),
        )
        .await;
        let quota_id = sale["data"]["quotas"][0]["id"].as_i64().unwrap();

        for amount in [1e17, 1e300] {
            let (status, body) = call(
                &router,
                "POST",
                "/api/payments",
                Some(json!({ "quota_id": quota_id, "amount": amount })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "invalid_params");
        }

        let (_, quota) = call(&router, "GET", &format!("/api/quotas/{}", quota_id), None).await;
        assert!(quota["data"].get("payments").is_none());

        // a normal payment still settles the quota afterwards
        let (status, _) = call(
            &router,
            "POST",
            "/api/payments",
            Some(json!({ "quota_id": quota_id, "amount": 100.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, quota) = call(&router, "GET", &format!("/api/quotas/{}", quota_id), None).await;
        assert_eq!(quota["data"]["is_paid"], true);

        let (status, _) = call(
            &router,
            "POST",
            "/api/sales",
            Some(json!({
                "client_id": client_id,
                "amount": 100.0,
                "installments": 5_000_000,
                "quota_amount": 1.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &router,
            "PUT",
            &format!("/api/quotas/{}", quota_id),
            Some(json!({ "amount": 1e300, "due_date": Utc::now() })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chart_routes() {
        let router = make_router();
        let (_, client) = call(
            &router,
            "POST",
            "/api/clients",
            Some(json!({ "name": "Rita", "lastname": "Soto" })),
        )
        .await;
        let client_id = client["data"]["id"].as_i64().unwrap();
        let (_, sale) = call(
            &router,
            "POST",
            "/api/sales",
            Some(json!({
                "client_id": client_id,
                "amount": 400.0,
                "date": "2024-05-15T12:00:00Z",
                "installments": 2,
                "quota_amount": 200.0
            })),
        )
        .await;
        let quota_id = sale["data"]["quotas"][0]["id"].as_i64().unwrap();
        call(
            &router,
            "POST",
            "/api/payments",
            Some(json!({ "quota_id": quota_id, "amount": 200.0, "date": "2024-05-20T10:00:00Z" })),
        )
        .await;

        let (status, summary) =
            call(&router, "GET", "/api/charts/quotas/monthly-summary?year=2024", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            summary["data"],
            json!([
                { "month": "2024-05", "total_amount": 20_000, "amount_paid": 20_000, "amount_not_paid": 0 },
                { "month": "2024-06", "total_amount": 20_000, "amount_paid": 0, "amount_not_paid": 20_000 }
            ])
        );

        let (status, all) =
            call(&router, "GET", "/api/charts/quotas/monthly-summary?year=all", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all["data"].as_array().unwrap().len(), 2);

        let (status, _) =
            call(&router, "GET", "/api/charts/quotas/monthly-summary?year=soon", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, years) = call(&router, "GET", "/api/charts/quotas/available-years", None).await;
        assert_eq!(years["data"], json!([2024]));

        let (status, daily) = call(
            &router,
            "GET",
            "/api/charts/collections/daily?start_date=2024-05-01&end_date=2024-05-31",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            daily["data"],
            json!([{ "collection_date": "2024-05-20", "total_collected": 20_000, "payment_count": 1 }])
        );

        let (status, body) =
            call(&router, "GET", "/api/charts/collections/daily?start_date=2024-05-01", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_params");

        let (status, _) = call(
            &router,
            "GET",
            "/api/charts/collections/daily?start_date=2024-06-01&end_date=2024-05-01",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, stats) = call(&router, "GET", "/api/charts/dashboard-stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["data"]["total_clients"], 1);
        assert_eq!(stats["data"]["total_sales"], 1);
        assert_eq!(stats["data"]["total_revenue"], 40_000);
        assert_eq!(stats["data"]["pending_amount"], 20_000);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&Error::not_found("sale", 1)), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&Error::InvalidId("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&Error::InvalidInput("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&Error::Timeout), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(status_for(&Error::Persistence("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
