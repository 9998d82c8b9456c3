use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use validator::Validate;
use crate::config::MatchingSettings;
use crate::core::{Matcher, RulesEngine};
use crate::models::{CustomerProfile, ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse, ServiceInfo};
use crate::services::{PostgresClient, PostgresError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub matcher: Matcher,
    pub credit_box: Arc<RulesEngine>,
    pub matching: MatchingSettings,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matches/find", web::post().to(find_matches));
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

/// Turn malformed request bodies into the same JSON error shape as the handlers
pub fn json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let response = error_response(StatusCode::BAD_REQUEST, "invalid_json", format!("Invalid JSON: {}", err));
    error::InternalError::from_response(err, response).into()
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Service identity endpoint
pub async fn service_info() -> impl Responder {
    HttpResponse::Ok().json(ServiceInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Resolve the customer from a stored id or the inline fields
async fn resolve_customer(
    state: &AppState,
    req: FindMatchesRequest,
) -> Result<CustomerProfile, HttpResponse> {
    if let Some(customer_id) = req.customer_id {
        return state.postgres.fetch_customer(customer_id).await.map_err(|e| match e {
            PostgresError::NotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "Customer not found", e.to_string())
            }
            other => {
                tracing::error!("Failed to fetch customer {}: {}", customer_id, other);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch customer",
                    other.to_string(),
                )
            }
        });
    }

    match req.profile {
        Some(profile) => profile
            .into_profile()
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, "Invalid profile", e.to_string())),
        None => Err(error_response(
            StatusCode::BAD_REQUEST,
            "Invalid request",
            "either customerId or profile is required".to_string(),
        )),
    }
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "customerId": 1,
///   "top": 5
/// }
/// ```
/// or with `"profile": { "state": "CA", ... }` instead of `customerId`.
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    let top = req
        .top
        .unwrap_or(state.matching.default_top)
        .min(state.matching.max_top);

    let customer = match resolve_customer(&state, req).await {
        Ok(customer) => customer,
        Err(response) => return response,
    };

    let Some(product_type) = customer.requested_product_type.clone() else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid profile",
            "customer has no requested product type".to_string(),
        );
    };

    let products = match state.postgres.fetch_products(&product_type).await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Failed to fetch products of type {}: {}", product_type, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch products",
                e.to_string(),
            );
        }
    };

    let result = state.matcher.find_matches(&customer, &products, top);

    let credit_decision = if state.credit_box.is_empty() {
        None
    } else {
        Some(state.credit_box.evaluate(&customer))
    };

    tracing::info!(
        "Returning {} matches for product type {} (from {} candidates)",
        result.matches.len(),
        product_type,
        result.total_candidates
    );

    HttpResponse::Ok().json(FindMatchesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
        credit_decision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status() {
        let response = error_response(StatusCode::NOT_FOUND, "Customer not found", "x".to_string());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_json_payload_error_is_bad_request() {
        let req = actix_web::test::TestRequest::post().uri("/api/v1/matches/find").to_http_request();
        let err = json_payload_error(error::JsonPayloadError::ContentType, &req);
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
