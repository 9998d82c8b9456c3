use serde::{Deserialize, Serialize};
use crate::core::rules::Evaluation;
use crate::models::domain::ProductMatch;

/// Response for find matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<ProductMatch>,
    pub total_candidates: usize,
    /// Credit-box decision for the customer, absent when no rules are configured
    #[serde(rename = "creditDecision", skip_serializing_if = "Option::is_none")]
    pub credit_decision: Option<Evaluation>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Service identity returned from the root path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
