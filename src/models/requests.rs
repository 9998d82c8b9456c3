use crate::core::features;
use crate::models::domain::CustomerProfile;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Errors raised while assembling a customer profile from inline fields
#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Request to find matching products
///
/// Either `customerId` references a stored profile, or `profile` carries
/// the inline fields.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[serde(alias = "customer_id", rename = "customerId", default)]
    pub customer_id: Option<i64>,
    #[validate(nested)]
    #[serde(default)]
    pub profile: Option<ProfileRequest>,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub top: Option<usize>,
}

/// Inline customer fields as supplied by a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(length(min = 1))]
    pub state: Option<String>,
    #[validate(length(min = 1))]
    pub industry: Option<String>,
    #[validate(length(min = 1))]
    pub entity_type: Option<String>,
    #[validate(range(min = 0.0))]
    pub years_in_business: Option<f64>,
    #[validate(range(min = 0.0))]
    pub annual_revenue_usd: Option<f64>,
    pub personal_credit_score: Option<f64>,
    pub business_credit_score: Option<f64>,
    pub dscr: Option<f64>,
    /// Used to derive `dscr` when it is not given directly
    pub ebitda: Option<f64>,
    pub annual_debt_service: Option<f64>,
    pub current_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub cashflow_positive: bool,
    pub negative_balance_days_avg: Option<f64>,
    pub negative_balance_longest_streak: Option<f64>,
    pub negative_balance_max_overdraft_usd: Option<f64>,
    #[validate(length(min = 1))]
    pub requested_product_type: Option<String>,
    #[validate(range(min = 0.0))]
    pub requested_amount_usd: Option<f64>,
    #[validate(length(min = 1))]
    pub use_of_proceeds: Option<String>,
}

impl ProfileRequest {
    /// Build a profile, failing with every absent required field
    pub fn into_profile(self) -> Result<CustomerProfile, ProfileError> {
        let dscr = self.dscr.or_else(|| match (self.ebitda, self.annual_debt_service) {
            (Some(ebitda), Some(debt_service)) => features::dscr(ebitda, debt_service),
            _ => None,
        });

        let required = [
            ("state", self.state.is_some()),
            ("industry", self.industry.is_some()),
            ("entity_type", self.entity_type.is_some()),
            ("years_in_business", self.years_in_business.is_some()),
            ("annual_revenue_usd", self.annual_revenue_usd.is_some()),
            ("personal_credit_score", self.personal_credit_score.is_some()),
            ("dscr", dscr.is_some()),
            ("requested_product_type", self.requested_product_type.is_some()),
            ("requested_amount_usd", self.requested_amount_usd.is_some()),
            ("use_of_proceeds", self.use_of_proceeds.is_some()),
        ];

        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ProfileError::MissingFields(missing));
        }

        Ok(CustomerProfile {
            entity_type: self.entity_type,
            industry: self.industry,
            state: self.state,
            years_in_business: self.years_in_business,
            annual_revenue_usd: self.annual_revenue_usd,
            personal_credit_score: self.personal_credit_score,
            business_credit_score: self.business_credit_score,
            dscr,
            current_ratio: self.current_ratio,
            debt_to_equity: self.debt_to_equity,
            cashflow_positive: Some(self.cashflow_positive),
            negative_balance_days_avg: self.negative_balance_days_avg,
            negative_balance_longest_streak: self.negative_balance_longest_streak,
            negative_balance_max_overdraft_usd: self.negative_balance_max_overdraft_usd,
            requested_product_type: self.requested_product_type,
            requested_amount_usd: self.requested_amount_usd,
            use_of_proceeds: self.use_of_proceeds,
        })
    }
}
