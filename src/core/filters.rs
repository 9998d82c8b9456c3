use crate::models::{CustomerProfile, ProductCriteria};
use thiserror::Error;

/// Gate in the matching pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Eligibility,
    Underwriting,
    Deal,
}

impl Stage {
    /// Fixed evaluation order of the gates
    pub const PIPELINE: [Stage; 3] = [Stage::Eligibility, Stage::Underwriting, Stage::Deal];

    #[inline]
    pub fn check(self, product: &ProductCriteria, customer: &CustomerProfile) -> GateResult {
        match self {
            Stage::Eligibility => passes_eligibility(product, customer),
            Stage::Underwriting => passes_underwriting(product, customer),
            Stage::Deal => passes_deal(product, customer),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Eligibility => "eligibility",
            Stage::Underwriting => "underwriting",
            Stage::Deal => "deal",
        }
    }
}

/// Why a gate declined a product
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Rejection {
    #[error("entity {} not allowed", shown(.0))]
    EntityNotAllowed(Option<String>),
    #[error("industry {} not allowed", shown(.0))]
    IndustryNotAllowed(Option<String>),
    #[error("industry {} excluded", shown(.0))]
    IndustryExcluded(Option<String>),
    #[error("state {} not in footprint", shown(.0))]
    StateOutsideFootprint(Option<String>),
    #[error("state {} excluded", shown(.0))]
    StateExcluded(Option<String>),
    #[error("insufficient years in business")]
    InsufficientYears,
    #[error("insufficient revenue")]
    InsufficientRevenue,
    #[error("requires existing relationship")]
    RequiresRelationship,

    #[error("personal credit below minimum")]
    PersonalCreditBelowMinimum,
    #[error("business credit below minimum")]
    BusinessCreditBelowMinimum,
    #[error("DSCR below minimum")]
    DscrBelowMinimum,
    #[error("current ratio below minimum")]
    CurrentRatioBelowMinimum,
    #[error("debt-to-equity above maximum")]
    DebtToEquityAboveMaximum,
    #[error("requires positive cashflow")]
    CashflowRequired,
    #[error("too many negative balance days")]
    NegativeBalanceDays,
    #[error("negative balance streak too long")]
    NegativeBalanceStreak,
    #[error("overdraft amount too large")]
    OverdraftTooLarge,

    #[error("amount below minimum")]
    AmountBelowMinimum,
    #[error("amount above maximum")]
    AmountAboveMaximum,
    #[error("purpose {} not allowed", shown(.0))]
    PurposeNotAllowed(Option<String>),
}

impl Rejection {
    pub fn stage(&self) -> Stage {
        use Rejection::*;
        match self {
            EntityNotAllowed(_) | IndustryNotAllowed(_) | IndustryExcluded(_)
            | StateOutsideFootprint(_) | StateExcluded(_) | InsufficientYears
            | InsufficientRevenue | RequiresRelationship => Stage::Eligibility,
            PersonalCreditBelowMinimum | BusinessCreditBelowMinimum | DscrBelowMinimum
            | CurrentRatioBelowMinimum | DebtToEquityAboveMaximum | CashflowRequired
            | NegativeBalanceDays | NegativeBalanceStreak | OverdraftTooLarge => Stage::Underwriting,
            AmountBelowMinimum | AmountAboveMaximum | PurposeNotAllowed(_) => Stage::Deal,
        }
    }
}

fn shown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("unspecified")
}

pub type GateResult = Result<(), Rejection>;

/// Customer value must reach the product minimum; a missing value counts as 0
#[inline]
fn below_minimum(customer_value: Option<f64>, minimum: Option<f64>) -> bool {
    minimum.is_some_and(|min| customer_value.unwrap_or(0.0) < min)
}

/// Customer value must not exceed the product maximum; a missing value counts as 0
#[inline]
fn above_maximum(customer_value: Option<f64>, maximum: Option<f64>) -> bool {
    maximum.is_some_and(|max| customer_value.unwrap_or(0.0) > max)
}

/// Check whether the customer is eligible for the product at all
///
/// This is Stage 1 of the matching pipeline.
pub fn passes_eligibility(product: &ProductCriteria, customer: &CustomerProfile) -> GateResult {
    let entity = customer.entity_type.as_deref();
    if !product.allowed_entities.is_empty() && !product.allowed_entities.contains(entity) {
        return Err(Rejection::EntityNotAllowed(customer.entity_type.clone()));
    }

    let industry = customer.industry.as_deref();
    if !product.allowed_industries.is_empty() && !product.allowed_industries.contains(industry) {
        return Err(Rejection::IndustryNotAllowed(customer.industry.clone()));
    }
    if product.excluded_industries.contains(industry) {
        return Err(Rejection::IndustryExcluded(customer.industry.clone()));
    }

    let state = customer.state.as_deref();
    let footprint = product.effective_footprint();
    if !footprint.is_empty() && !footprint.contains(state) {
        return Err(Rejection::StateOutsideFootprint(customer.state.clone()));
    }
    // Exclusions apply even when the footprint lists the state
    if product.excluded_states.contains(state) {
        return Err(Rejection::StateExcluded(customer.state.clone()));
    }

    if below_minimum(customer.years_in_business, product.min_years_in_business) {
        return Err(Rejection::InsufficientYears);
    }

    if below_minimum(customer.annual_revenue_usd, product.min_annual_revenue_usd) {
        return Err(Rejection::InsufficientRevenue);
    }

    // No relationship signal exists on the profile yet, so gated products always decline
    if product.requires_existing_relationship {
        return Err(Rejection::RequiresRelationship);
    }

    Ok(())
}

/// Check credit and financial-ratio thresholds
///
/// This is Stage 2 of the matching pipeline.
pub fn passes_underwriting(product: &ProductCriteria, customer: &CustomerProfile) -> GateResult {
    if below_minimum(customer.personal_credit_score, product.min_personal_credit_score) {
        return Err(Rejection::PersonalCreditBelowMinimum);
    }

    if below_minimum(customer.business_credit_score, product.min_business_credit_score) {
        return Err(Rejection::BusinessCreditBelowMinimum);
    }

    if below_minimum(customer.dscr, product.min_dscr) {
        return Err(Rejection::DscrBelowMinimum);
    }

    if below_minimum(customer.current_ratio, product.min_current_ratio) {
        return Err(Rejection::CurrentRatioBelowMinimum);
    }

    if above_maximum(customer.debt_to_equity, product.max_debt_to_equity) {
        return Err(Rejection::DebtToEquityAboveMaximum);
    }

    if product.cashflow_positive_required && !customer.cashflow_positive() {
        return Err(Rejection::CashflowRequired);
    }

    if above_maximum(customer.negative_balance_days_avg, product.negative_balance_days_avg) {
        return Err(Rejection::NegativeBalanceDays);
    }

    if above_maximum(
        customer.negative_balance_longest_streak,
        product.negative_balance_longest_streak,
    ) {
        return Err(Rejection::NegativeBalanceStreak);
    }

    if above_maximum(
        customer.negative_balance_max_overdraft_usd,
        product.negative_balance_max_overdraft_usd,
    ) {
        return Err(Rejection::OverdraftTooLarge);
    }

    Ok(())
}

/// Check that the requested transaction fits the product
///
/// This is Stage 3 of the matching pipeline. Amount bounds only apply when
/// both the request and the bound are known.
pub fn passes_deal(product: &ProductCriteria, customer: &CustomerProfile) -> GateResult {
    if let Some(amount) = customer.requested_amount_usd {
        if product.min_loan_amount_usd.is_some_and(|min| amount < min) {
            return Err(Rejection::AmountBelowMinimum);
        }
        if product.max_loan_amount_usd.is_some_and(|max| amount > max) {
            return Err(Rejection::AmountAboveMaximum);
        }
    }

    let purpose = customer.use_of_proceeds.as_deref();
    if !product.purpose_allowed.is_empty() && !product.purpose_allowed.contains(purpose) {
        return Err(Rejection::PurposeNotAllowed(customer.use_of_proceeds.clone()));
    }

    Ok(())
}
