use crate::models::{CustomerProfile, ProductCriteria, ScoringWeights};

/// Calculate the fit score used to rank products that cleared every gate
///
/// Scoring formula:
/// score = (
///     credit_headroom * credit +        # (fico - min_fico) / 100
///     dscr_headroom * dscr +            # dscr - min_dscr
///     amount_fit * amount +             # 1 at the range midpoint, 0 at the edges
///     negative_days_quality * negative_days
/// )
///
/// A term whose inputs are missing on either side contributes nothing.
pub fn calculate_fit_score(
    product: &ProductCriteria,
    customer: &CustomerProfile,
    weights: &ScoringWeights,
) -> f64 {
    let mut score = 0.0;

    if let Some(headroom) = credit_headroom(product, customer) {
        score += weights.credit * headroom;
    }

    if let (Some(min_dscr), Some(dscr)) = (product.min_dscr, customer.dscr) {
        score += weights.dscr * (dscr - min_dscr);
    }

    if let Some(fit) = amount_fit(
        customer.requested_amount_usd,
        product.min_loan_amount_usd,
        product.max_loan_amount_usd,
    ) {
        score += weights.amount * fit;
    }

    if let (Some(max_days), Some(days)) = (
        product.negative_balance_days_avg,
        customer.negative_balance_days_avg,
    ) {
        score += weights.negative_days * negative_days_quality(days, max_days);
    }

    score
}

#[inline]
fn credit_headroom(product: &ProductCriteria, customer: &CustomerProfile) -> Option<f64> {
    let min_fico = product.min_personal_credit_score?;
    let fico = customer.personal_credit_score?;
    Some((fico - min_fico) / 100.0)
}

/// Calculate amount fit (0-1)
/// Requests closer to the middle of the loan range score higher
#[inline]
fn amount_fit(requested: Option<f64>, min: Option<f64>, max: Option<f64>) -> Option<f64> {
    let (requested, min, max) = (requested?, min?, max?);
    if max <= min {
        return None;
    }

    let mid = (max + min) / 2.0;
    let half = (max - min) / 2.0;
    let fit = 1.0 - (requested - mid).abs() / half;

    Some(fit.max(0.0))
}

/// Reward for staying under the allowed negative-balance days
///
/// Unclamped: goes negative once the customer exceeds the maximum.
#[inline]
fn negative_days_quality(customer_days: f64, max_days: f64) -> f64 {
    (max_days - customer_days) / max_days.max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_product() -> ProductCriteria {
        ProductCriteria {
            product_id: 1,
            bank_name: "Sample Bank".to_string(),
            min_personal_credit_score: Some(680.0),
            min_dscr: Some(1.2),
            min_loan_amount_usd: Some(50_000.0),
            max_loan_amount_usd: Some(250_000.0),
            negative_balance_days_avg: Some(3.0),
            ..Default::default()
        }
    }

    fn create_test_customer() -> CustomerProfile {
        CustomerProfile {
            personal_credit_score: Some(700.0),
            dscr: Some(1.3),
            requested_amount_usd: Some(150_000.0),
            negative_balance_days_avg: Some(2.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_calculate_fit_score() {
        let product = create_test_product();
        let customer = create_test_customer();

        let score = calculate_fit_score(&product, &customer, &ScoringWeights::default());

        // 0.25 * 0.2 + 0.25 * 0.1 + 0.25 * 1.0 + 0.25 * (1/3)
        let expected = 0.05 + 0.025 + 0.25 + 0.25 / 3.0;
        assert!((score - expected).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn test_missing_inputs_contribute_nothing() {
        let product = ProductCriteria::default();
        let customer = create_test_customer();

        assert_eq!(calculate_fit_score(&product, &customer, &ScoringWeights::default()), 0.0);
    }

    #[test]
    fn test_amount_fit() {
        // Midpoint = max score
        assert_eq!(amount_fit(Some(150.0), Some(100.0), Some(200.0)), Some(1.0));

        // At either edge = zero
        assert_eq!(amount_fit(Some(100.0), Some(100.0), Some(200.0)), Some(0.0));
        assert_eq!(amount_fit(Some(200.0), Some(100.0), Some(200.0)), Some(0.0));

        // Outside the range clamps to zero
        assert_eq!(amount_fit(Some(500.0), Some(100.0), Some(200.0)), Some(0.0));

        // Degenerate range contributes nothing
        assert_eq!(amount_fit(Some(100.0), Some(100.0), Some(100.0)), None);
        assert_eq!(amount_fit(None, Some(100.0), Some(200.0)), None);
    }

    #[test]
    fn test_negative_days_quality_is_unclamped() {
        assert_eq!(negative_days_quality(0.0, 4.0), 1.0);
        assert_eq!(negative_days_quality(6.0, 4.0), -0.5);
        // Max below one divides by one
        assert_eq!(negative_days_quality(0.0, 0.5), 0.5);
        assert_eq!(negative_days_quality(2.0, 0.0), -2.0);
    }

    #[test]
    fn test_custom_weights() {
        let product = create_test_product();
        let customer = create_test_customer();
        let weights = ScoringWeights {
            credit: 1.0,
            dscr: 0.0,
            amount: 0.0,
            negative_days: 0.0,
        };

        let score = calculate_fit_score(&product, &customer, &weights);
        assert!((score - 0.2).abs() < 1e-9);
    }
}
