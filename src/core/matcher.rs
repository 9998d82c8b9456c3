use crate::models::{CustomerProfile, ProductCriteria, ProductMatch, ScoringWeights};
use crate::core::{
    filters::{Rejection, Stage},
    scoring::calculate_fit_score,
};
use tracing::{debug, info};

/// Product dropped by one of the gates
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedProduct {
    pub product_id: i64,
    pub bank_name: String,
    pub reason: Rejection,
}

impl RejectedProduct {
    pub fn stage(&self) -> Stage {
        self.reason.stage()
    }
}

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ProductMatch>,
    pub total_candidates: usize,
    pub rejected: Vec<RejectedProduct>,
}

/// Main matching orchestrator - runs the catalog through the gate pipeline
///
/// # Pipeline Stages
/// 1. Eligibility (entity, industry, geography, tenure, revenue, relationship)
/// 2. Underwriting (credit scores, ratios, cash flow, negative balances)
/// 3. Deal fit (amount range, use of proceeds)
/// 4. Scoring and ranking
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Find the best-fitting products for a customer
    ///
    /// # Arguments
    /// * `customer` - The borrower profile, fixed for the whole run
    /// * `products` - Candidate catalog, in catalog order
    /// * `top` - Maximum number of matches to return
    ///
    /// # Returns
    /// MatchResult with matches sorted by descending score; equal scores
    /// keep their catalog order
    pub fn find_matches(
        &self,
        customer: &CustomerProfile,
        products: &[ProductCriteria],
        top: usize,
    ) -> MatchResult {
        let mut matches = Vec::new();
        let mut rejected = Vec::new();

        for product in products {
            let verdict = Stage::PIPELINE
                .iter()
                .try_for_each(|stage| stage.check(product, customer));

            if let Err(reason) = verdict {
                debug!(
                    "Product {} ({}) rejected at {}: {}",
                    product.product_id,
                    product.bank_name,
                    reason.stage().as_str(),
                    reason
                );
                rejected.push(RejectedProduct {
                    product_id: product.product_id,
                    bank_name: product.bank_name.clone(),
                    reason,
                });
                continue;
            }

            let score = calculate_fit_score(product, customer, &self.weights);
            matches.push(ProductMatch {
                bank_name: product.bank_name.clone(),
                product_id: product.product_id,
                score: round_score(score),
                min_amount_usd: product.min_loan_amount_usd,
                max_amount_usd: product.max_loan_amount_usd,
            });
        }

        // Stable sort keeps catalog order for ties; unscorable products rank last
        matches.sort_by(|a, b| rank_key(b.score).total_cmp(&rank_key(a.score)));
        let survivors = matches.len();
        matches.truncate(top);

        info!(
            "Matched {} of {} products (returning {})",
            survivors,
            products.len(),
            matches.len()
        );

        MatchResult {
            matches,
            total_candidates: products.len(),
            rejected,
        }
    }
}

#[inline]
fn rank_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Round to 4 decimal places
#[inline]
fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}
