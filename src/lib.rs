//! Bank Match - matches borrower profiles against commercial loan products
//!
//! The core runs a product catalog through ordered eligibility, underwriting,
//! and deal gates, then ranks survivors by a weighted fit score. A generic
//! rules engine evaluates credit-box thresholds with hard and soft rules.

pub mod config;
pub mod core;
pub mod etl;
pub mod models;
pub mod report;
pub mod routes;
pub mod services;
pub mod telemetry;

// Re-export commonly used types
pub use core::{Matcher, MatchResult, Rule, RulesEngine, Evaluation};
pub use models::{CustomerProfile, ProductCriteria, ProductMatch, ScoringWeights, TokenSet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let result = Matcher::default().find_matches(&CustomerProfile::default(), &[], 5);
        assert!(result.matches.is_empty());
        assert_eq!(result.total_candidates, 0);
    }
}
