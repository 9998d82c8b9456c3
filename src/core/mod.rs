// Core algorithm exports
pub mod features;
pub mod filters;
pub mod matcher;
pub mod rules;
pub mod scoring;

pub use filters::{passes_deal, passes_eligibility, passes_underwriting, GateResult, Rejection, Stage};
pub use matcher::{MatchResult, Matcher, RejectedProduct};
pub use rules::{Evaluation, MetricSource, Operator, Rule, RulesEngine};
pub use scoring::calculate_fit_score;
