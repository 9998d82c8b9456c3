use crate::models::CustomerProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Ge,
    Le,
    Gt,
    Lt,
    Eq,
}

impl Operator {
    #[inline]
    pub fn apply(self, value: f64, threshold: f64) -> bool {
        match self {
            Operator::Ge => value >= threshold,
            Operator::Le => value <= threshold,
            Operator::Gt => value > threshold,
            Operator::Lt => value < threshold,
            Operator::Eq => value == threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Eq => "==",
        }
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">=" => Ok(Operator::Ge),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            "<" => Ok(Operator::Lt),
            "==" => Ok(Operator::Eq),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Single credit-box rule
///
/// Hard rules decline on failure. Soft rules contribute `weight` to the
/// approval percentage when they pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub field: String,
    pub op: String,
    pub threshold: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default = "default_hard")]
    pub hard: bool,
}

fn default_weight() -> f64 { 1.0 }
fn default_hard() -> bool { true }

impl Rule {
    pub fn hard(field: impl Into<String>, op: impl Into<String>, threshold: f64) -> Self {
        Self {
            field: field.into(),
            op: op.into(),
            threshold,
            weight: default_weight(),
            hard: true,
        }
    }

    pub fn soft(
        field: impl Into<String>,
        op: impl Into<String>,
        threshold: f64,
        weight: f64,
    ) -> Self {
        Self {
            field: field.into(),
            op: op.into(),
            threshold,
            weight,
            hard: false,
        }
    }
}

/// Anything that can answer "what is metric X?"
pub trait MetricSource {
    fn metric(&self, name: &str) -> Option<f64>;
}

impl MetricSource for HashMap<String, f64> {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl MetricSource for HashMap<&str, f64> {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl MetricSource for HashMap<String, Option<f64>> {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name).copied().flatten()
    }
}

impl MetricSource for CustomerProfile {
    fn metric(&self, name: &str) -> Option<f64> {
        self.numeric_field(name)
    }
}

/// Outcome of evaluating a rule list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub approved: bool,
    pub score: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: Rule,
    operator: Option<Operator>,
}

#[derive(Debug, Deserialize)]
struct RuleDocument {
    #[serde(default)]
    rules: Vec<Rule>,
}

/// Evaluates metrics against an ordered list of rules
#[derive(Debug, Clone, Default)]
pub struct RulesEngine {
    rules: Vec<CompiledRule>,
    max_weight: f64,
}

impl RulesEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        // Unknown operators still count towards the soft weight total
        let max_weight = rules.iter().filter(|r| !r.hard).map(|r| r.weight).sum();
        let rules = rules
            .into_iter()
            .map(|rule| CompiledRule {
                operator: rule.op.parse().ok(),
                rule,
            })
            .collect();

        Self { rules, max_weight }
    }

    /// Build an engine from a TOML document of `[[rules]]` tables
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        let document: RuleDocument = toml::from_str(source)?;
        Ok(Self::new(document.rules))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate `metrics` against every rule in order
    ///
    /// A failing hard rule stops evaluation with `approved = false` and the
    /// raw soft weight accumulated so far. Otherwise the score is the passed
    /// soft weight as a percentage of all soft weight.
    pub fn evaluate<M: MetricSource + ?Sized>(&self, metrics: &M) -> Evaluation {
        let mut score = 0.0;
        let mut reasons = Vec::new();

        for CompiledRule { rule, operator } in &self.rules {
            let Some(operator) = operator else {
                reasons.push(format!("unknown operator {}", rule.op));
                continue;
            };

            let value = metrics.metric(&rule.field);
            let passed = value.is_some_and(|v| operator.apply(v, rule.threshold));

            if !passed {
                let shown = value.map_or_else(|| "None".to_string(), |v| v.to_string());
                reasons.push(format!(
                    "{} {} {} failed (value={})",
                    rule.field, operator, rule.threshold, shown
                ));
                if rule.hard {
                    return Evaluation {
                        approved: false,
                        score,
                        reasons,
                    };
                }
            } else if !rule.hard {
                score += rule.weight;
            }
        }

        let pct = if self.max_weight > 0.0 {
            score / self.max_weight * 100.0
        } else {
            0.0
        };

        Evaluation {
            approved: true,
            score: pct,
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(pairs: &[(&'static str, f64)]) -> HashMap<&'static str, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_approves_and_scores() {
        let engine = RulesEngine::new(vec![
            Rule::hard("fico", ">=", 660.0),
            Rule::soft("dscr", ">=", 1.2, 50.0),
            Rule::soft("years", ">=", 2.0, 50.0),
        ]);

        let result = engine.evaluate(&metrics(&[("fico", 700.0), ("dscr", 1.3), ("years", 5.0)]));

        assert!(result.approved);
        assert_eq!(result.score, 100.0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_declines_on_hard_rule() {
        let engine = RulesEngine::new(vec![Rule::hard("fico", ">=", 700.0)]);

        let result = engine.evaluate(&metrics(&[("fico", 650.0)]));

        assert!(!result.approved);
        assert_eq!(result.reasons, vec!["fico >= 700 failed (value=650)"]);
    }

    #[test]
    fn test_reason_uses_shortest_number_form() {
        let engine = RulesEngine::new(vec![Rule::soft("dscr", ">=", 1.25, 1.0), Rule::hard("fico", ">", 700.0)]);

        let result = engine.evaluate(&metrics(&[("dscr", 1.0), ("fico", 700.0)]));

        assert_eq!(
            result.reasons,
            vec!["dscr >= 1.25 failed (value=1)", "fico > 700 failed (value=700)"]
        );
    }

    #[test]
    fn test_hard_failure_stops_and_keeps_raw_score() {
        let engine = RulesEngine::new(vec![
            Rule::soft("dscr", ">=", 1.2, 30.0),
            Rule::soft("years", ">=", 2.0, 20.0),
            Rule::hard("fico", ">=", 700.0),
            Rule::soft("revenue", ">=", 1.0, 50.0),
        ]);

        let result = engine.evaluate(&metrics(&[("dscr", 1.5), ("years", 1.0), ("fico", 600.0)]));

        assert!(!result.approved);
        assert_eq!(result.score, 30.0);
        assert_eq!(
            result.reasons,
            vec![
                "years >= 2 failed (value=1)",
                "fico >= 700 failed (value=600)",
            ]
        );
    }

    #[test]
    fn test_soft_failure_reduces_percentage() {
        let engine = RulesEngine::new(vec![
            Rule::soft("dscr", ">=", 1.2, 3.0),
            Rule::soft("years", ">=", 2.0, 1.0),
        ]);

        let result = engine.evaluate(&metrics(&[("dscr", 1.3), ("years", 1.0)]));

        assert!(result.approved);
        assert_eq!(result.score, 75.0);
        assert_eq!(result.reasons.len(), 1);
    }

    #[test]
    fn test_unknown_operator_is_recorded_and_skipped() {
        let engine = RulesEngine::new(vec![
            Rule::hard("fico", "=>", 700.0),
            Rule::hard("dscr", ">", 1.0),
        ]);

        let result = engine.evaluate(&metrics(&[("dscr", 1.5)]));

        assert!(result.approved);
        assert_eq!(result.reasons, vec!["unknown operator =>"]);
    }

    #[test]
    fn test_missing_metric_fails_for_every_operator() {
        for op in [">=", "<=", ">", "<", "=="] {
            let engine = RulesEngine::new(vec![Rule::hard("avg_balance", op, 0.0)]);
            let result = engine.evaluate(&metrics(&[]));
            assert!(!result.approved, "operator {op} should fail on a missing metric");
            assert_eq!(
                result.reasons,
                vec![format!("avg_balance {op} 0 failed (value=None)")]
            );
        }
    }

    #[test]
    fn test_explicit_none_metric_fails() {
        let mut values: HashMap<String, Option<f64>> = HashMap::new();
        values.insert("dscr".to_string(), None);
        let engine = RulesEngine::new(vec![Rule::hard("dscr", ">=", 1.0)]);

        assert!(!engine.evaluate(&values).approved);
    }

    #[test]
    fn test_only_hard_rules_score_zero() {
        let engine = RulesEngine::new(vec![Rule::hard("fico", ">=", 600.0)]);
        let result = engine.evaluate(&metrics(&[("fico", 700.0)]));
        assert!(result.approved);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_operators() {
        assert!(Operator::Ge.apply(1.0, 1.0));
        assert!(Operator::Le.apply(1.0, 1.0));
        assert!(!Operator::Gt.apply(1.0, 1.0));
        assert!(!Operator::Lt.apply(1.0, 1.0));
        assert!(Operator::Eq.apply(1.0, 1.0));
        assert!("~=".parse::<Operator>().is_err());
    }

    #[test]
    fn test_from_toml() {
        let engine = RulesEngine::from_toml_str(
            r#"
            [[rules]]
            field = "personal_credit_score"
            op = ">="
            threshold = 660

            [[rules]]
            field = "dscr"
            op = ">="
            threshold = 1.25
            weight = 2.0
            hard = false
            "#,
        )
        .unwrap();

        assert_eq!(engine.len(), 2);

        let customer = CustomerProfile {
            personal_credit_score: Some(700.0),
            dscr: Some(1.3),
            ..Default::default()
        };
        let result = engine.evaluate(&customer);
        assert!(result.approved);
        assert_eq!(result.score, 100.0);
    }
}
