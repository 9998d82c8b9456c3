use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Set of tokens parsed from a comma-separated catalog column
///
/// Empty and whitespace-only tokens are dropped. Membership is a
/// case-sensitive exact match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet(Vec<String>);

impl TokenSet {
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn from_optional(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `None` is never a member
    #[inline]
    pub fn contains(&self, value: Option<&str>) -> bool {
        value.is_some_and(|v| self.0.iter().any(|token| token == v))
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for TokenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|token| token.as_ref().trim().to_string())
                .filter(|token| !token.is_empty())
                .collect(),
        )
    }
}

impl fmt::Display for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

impl Serialize for TokenSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            List(Vec<String>),
            Null(()),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => TokenSet::parse(&text),
            Raw::List(list) => list.into_iter().collect(),
            Raw::Null(()) => TokenSet::default(),
        })
    }
}

/// Borrower profile used for a single match run
///
/// Numeric fields are optional; the gates decide how an absent value
/// compares.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerProfile {
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub years_in_business: Option<f64>,
    #[serde(default)]
    pub annual_revenue_usd: Option<f64>,
    #[serde(default)]
    pub personal_credit_score: Option<f64>,
    #[serde(default)]
    pub business_credit_score: Option<f64>,
    #[serde(default)]
    pub dscr: Option<f64>,
    #[serde(default)]
    pub current_ratio: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub cashflow_positive: Option<bool>,
    #[serde(default)]
    pub negative_balance_days_avg: Option<f64>,
    #[serde(default)]
    pub negative_balance_longest_streak: Option<f64>,
    #[serde(default)]
    pub negative_balance_max_overdraft_usd: Option<f64>,
    #[serde(default)]
    pub requested_product_type: Option<String>,
    #[serde(default)]
    pub requested_amount_usd: Option<f64>,
    #[serde(default)]
    pub use_of_proceeds: Option<String>,
}

impl CustomerProfile {
    /// Helper to get cashflow_positive as a bool, defaulting to false
    pub fn cashflow_positive(&self) -> bool {
        self.cashflow_positive.unwrap_or(false)
    }

    /// Look up a numeric attribute by its column name
    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        match name {
            "years_in_business" => self.years_in_business,
            "annual_revenue_usd" => self.annual_revenue_usd,
            "personal_credit_score" => self.personal_credit_score,
            "business_credit_score" => self.business_credit_score,
            "dscr" => self.dscr,
            "current_ratio" => self.current_ratio,
            "debt_to_equity" => self.debt_to_equity,
            "cashflow_positive" => self.cashflow_positive.map(|v| if v { 1.0 } else { 0.0 }),
            "negative_balance_days_avg" => self.negative_balance_days_avg,
            "negative_balance_longest_streak" => self.negative_balance_longest_streak,
            "negative_balance_max_overdraft_usd" => self.negative_balance_max_overdraft_usd,
            "requested_amount_usd" => self.requested_amount_usd,
            _ => None,
        }
    }
}

/// Denormalized catalog entry: bank, product, and its eligibility,
/// underwriting, and deal/collateral views
///
/// A sub-view missing from storage simply leaves its thresholds unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCriteria {
    #[serde(alias = "id")]
    pub product_id: i64,
    pub bank_name: String,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub min_loan_amount_usd: Option<f64>,
    #[serde(default)]
    pub max_loan_amount_usd: Option<f64>,
    #[serde(default)]
    pub bank_footprint: TokenSet,

    // Eligibility
    #[serde(default)]
    pub allowed_entities: TokenSet,
    #[serde(default)]
    pub allowed_industries: TokenSet,
    #[serde(default)]
    pub excluded_industries: TokenSet,
    #[serde(default)]
    pub geographic_footprint: TokenSet,
    #[serde(default)]
    pub excluded_states: TokenSet,
    #[serde(default)]
    pub min_years_in_business: Option<f64>,
    #[serde(default)]
    pub min_annual_revenue_usd: Option<f64>,
    #[serde(default)]
    pub requires_existing_relationship: bool,

    // Underwriting
    #[serde(default)]
    pub min_personal_credit_score: Option<f64>,
    #[serde(default)]
    pub min_business_credit_score: Option<f64>,
    #[serde(default)]
    pub min_dscr: Option<f64>,
    #[serde(default)]
    pub min_current_ratio: Option<f64>,
    #[serde(default)]
    pub max_debt_to_equity: Option<f64>,
    #[serde(default)]
    pub cashflow_positive_required: bool,
    #[serde(default)]
    pub negative_balance_days_avg: Option<f64>,
    #[serde(default)]
    pub negative_balance_longest_streak: Option<f64>,
    #[serde(default)]
    pub negative_balance_max_overdraft_usd: Option<f64>,

    // Deal / collateral
    #[serde(default, alias = "deal_purpose_allowed")]
    pub purpose_allowed: TokenSet,
    #[serde(default)]
    pub collateral_required: bool,
    #[serde(default)]
    pub eligible_collateral_types: TokenSet,
    #[serde(default)]
    pub max_ltv_real_estate: Option<f64>,
    #[serde(default)]
    pub max_ltv_equipment: Option<f64>,
    #[serde(default)]
    pub max_ltv_receivables: Option<f64>,
    #[serde(default)]
    pub max_ltv_inventory: Option<f64>,
    #[serde(default)]
    pub personal_guarantee: bool,
    #[serde(default)]
    pub guarantee_type: Option<String>,
    #[serde(default)]
    pub decision_timeline_prequal_days: Option<i32>,
    #[serde(default)]
    pub decision_timeline_underwriting_days: Option<i32>,
    #[serde(default)]
    pub average_time_to_fund_days: Option<i32>,
    #[serde(default)]
    pub special_conditions: Option<String>,
}

impl ProductCriteria {
    /// Product-level geography when given, otherwise the bank-wide footprint
    pub fn effective_footprint(&self) -> &TokenSet {
        if self.geographic_footprint.is_empty() {
            &self.bank_footprint
        } else {
            &self.geographic_footprint
        }
    }
}

/// Ranked product that cleared every gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMatch {
    #[serde(rename = "bank")]
    pub bank_name: String,
    pub product_id: i64,
    pub score: f64,
    #[serde(rename = "min_amount")]
    pub min_amount_usd: Option<f64>,
    #[serde(rename = "max_amount")]
    pub max_amount_usd: Option<f64>,
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub credit: f64,
    pub dscr: f64,
    pub amount: f64,
    pub negative_days: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            credit: 0.25,
            dscr: 0.25,
            amount: 0.25,
            negative_days: 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_set_drops_blanks() {
        let set = TokenSet::parse(" CA, ,NY ,,");
        assert_eq!(set.tokens(), &["CA".to_string(), "NY".to_string()]);
    }

    #[test]
    fn test_token_set_is_case_sensitive() {
        let set = TokenSet::parse("LLC,S-Corp");
        assert!(set.contains(Some("LLC")));
        assert!(!set.contains(Some("llc")));
        assert!(!set.contains(None));
    }

    #[test]
    fn test_token_set_deserializes_text_and_list() {
        let from_text: TokenSet = serde_json::from_str("\"CA,NY\"").unwrap();
        let from_list: TokenSet = serde_json::from_str("[\"CA\", \" NY \"]").unwrap();
        let from_null: TokenSet = serde_json::from_str("null").unwrap();
        assert_eq!(from_text, from_list);
        assert!(from_null.is_empty());
    }

    #[test]
    fn test_effective_footprint_falls_back_to_bank() {
        let mut product = ProductCriteria {
            bank_footprint: TokenSet::parse("TX"),
            ..Default::default()
        };
        assert_eq!(product.effective_footprint().tokens(), &["TX".to_string()]);

        product.geographic_footprint = TokenSet::parse("CA");
        assert_eq!(product.effective_footprint().tokens(), &["CA".to_string()]);

        // A list of blanks carries no states, so the bank footprint applies
        product.geographic_footprint = TokenSet::parse(" , ");
        assert_eq!(product.effective_footprint().tokens(), &["TX".to_string()]);
    }

    #[test]
    fn test_numeric_field_lookup() {
        let customer = CustomerProfile {
            dscr: Some(1.4),
            cashflow_positive: Some(true),
            ..Default::default()
        };
        assert_eq!(customer.numeric_field("dscr"), Some(1.4));
        assert_eq!(customer.numeric_field("cashflow_positive"), Some(1.0));
        assert_eq!(customer.numeric_field("current_ratio"), None);
        assert_eq!(customer.numeric_field("unknown"), None);
    }
}
