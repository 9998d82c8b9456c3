use crate::models::{CustomerProfile, ProductCriteria, TokenSet};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

const PRODUCTS_QUERY: &str = r#"
    SELECT p.id::int8 AS product_id, b.legal_name AS bank_name, p.product_type,
           p.min_loan_amount_usd::float8 AS min_loan_amount_usd,
           p.max_loan_amount_usd::float8 AS max_loan_amount_usd,
           b.lending_footprint AS bank_footprint,
           e.allowed_entities, e.allowed_industries, e.excluded_industries,
           e.geographic_footprint, e.excluded_states,
           e.min_years_in_business::float8 AS min_years_in_business,
           e.min_annual_revenue_usd::float8 AS min_annual_revenue_usd,
           COALESCE(e.requires_existing_relationship, FALSE) AS requires_existing_relationship,
           u.min_personal_credit_score::float8 AS min_personal_credit_score,
           u.min_business_credit_score::float8 AS min_business_credit_score,
           u.min_dscr::float8 AS min_dscr,
           u.min_current_ratio::float8 AS min_current_ratio,
           u.max_debt_to_equity::float8 AS max_debt_to_equity,
           COALESCE(u.cashflow_positive_required, FALSE) AS cashflow_positive_required,
           u.negative_balance_days_avg::float8 AS negative_balance_days_avg,
           u.negative_balance_longest_streak::float8 AS negative_balance_longest_streak,
           u.negative_balance_max_overdraft_usd::float8 AS negative_balance_max_overdraft_usd,
           c.purpose_allowed,
           COALESCE(c.collateral_required, FALSE) AS collateral_required,
           c.eligible_collateral_types,
           c.max_ltv_real_estate::float8 AS max_ltv_real_estate,
           c.max_ltv_equipment::float8 AS max_ltv_equipment,
           c.max_ltv_receivables::float8 AS max_ltv_receivables,
           c.max_ltv_inventory::float8 AS max_ltv_inventory,
           COALESCE(c.personal_guarantee, FALSE) AS personal_guarantee,
           c.guarantee_type,
           c.decision_timeline_prequal_days::int4 AS decision_timeline_prequal_days,
           c.decision_timeline_underwriting_days::int4 AS decision_timeline_underwriting_days,
           c.average_time_to_fund_days::int4 AS average_time_to_fund_days,
           c.special_conditions
    FROM products p
    JOIN banks b ON p.bank_id = b.id
    LEFT JOIN product_eligibility e ON e.product_id = p.id
    LEFT JOIN product_underwriting u ON u.product_id = p.id
    LEFT JOIN product_collateral c ON c.product_id = p.id
    WHERE p.product_type = $1
    ORDER BY p.id
"#;

const CUSTOMER_QUERY: &str = r#"
    SELECT entity_type, industry, state,
           years_in_business::float8 AS years_in_business,
           annual_revenue_usd::float8 AS annual_revenue_usd,
           personal_credit_score::float8 AS personal_credit_score,
           business_credit_score::float8 AS business_credit_score,
           dscr::float8 AS dscr,
           current_ratio::float8 AS current_ratio,
           debt_to_equity::float8 AS debt_to_equity,
           cashflow_positive,
           negative_balance_days_avg::float8 AS negative_balance_days_avg,
           negative_balance_longest_streak::float8 AS negative_balance_longest_streak,
           negative_balance_max_overdraft_usd::float8 AS negative_balance_max_overdraft_usd,
           requested_product_type,
           requested_amount_usd::float8 AS requested_amount_usd,
           use_of_proceeds
    FROM customer_profiles
    WHERE id = $1
"#;

/// Flat catalog row as returned by the join
#[derive(Debug, Clone, Default, sqlx::FromRow)]
struct ProductRow {
    product_id: i64,
    bank_name: String,
    product_type: Option<String>,
    min_loan_amount_usd: Option<f64>,
    max_loan_amount_usd: Option<f64>,
    bank_footprint: Option<String>,
    allowed_entities: Option<String>,
    allowed_industries: Option<String>,
    excluded_industries: Option<String>,
    geographic_footprint: Option<String>,
    excluded_states: Option<String>,
    min_years_in_business: Option<f64>,
    min_annual_revenue_usd: Option<f64>,
    requires_existing_relationship: bool,
    min_personal_credit_score: Option<f64>,
    min_business_credit_score: Option<f64>,
    min_dscr: Option<f64>,
    min_current_ratio: Option<f64>,
    max_debt_to_equity: Option<f64>,
    cashflow_positive_required: bool,
    negative_balance_days_avg: Option<f64>,
    negative_balance_longest_streak: Option<f64>,
    negative_balance_max_overdraft_usd: Option<f64>,
    purpose_allowed: Option<String>,
    collateral_required: bool,
    eligible_collateral_types: Option<String>,
    max_ltv_real_estate: Option<f64>,
    max_ltv_equipment: Option<f64>,
    max_ltv_receivables: Option<f64>,
    max_ltv_inventory: Option<f64>,
    personal_guarantee: bool,
    guarantee_type: Option<String>,
    decision_timeline_prequal_days: Option<i32>,
    decision_timeline_underwriting_days: Option<i32>,
    average_time_to_fund_days: Option<i32>,
    special_conditions: Option<String>,
}

impl From<ProductRow> for ProductCriteria {
    fn from(row: ProductRow) -> Self {
        let tokens = |raw: &Option<String>| TokenSet::from_optional(raw.as_deref());

        Self {
            bank_footprint: tokens(&row.bank_footprint),
            allowed_entities: tokens(&row.allowed_entities),
            allowed_industries: tokens(&row.allowed_industries),
            excluded_industries: tokens(&row.excluded_industries),
            geographic_footprint: tokens(&row.geographic_footprint),
            excluded_states: tokens(&row.excluded_states),
            purpose_allowed: tokens(&row.purpose_allowed),
            eligible_collateral_types: tokens(&row.eligible_collateral_types),
            product_id: row.product_id,
            bank_name: row.bank_name,
            product_type: row.product_type,
            min_loan_amount_usd: row.min_loan_amount_usd,
            max_loan_amount_usd: row.max_loan_amount_usd,
            min_years_in_business: row.min_years_in_business,
            min_annual_revenue_usd: row.min_annual_revenue_usd,
            requires_existing_relationship: row.requires_existing_relationship,
            min_personal_credit_score: row.min_personal_credit_score,
            min_business_credit_score: row.min_business_credit_score,
            min_dscr: row.min_dscr,
            min_current_ratio: row.min_current_ratio,
            max_debt_to_equity: row.max_debt_to_equity,
            cashflow_positive_required: row.cashflow_positive_required,
            negative_balance_days_avg: row.negative_balance_days_avg,
            negative_balance_longest_streak: row.negative_balance_longest_streak,
            negative_balance_max_overdraft_usd: row.negative_balance_max_overdraft_usd,
            collateral_required: row.collateral_required,
            max_ltv_real_estate: row.max_ltv_real_estate,
            max_ltv_equipment: row.max_ltv_equipment,
            max_ltv_receivables: row.max_ltv_receivables,
            max_ltv_inventory: row.max_ltv_inventory,
            personal_guarantee: row.personal_guarantee,
            guarantee_type: row.guarantee_type,
            decision_timeline_prequal_days: row.decision_timeline_prequal_days,
            decision_timeline_underwriting_days: row.decision_timeline_underwriting_days,
            average_time_to_fund_days: row.average_time_to_fund_days,
            special_conditions: row.special_conditions,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CustomerRow {
    entity_type: Option<String>,
    industry: Option<String>,
    state: Option<String>,
    years_in_business: Option<f64>,
    annual_revenue_usd: Option<f64>,
    personal_credit_score: Option<f64>,
    business_credit_score: Option<f64>,
    dscr: Option<f64>,
    current_ratio: Option<f64>,
    debt_to_equity: Option<f64>,
    cashflow_positive: Option<bool>,
    negative_balance_days_avg: Option<f64>,
    negative_balance_longest_streak: Option<f64>,
    negative_balance_max_overdraft_usd: Option<f64>,
    requested_product_type: Option<String>,
    requested_amount_usd: Option<f64>,
    use_of_proceeds: Option<String>,
}

impl From<CustomerRow> for CustomerProfile {
    fn from(row: CustomerRow) -> Self {
        Self {
            entity_type: row.entity_type,
            industry: row.industry,
            state: row.state,
            years_in_business: row.years_in_business,
            annual_revenue_usd: row.annual_revenue_usd,
            personal_credit_score: row.personal_credit_score,
            business_credit_score: row.business_credit_score,
            dscr: row.dscr,
            current_ratio: row.current_ratio,
            debt_to_equity: row.debt_to_equity,
            cashflow_positive: row.cashflow_positive,
            negative_balance_days_avg: row.negative_balance_days_avg,
            negative_balance_longest_streak: row.negative_balance_longest_streak,
            negative_balance_max_overdraft_usd: row.negative_balance_max_overdraft_usd,
            requested_product_type: row.requested_product_type,
            requested_amount_usd: row.requested_amount_usd,
            use_of_proceeds: row.use_of_proceeds,
        }
    }
}

/// PostgreSQL client for the product catalog and stored customer profiles
///
/// The schema is owned by the ETL side; this client only reads.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        settings: &crate::config::DatabaseSettings,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
        )
        .await
    }

    /// Fetch a stored customer profile
    pub async fn fetch_customer(&self, customer_id: i64) -> Result<CustomerProfile, PostgresError> {
        let row: Option<CustomerRow> = sqlx::query_as(CUSTOMER_QUERY)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CustomerProfile::from)
            .ok_or_else(|| PostgresError::NotFound(format!("customer id {}", customer_id)))
    }

    /// Fetch every catalog entry offered for a product type
    ///
    /// Missing eligibility, underwriting, or collateral records leave the
    /// corresponding thresholds unset.
    pub async fn fetch_products(
        &self,
        product_type: &str,
    ) -> Result<Vec<ProductCriteria>, PostgresError> {
        let rows: Vec<ProductRow> = sqlx::query_as(PRODUCTS_QUERY)
            .bind(product_type)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Fetched {} products of type {}", rows.len(), product_type);

        Ok(rows.into_iter().map(ProductCriteria::from).collect())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
