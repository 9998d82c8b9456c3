use bank_match::config::Settings;
use bank_match::core::{Matcher, RulesEngine};
use bank_match::models::{ProfileError, ProfileRequest, ScoringWeights};
use bank_match::report::render_table;
use bank_match::services::{load_catalog_file, CatalogError, PostgresClient, PostgresError};
use bank_match::telemetry;
use clap::{Args, Parser};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Postgres(#[from] PostgresError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error("failed to read rules {path}: {source}")]
    RulesIo {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid rules {path}: {source}")]
    Rules {
        path: String,
        source: toml::de::Error,
    },
    #[error("customer has no requested product type")]
    MissingProductType,
    #[error("failed to encode matches: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "match-customer",
    about = "Match a customer to bank products",
    version
)]
struct Cli {
    /// Postgres DSN (defaults to the configured database url)
    #[arg(long)]
    dsn: Option<String>,
    /// Read products from a JSON catalog snapshot instead of the database
    #[arg(long, conflicts_with = "dsn")]
    catalog: Option<PathBuf>,
    /// Stored customer profile to match
    #[arg(long)]
    customer_id: Option<i64>,
    #[command(flatten)]
    profile: ProfileArgs,
    /// Credit-box rules (TOML `[[rules]]` tables) to evaluate the customer against
    #[arg(long)]
    rules: Option<PathBuf>,
    #[arg(long, default_value_t = 5)]
    top: usize,
    /// Print matches as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Default)]
struct ProfileArgs {
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    industry: Option<String>,
    #[arg(long)]
    entity_type: Option<String>,
    #[arg(long = "years")]
    years_in_business: Option<f64>,
    #[arg(long = "revenue")]
    annual_revenue_usd: Option<f64>,
    #[arg(long = "fico")]
    personal_credit_score: Option<f64>,
    #[arg(long = "business-score")]
    business_credit_score: Option<f64>,
    #[arg(long)]
    dscr: Option<f64>,
    #[arg(long)]
    ebitda: Option<f64>,
    #[arg(long = "debt-service")]
    annual_debt_service: Option<f64>,
    #[arg(long)]
    current_ratio: Option<f64>,
    #[arg(long = "dte")]
    debt_to_equity: Option<f64>,
    #[arg(long)]
    cashflow_positive: bool,
    #[arg(long = "neg-days")]
    negative_balance_days_avg: Option<f64>,
    #[arg(long = "neg-streak")]
    negative_balance_longest_streak: Option<f64>,
    #[arg(long = "neg-max")]
    negative_balance_max_overdraft_usd: Option<f64>,
    #[arg(long)]
    requested_product_type: Option<String>,
    #[arg(long = "requested-amount")]
    requested_amount_usd: Option<f64>,
    #[arg(long)]
    use_of_proceeds: Option<String>,
}

impl From<ProfileArgs> for ProfileRequest {
    fn from(args: ProfileArgs) -> Self {
        Self {
            state: args.state,
            industry: args.industry,
            entity_type: args.entity_type,
            years_in_business: args.years_in_business,
            annual_revenue_usd: args.annual_revenue_usd,
            personal_credit_score: args.personal_credit_score,
            business_credit_score: args.business_credit_score,
            dscr: args.dscr,
            ebitda: args.ebitda,
            annual_debt_service: args.annual_debt_service,
            current_ratio: args.current_ratio,
            debt_to_equity: args.debt_to_equity,
            cashflow_positive: args.cashflow_positive,
            negative_balance_days_avg: args.negative_balance_days_avg,
            negative_balance_longest_streak: args.negative_balance_longest_streak,
            negative_balance_max_overdraft_usd: args.negative_balance_max_overdraft_usd,
            requested_product_type: args.requested_product_type,
            requested_amount_usd: args.requested_amount_usd,
            use_of_proceeds: args.use_of_proceeds,
        }
    }
}

fn load_rules(path: &Path) -> Result<RulesEngine, CliError> {
    let shown = path.display().to_string();
    let source = std::fs::read_to_string(path).map_err(|source| CliError::RulesIo {
        path: shown.clone(),
        source,
    })?;
    RulesEngine::from_toml_str(&source).map_err(|source| CliError::Rules { path: shown, source })
}

async fn run(cli: Cli, mut settings: Settings) -> Result<(), CliError> {
    if let Some(dsn) = cli.dsn {
        settings.database.url = dsn;
    }

    // Only connect when a stored profile or the database catalog is needed
    let postgres = if cli.customer_id.is_some() || cli.catalog.is_none() {
        Some(PostgresClient::from_settings(&settings.database).await?)
    } else {
        None
    };

    let customer = match (cli.customer_id, &postgres) {
        (Some(customer_id), Some(client)) => client.fetch_customer(customer_id).await?,
        _ => ProfileRequest::from(cli.profile).into_profile()?,
    };

    let product_type = customer
        .requested_product_type
        .clone()
        .ok_or(CliError::MissingProductType)?;

    let products = match (&cli.catalog, &postgres) {
        (Some(path), _) => load_catalog_file(path, &product_type)?,
        (None, Some(client)) => client.fetch_products(&product_type).await?,
        (None, None) => Vec::new(),
    };

    let matcher = Matcher::new(ScoringWeights::from(&settings.scoring.weights));
    let result = matcher.find_matches(&customer, &products, cli.top);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result.matches)?);
    } else {
        print!("{}", render_table(&result.matches));
    }

    if let Some(path) = &cli.rules {
        let evaluation = load_rules(path)?.evaluate(&customer);
        tracing::info!(
            "Credit box: approved={} score={:.2} reasons={:?}",
            evaluation.approved,
            evaluation.score,
            evaluation.reasons
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("[ERROR] {}", CliError::from(e));
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = telemetry::init_cli(&settings.logging) {
        eprintln!("[ERROR] {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
