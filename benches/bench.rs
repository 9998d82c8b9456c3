// Criterion benchmarks for Bank Match

use bank_match::core::{passes_eligibility, Matcher, Rule, RulesEngine};
use bank_match::models::{CustomerProfile, ProductCriteria, TokenSet};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const STATES: [&str; 5] = ["CA", "NY", "TX", "FL", "WA"];

fn create_product(id: usize) -> ProductCriteria {
    ProductCriteria {
        product_id: id as i64,
        bank_name: format!("Bank {}", id),
        product_type: Some("TermLoan".to_string()),
        allowed_entities: TokenSet::parse("LLC,S-Corp,C-Corp"),
        excluded_industries: TokenSet::parse("Cannabis,Gaming"),
        geographic_footprint: TokenSet::parse(&STATES[..=(id % STATES.len())].join(",")),
        min_years_in_business: Some((id % 4) as f64),
        min_personal_credit_score: Some(620.0 + (id % 10) as f64 * 10.0),
        min_dscr: Some(1.0 + (id % 5) as f64 * 0.1),
        negative_balance_days_avg: Some(5.0 + (id % 3) as f64),
        min_loan_amount_usd: Some(25_000.0),
        max_loan_amount_usd: Some(100_000.0 + (id % 8) as f64 * 50_000.0),
        ..Default::default()
    }
}

fn create_customer() -> CustomerProfile {
    CustomerProfile {
        entity_type: Some("LLC".to_string()),
        industry: Some("Retail".to_string()),
        state: Some("TX".to_string()),
        years_in_business: Some(4.0),
        annual_revenue_usd: Some(1_200_000.0),
        personal_credit_score: Some(705.0),
        dscr: Some(1.35),
        negative_balance_days_avg: Some(2.0),
        requested_product_type: Some("TermLoan".to_string()),
        requested_amount_usd: Some(180_000.0),
        use_of_proceeds: Some("Equipment".to_string()),
        ..Default::default()
    }
}

fn bench_eligibility(c: &mut Criterion) {
    let product = create_product(7);
    let customer = create_customer();

    c.bench_function("eligibility_gate", |b| {
        b.iter(|| passes_eligibility(black_box(&product), black_box(&customer)));
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::with_default_weights();
    let customer = create_customer();

    let mut group = c.benchmark_group("matching");

    for catalog_size in [10, 50, 100, 500, 1000].iter() {
        let catalog: Vec<ProductCriteria> = (0..*catalog_size).map(create_product).collect();

        group.bench_with_input(
            BenchmarkId::new("find_matches", catalog_size),
            catalog_size,
            |b, _| {
                b.iter(|| matcher.find_matches(black_box(&customer), black_box(&catalog), black_box(20)));
            },
        );
    }

    group.finish();
}

fn bench_rules_engine(c: &mut Criterion) {
    let engine = RulesEngine::new(vec![
        Rule::hard("personal_credit_score", ">=", 640.0),
        Rule::hard("years_in_business", ">=", 2.0),
        Rule::soft("dscr", ">=", 1.25, 2.0),
        Rule::soft("negative_balance_days_avg", "<=", 3.0, 1.0),
        Rule::soft("debt_to_equity", "<", 2.5, 1.0),
    ]);
    let customer = create_customer();

    c.bench_function("rules_engine_evaluate", |b| {
        b.iter(|| engine.evaluate(black_box(&customer)));
    });
}

criterion_group!(benches, bench_eligibility, bench_matching, bench_rules_engine);

criterion_main!(benches);
