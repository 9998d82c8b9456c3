//! Financial feature calculations feeding the underwriting metrics.

/// Arithmetic mean of daily balances, `None` when there are none
pub fn avg_daily_balance(balances: &[f64]) -> Option<f64> {
    if balances.is_empty() {
        return None;
    }
    Some(balances.iter().sum::<f64>() / balances.len() as f64)
}

/// Debt Service Coverage Ratio = EBITDA / annual debt service
pub fn dscr(ebitda: f64, annual_debt_service: f64) -> Option<f64> {
    if annual_debt_service == 0.0 {
        return None;
    }
    Some(ebitda / annual_debt_service)
}

/// Fractional growth of each month over the previous one
///
/// A zero previous month yields `None` for that step.
pub fn month_over_month_growth(values: &[f64]) -> Vec<Option<f64>> {
    values
        .windows(2)
        .map(|pair| {
            let (prev, curr) = (pair[0], pair[1]);
            if prev == 0.0 {
                None
            } else {
                Some((curr - prev) / prev)
            }
        })
        .collect()
}
