use crate::models::ProductMatch;
use std::fmt::Write;

const BANK_WIDTH: usize = 30;

fn amount(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// Render ranked matches as the fixed-width table printed by the CLI
pub fn render_table(matches: &[ProductMatch]) -> String {
    if matches.is_empty() {
        return "No matches found\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Found {} match(es):", matches.len());
    let _ = writeln!(
        out,
        "{:<30} {:<10} {:<6} {}",
        "Bank", "ProductID", "Score", "Amount Range"
    );

    for m in matches {
        let bank: String = m.bank_name.chars().take(BANK_WIDTH).collect();
        let _ = writeln!(
            out,
            "{:<30} {:>10} {:<6} {} - {}",
            bank,
            m.product_id,
            m.score,
            amount(m.min_amount_usd),
            amount(m.max_amount_usd)
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table() {
        assert_eq!(render_table(&[]), "No matches found\n");
    }

    #[test]
    fn test_table_rows() {
        let matches = vec![ProductMatch {
            bank_name: "A Very Long Community Bank Name That Overflows".to_string(),
            product_id: 42,
            score: 0.4083,
            min_amount_usd: Some(50_000.0),
            max_amount_usd: None,
        }];

        let table = render_table(&matches);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Found 1 match(es):");
        assert!(lines[1].starts_with("Bank"));
        assert!(lines[2].starts_with("A Very Long Community Bank Nam "));
        assert!(lines[2].contains("        42 0.4083 50000 - n/a"));
    }
}
