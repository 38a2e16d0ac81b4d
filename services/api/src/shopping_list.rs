//! Shopping-cart aggregation and plain-text rendering
//!
//! The export pipeline is read/aggregate/format: fetch every ingredient row
//! reachable through the user's cart entries, group by (ingredient name,
//! measurement unit) summing the amounts, and render one line per
//! ingredient sorted by name.

use sqlx::FromRow;
use std::collections::BTreeMap;

/// Filename used for the attachment
pub const SHOPPING_LIST_FILENAME: &str = "foodshare_shopping_list.txt";

/// One raw (ingredient, amount) row from the cart join query
#[derive(Debug, Clone, FromRow)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Aggregated ingredient with summed amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Group cart lines by (name, measurement unit), summing amounts.
///
/// The result is sorted by ingredient name (then unit, for ingredients that
/// exist under several units).
pub fn aggregate(lines: impl IntoIterator<Item = CartLine>) -> Vec<ShoppingListItem> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();

    for line in lines {
        *totals
            .entry((line.name, line.measurement_unit))
            .or_insert(0) += line.amount as i64;
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total)| ShoppingListItem {
            name,
            measurement_unit,
            total,
        })
        .collect()
}

/// Render the shopping list as a UTF-8 text document
pub fn render(user_name: &str, items: &[ShoppingListItem]) -> String {
    let mut document = format!("Shopping list for:\n{}\n\n", user_name);

    let body = items
        .iter()
        .map(|item| {
            format!(
                "{} ({}) — {}",
                item.name, item.measurement_unit, item.total
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    document.push_str(&body);
    document.push_str("\n\nGenerated by Foodshare");
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit: &str, amount: i32) -> CartLine {
        CartLine {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_aggregate_sums_by_ingredient() {
        let items = aggregate(vec![
            line("flour", "g", 200),
            line("flour", "g", 300),
            line("milk", "ml", 500),
        ]);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "flour");
        assert_eq!(items[0].total, 500);
        assert_eq!(items[1].name, "milk");
        assert_eq!(items[1].total, 500);
    }

    #[test]
    fn test_aggregate_total_preserves_input_sum() {
        let lines = vec![
            line("sugar", "g", 10),
            line("flour", "g", 20),
            line("sugar", "g", 30),
            line("salt", "g", 1),
        ];
        let input_sum: i64 = lines.iter().map(|l| l.amount as i64).sum();

        let items = aggregate(lines);
        let output_sum: i64 = items.iter().map(|i| i.total).sum();

        assert_eq!(input_sum, output_sum);
    }

    #[test]
    fn test_aggregate_sorts_by_name() {
        let items = aggregate(vec![
            line("zucchini", "pcs", 2),
            line("apple", "pcs", 3),
            line("milk", "ml", 200),
        ]);

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "milk", "zucchini"]);
    }

    #[test]
    fn test_aggregate_distinguishes_units() {
        let items = aggregate(vec![line("sugar", "g", 100), line("sugar", "tbsp", 2)]);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].measurement_unit, "g");
        assert_eq!(items[0].total, 100);
        assert_eq!(items[1].measurement_unit, "tbsp");
        assert_eq!(items[1].total, 2);
    }

    #[test]
    fn test_render_format() {
        let items = aggregate(vec![line("flour", "g", 500), line("milk", "ml", 200)]);
        let text = render("Alice", &items);

        assert!(text.starts_with("Shopping list for:\nAlice\n\n"));
        assert!(text.contains("flour (g) — 500"));
        assert!(text.contains("milk (ml) — 200"));
        assert!(text.ends_with("Generated by Foodshare"));
    }

    #[test]
    fn test_render_empty_cart() {
        let text = render("Bob", &[]);

        assert!(text.starts_with("Shopping list for:\nBob\n\n"));
        assert!(text.ends_with("Generated by Foodshare"));
    }
}
