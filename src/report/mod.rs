//! Top-N selection and the terminal report.

use crate::models::{CrawlResult, PropertyRecord};
use crate::utils::{fmt_number, fmt_pounds};
use std::fmt::Write;

/// The `n` most expensive records, highest first. Equal prices keep crawl order.
pub fn top_expensive(records: &[PropertyRecord], n: usize) -> Vec<PropertyRecord> {
    let mut sorted = records.to_vec();
    // `sort_by` is stable.
    sorted.sort_by(|a, b| b.price.cmp(&a.price));
    sorted.truncate(n);
    sorted
}

const HEADERS: [&str; 4] = ["Address", "Type", "Price", "Date Sold"];

/// Plain-text table: Address | Type | Price | Date Sold.
pub fn render_table(postcode: &str, result: &CrawlResult, top: &[PropertyRecord], years: u32) -> String {
    let rows: Vec<[String; 4]> = top
        .iter()
        .map(|r| {
            [
                r.address.clone(),
                r.property_type.clone(),
                fmt_pounds(r.price),
                r.date_sold.format("%d %b %Y").to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} results, {} sold in the last {} years",
        postcode,
        fmt_number(result.result_count),
        fmt_number(result.properties.len() as u64),
        years
    );

    if rows.is_empty() {
        let _ = writeln!(out, "No sales in range.");
        return out;
    }

    let rule: String = widths.iter().map(|w| "─".repeat(w + 2)).collect::<Vec<_>>().join("┼");
    push_row(&mut out, &HEADERS.map(String::from), &widths);
    let _ = writeln!(out, "{}", rule);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, w))| {
            // Price column reads better right-aligned.
            if i == 2 { format!(" {:>w$} ", cell, w = *w) } else { format!(" {:<w$} ", cell, w = *w) }
        })
        .collect();
    let _ = writeln!(out, "{}", line.join("│").trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaginationState;
    use chrono::NaiveDate;

    fn record(address: &str, price: u64) -> PropertyRecord {
        PropertyRecord {
            address: address.to_string(),
            property_type: "Semi-Detached".to_string(),
            price,
            date_sold: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_top_expensive_keeps_tie_order() {
        let records = vec![
            record("a", 100),
            record("b", 500),
            record("c", 500),
            record("d", 50),
            record("e", 900),
        ];
        let top = top_expensive(&records, 3);
        let picked: Vec<(&str, u64)> = top.iter().map(|r| (r.address.as_str(), r.price)).collect();
        assert_eq!(picked, vec![("e", 900), ("b", 500), ("c", 500)]);
        // Input untouched.
        assert_eq!(records[0].address, "a");
    }

    #[test]
    fn test_top_expensive_short_input() {
        let records = vec![record("a", 1), record("b", 2)];
        assert_eq!(top_expensive(&records, 5).len(), 2);
        assert!(top_expensive(&[], 5).is_empty());
    }

    #[test]
    fn test_render_table() {
        let top = vec![record("10 Downing Street, London", 1_250_000)];
        let result = CrawlResult {
            result_count: 1204,
            properties: top.clone(),
            pagination: PaginationState { current_page: 1, first_page: 1, last_page: 1 },
        };
        let text = render_table("SW1A 2AA", &result, &top, 10);

        assert!(text.starts_with("SW1A 2AA: 1,204 results, 1 sold in the last 10 years\n"));
        assert!(text.contains("Address"));
        assert!(text.contains("Date Sold"));
        assert!(text.contains("£1,250,000"));
        assert!(text.contains("01 Jun 2021"));
    }

    #[test]
    fn test_render_table_empty() {
        let result = CrawlResult {
            result_count: 0,
            properties: vec![],
            pagination: PaginationState { current_page: 1, first_page: 1, last_page: 1 },
        };
        let text = render_table("M1 1AE", &result, &[], 10);
        assert!(text.ends_with("No sales in range.\n"));
    }
}
