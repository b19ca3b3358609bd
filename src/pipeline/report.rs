// src/pipeline/report.rs

//! Plain-text rendering of a rate sheet.

use std::fmt::Write;

use crate::engine::RateSource;
use crate::models::RateSheet;

/// Render the sheet as a fixed-width table.
pub fn render_table(sheet: &RateSheet) -> String {
    let mut out = String::new();

    let discount = match sheet.lock_reason {
        Some(reason) => format!("{:.2}% (locked: {})", sheet.discount_percent, reason.label()),
        None => format!("{:.2}%", sheet.discount_percent),
    };
    let _ = writeln!(out, "Programs for {}", sheet.selection);
    let _ = writeln!(out, "Discount: {discount}");
    let _ = writeln!(
        out,
        "{:<8} {:<10} {:<8} {:<28} {:>7} {:>12} {:>12}",
        "ID", "Day", "Time", "Program", "TVR", "Rate card", "Negotiated"
    );

    for row in &sheet.rows {
        let list = row
            .list_price
            .map_or_else(|| "-".to_string(), |p| format!("{p:.2}"));
        let marker = match row.source {
            RateSource::Override => "*",
            RateSource::Unresolved => "?",
            _ => "",
        };
        let _ = writeln!(
            out,
            "{:<8} {:<10} {:<8} {:<28} {:>7.2} {:>12} {:>12.2} {}",
            row.id,
            row.day,
            row.time,
            truncate(&row.program, 28),
            row.rating,
            list,
            row.rate,
            marker
        );
    }

    if sheet.rows.iter().any(|r| r.overridden) {
        let _ = writeln!(out, "* manually set");
    }
    let unresolved = sheet.unresolved().count();
    if unresolved > 0 {
        let _ = writeln!(out, "? {unresolved} slot(s) without a usable catalog price");
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).chain(std::iter::once('…')).collect()
    }
}
