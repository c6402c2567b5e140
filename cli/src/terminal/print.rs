//! Terminal layout primitives: section headers and the one-level tree
//! used for per-host detail blocks.

use colored::*;

pub const TOTAL_WIDTH: usize = 64;

pub fn header(msg: &str, quiet: u8) {
    if quiet > 0 {
        return;
    }

    let formatted = format!("⟦ {} ⟧", msg);
    let msg_len = formatted.chars().count();

    let dash_count = TOTAL_WIDTH.saturating_sub(msg_len);
    let left = dash_count / 2;
    let right = dash_count - left;

    println!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right).bright_black(),
    );
}

pub fn tree_head(idx: usize, title: &str) {
    let marker = format!("[{}]", idx + 1).bright_black();
    println!("{marker} {}", title.bold());
}

/// Prints key/value details as one tree level, keys right-padded to the
/// widest key so values align.
pub fn as_tree_one_level(details: Vec<(String, ColoredString)>) {
    let key_width = details
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);

    let last = details.len().saturating_sub(1);
    for (i, (key, value)) in details.iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        println!(
            " {} {:<key_width$} {}",
            branch.bright_black(),
            key,
            value,
        );
    }
}
