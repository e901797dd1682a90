use colored::Colorize;

use crate::distribution::{DistributionReport, TransferStatus};
use crate::utils::decimal::{DISPLAY_SCALE, format_fixed};
use crate::wallets::{RegistryStats, WalletsView};

/// Format a table with columns and rows
pub fn format_table(headers: Vec<&str>, rows: Vec<Vec<String>>) {
    let col_widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .fold(header.len(), usize::max)
        })
        .collect();

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = col_widths[i]))
        .collect::<Vec<_>>()
        .join(" | ");

    println!("{}", header_line.bold());
    println!("{}", "-".repeat(header_line.len()));

    for row in rows {
        let row_line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:width$}", cell, width = col_widths.get(i).copied().unwrap_or(20)))
            .collect::<Vec<_>>()
            .join(" | ");
        println!("{}", row_line);
    }
}

/// Format a single record as key-value pairs
pub fn format_record(data: Vec<(&str, String)>) {
    let max_key_len = data.iter().map(|(k, _)| k.len()).max().unwrap_or(20);

    for (key, value) in data {
        let padded_key = format!("{:width$}", key, width = max_key_len);
        println!("  {}: {}", padded_key.bright_cyan(), value);
    }
}

/// Format a header
pub fn print_header(text: &str) {
    println!();
    println!("{}", text.bold().bright_cyan());
    println!("{}", "=".repeat(text.chars().count()));
    println!();
}

/// Format a section
pub fn print_section(text: &str) {
    println!();
    println!("{}", text.bold().bright_white());
    println!("{}", "-".repeat(text.chars().count()));
}

/// Shorten an address to `head...tail`
pub fn format_address_short(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 20 {
        return address.to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{}...{}", head, tail)
}

pub fn format_status(status: TransferStatus) -> String {
    match status {
        TransferStatus::Success => "success".green().to_string(),
        TransferStatus::Failed => "failed".red().to_string(),
    }
}

/// Print master and children; an empty fleet prints a hint instead of a table
pub fn print_wallets(view: &WalletsView<'_>) {
    print_section("Master wallet");
    match view.master {
        Some(master) => format_record(vec![
            ("Address", master.address().to_string()),
            ("Created", master.created_at().to_rfc3339()),
        ]),
        None => println!("  {}", "not initialised".yellow()),
    }

    print_section(&format!("Child wallets ({})", view.total_children));
    if view.children.is_empty() {
        println!("  No child wallets yet. Use `create <count>` to add some.");
        return;
    }

    let rows = view
        .children
        .iter()
        .map(|child| {
            vec![
                child.index().to_string(),
                child.id().to_string(),
                format_address_short(child.address()),
                child.balance().to_string(),
            ]
        })
        .collect();
    format_table(vec!["#", "ID", "Address", "Balance"], rows);
}

pub fn print_stats(stats: &RegistryStats) {
    print_section("Fleet statistics");
    format_record(vec![
        ("Master initialised", if stats.has_master { "yes".green().to_string() } else { "no".red().to_string() }),
        ("Child wallets", stats.total_children.to_string()),
        ("Total wallets", stats.total_wallets.to_string()),
    ]);
}

/// Print the summary and per-wallet outcomes of a distribution
pub fn print_distribution_report(report: &DistributionReport) {
    print_section("Distribution summary");
    format_record(vec![
        ("Mode", report.mode.to_string()),
        ("Total amount", format_fixed(&report.total_amount, DISPLAY_SCALE)),
        ("Per wallet", report.amount_per_wallet.normalized().to_plain_string()),
        ("Wallets", report.wallet_count.to_string()),
        ("Succeeded", report.success_count.to_string().green().to_string()),
        ("Failed", report.failed_count.to_string().red().to_string()),
        ("Success rate", format!("{:.1}%", report.success_rate())),
    ]);

    if report.failed_count > 0 {
        print_section("Failed transfers");
        let rows = report
            .failures()
            .map(|o| {
                vec![
                    o.wallet_index.to_string(),
                    format_address_short(&o.recipient),
                    format_status(o.status),
                    o.detail.clone(),
                ]
            })
            .collect();
        format_table(vec!["#", "Recipient", "Status", "Detail"], rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address_short() {
        assert_eq!(format_address_short("0:abcd"), "0:abcd");

        let long = format!("0:{}", "f".repeat(64));
        let short = format_address_short(&long);
        assert!(short.starts_with("0:ffffffff..."));
        assert_eq!(short.chars().count(), 10 + 3 + 6);
    }
}
