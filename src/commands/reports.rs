// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::engine::{period, trends};
use crate::utils::{
    current_month, fmt_money, maybe_print_json, month_window, pretty_table, resolve_user,
};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user_id = resolve_user(conn, m)?;
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, user_id, sub)?,
        Some(("history", sub)) => history(conn, user_id, sub)?,
        Some(("export", sub)) => export(conn, user_id, sub)?,
        _ => {}
    }
    Ok(())
}

fn month_arg(sub: &clap::ArgMatches) -> String {
    match sub.get_one::<String>("month") {
        Some(s) => s.clone(),
        None => current_month(Utc::now().date_naive()),
    }
}

fn summary(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = month_arg(sub);
    let (start, end) = month_window(&month)?;
    let entries = db::fetch_entries(conn, user_id, start, end)?;
    let summary = period::summarize(&entries, start, end);

    if !maybe_print_json(json_flag, jsonl_flag, &summary)? {
        println!("Summary for {}", month);
        println!("  Income:       {}", fmt_money(summary.total_income));
        println!("  Expense:      {}", fmt_money(summary.total_expense));
        println!("  Balance:      {}", fmt_money(summary.balance));
        println!("  Savings rate: {}%", summary.savings_rate);
        println!(
            "  Surplus days: {} of {}",
            summary.surplus_days, summary.window_days
        );
        if let Some(top) = &summary.top_category {
            println!(
                "  Top category: {} ({}, {}% of spend)",
                top.name,
                fmt_money(top.total),
                top.percentage
            );
        }
        let rows: Vec<Vec<String>> = summary
            .category_totals
            .iter()
            .map(|(cat, total)| {
                let share = if summary.total_expense.is_zero() {
                    Decimal::ZERO
                } else {
                    (*total / summary.total_expense * Decimal::ONE_HUNDRED).round_dp(1)
                };
                vec![cat.clone(), fmt_money(*total), format!("{}%", share)]
            })
            .collect();
        if !rows.is_empty() {
            println!("{}", pretty_table(&["Category", "Spent", "Share"], rows));
        }
    }
    Ok(())
}

fn history(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let today = Utc::now().date_naive();
    let (start, end) = month_window(&current_month(today))?;
    let entries = db::fetch_entries(conn, user_id, trends::lookback_start(start), end)?;
    let months = trends::monthly_history(&entries);

    if !maybe_print_json(json_flag, jsonl_flag, &months)? {
        let rows: Vec<Vec<String>> = months
            .iter()
            .map(|m| {
                vec![
                    m.label(),
                    fmt_money(m.total_income),
                    fmt_money(m.total_expense),
                    fmt_money(m.balance),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expense", "Balance"], rows)
        );
    }
    Ok(())
}

fn export(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let month = month_arg(sub);
    let (start, end) = month_window(&month)?;

    let mut entries = db::fetch_entries(conn, user_id, start, end)?;
    // Exports read chronologically, unlike the newest-first listing.
    entries.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "title", "amount", "kind", "category", "note"])?;
            for e in &entries {
                wtr.write_record([
                    e.occurred_at.to_string(),
                    e.title.clone(),
                    e.amount.to_string(),
                    e.kind.as_str().to_string(),
                    e.category.clone(),
                    e.note.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let summary = period::summarize(&entries, start, end);
            let doc = json!({
                "month": month,
                "summary": summary,
                "transactions": entries,
            });
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported {} to {}", month, out);
    Ok(())
}
