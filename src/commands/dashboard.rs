// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::engine::goals::{assess, average_monthly_surplus, global_progress};
use crate::engine::{budgets, period, trends};
use crate::utils::{
    current_month, fmt_money, maybe_print_json, month_window, pretty_table, resolve_user,
};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let user_id = resolve_user(conn, m)?;
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let today = Utc::now().date_naive();

    // Charges come due against the wall clock even when an older month is
    // being viewed.
    let posted = db::post_due_charges(conn, user_id, today)?;
    if !json_flag && !jsonl_flag {
        for charge in &posted {
            println!(
                "Posted {} for '{}', next due {}",
                fmt_money(charge.amount),
                charge.name,
                charge.next_due_at
            );
        }
    }

    let month = match m.get_one::<String>("month") {
        Some(s) => s.clone(),
        None => current_month(today),
    };
    let (start, end) = month_window(&month)?;

    let entries = db::fetch_entries(conn, user_id, start, end)?;
    let summary = period::summarize(&entries, start, end);

    let lookback = db::fetch_entries(conn, user_id, trends::lookback_start(start), end)?;
    let history = trends::monthly_history(&lookback);
    let surplus = average_monthly_surplus(&history, summary.balance);

    let budgets = db::fetch_budgets(conn, user_id)?;
    let statuses = budgets::evaluate(&budgets, &summary.category_totals);

    let goals = db::fetch_goals(conn, user_id)?;
    let outlooks = assess(&goals, today, surplus);
    let commitment = db::active_subscription_total(conn, user_id)?;

    if json_flag || jsonl_flag {
        let doc = json!({
            "month": month,
            "posted_charges": posted,
            "summary": summary,
            "recurring_commitment": commitment,
            "budgets": statuses,
            "goals": outlooks,
            "goal_progress": global_progress(&outlooks),
            "history": history,
        });
        maybe_print_json(json_flag, jsonl_flag, &doc)?;
        return Ok(());
    }

    println!("Dashboard for {}", month);
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
    println!("  Recurring:    {} per cycle", fmt_money(commitment));

    if !statuses.is_empty() {
        let rows: Vec<Vec<String>> = statuses
            .iter()
            .map(|s| {
                vec![
                    s.category.clone(),
                    fmt_money(s.cap),
                    fmt_money(s.spent),
                    format!("{}%", s.percentage),
                    s.tier.as_str().to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Budget", "Cap", "Spent", "Used", "Status"], rows)
        );
    }

    if !outlooks.is_empty() {
        let rows: Vec<Vec<String>> = outlooks
            .iter()
            .map(|o| {
                vec![
                    o.name.clone(),
                    format!("{}%", o.progress),
                    fmt_money(o.remaining),
                    o.target_date.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Goal", "Progress", "Remaining", "Target date"], rows)
        );
        println!("Overall goal progress: {}%", global_progress(&outlooks));
    }

    if !history.is_empty() {
        let rows: Vec<Vec<String>> = history
            .iter()
            .map(|h| {
                vec![
                    h.label(),
                    fmt_money(h.total_income),
                    fmt_money(h.total_expense),
                    fmt_money(h.balance),
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
