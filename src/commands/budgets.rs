// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::engine::{budgets, period};
use crate::utils::{
    current_month, fmt_money, maybe_print_json, month_window, parse_positive_decimal, pretty_table,
    resolve_user,
};
use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user_id = resolve_user(conn, m)?;
    match m.subcommand() {
        Some(("set", sub)) => set(conn, user_id, sub)?,
        Some(("list", sub)) => list(conn, user_id, sub)?,
        Some(("rm", sub)) => rm(conn, user_id, sub)?,
        Some(("report", sub)) => report(conn, user_id, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let category = sub.get_one::<String>("category").unwrap();
    let cap = parse_positive_decimal(sub.get_one::<String>("cap").unwrap())?;
    conn.execute(
        "INSERT INTO budgets(user_id, category, cap) VALUES (?1,?2,?3)
         ON CONFLICT(user_id, category) DO UPDATE SET cap=excluded.cap",
        params![user_id, category, cap.to_string()],
    )?;
    println!("Budget set: {} / {}", category, fmt_money(cap));
    Ok(())
}

fn list(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let budgets = db::fetch_budgets(conn, user_id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &budgets)? {
        let rows: Vec<Vec<String>> = budgets
            .iter()
            .map(|b| vec![b.category.clone(), fmt_money(b.cap)])
            .collect();
        println!("{}", pretty_table(&["Category", "Cap"], rows));
    }
    Ok(())
}

fn rm(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let category = sub.get_one::<String>("category").unwrap();
    let affected = conn.execute(
        "DELETE FROM budgets WHERE user_id=?1 AND category=?2",
        params![user_id, category],
    )?;
    if affected == 0 {
        return Err(anyhow!("No budget for category '{}'", category));
    }
    println!("Deleted budget for '{}'", category);
    Ok(())
}

fn report(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = match sub.get_one::<String>("month") {
        Some(s) => s.clone(),
        None => current_month(Utc::now().date_naive()),
    };
    let (start, end) = month_window(&month)?;

    let entries = db::fetch_entries(conn, user_id, start, end)?;
    let summary = period::summarize(&entries, start, end);
    let budgets = db::fetch_budgets(conn, user_id)?;
    let statuses = budgets::evaluate(&budgets, &summary.category_totals);

    if !maybe_print_json(json_flag, jsonl_flag, &statuses)? {
        let rows: Vec<Vec<String>> = statuses
            .iter()
            .map(|s| {
                vec![
                    s.category.clone(),
                    fmt_money(s.cap),
                    fmt_money(s.spent),
                    fmt_money(s.remaining),
                    format!("{}%", s.percentage),
                    s.tier.as_str().to_string(),
                ]
            })
            .collect();
        println!("Budgets for {}", month);
        println!(
            "{}",
            pretty_table(
                &["Category", "Cap", "Spent", "Remaining", "Used", "Status"],
                rows,
            )
        );
    }
    Ok(())
}
