// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::models::BillingPeriod;
use crate::utils::{
    fmt_money, maybe_print_json, parse_date, parse_positive_decimal, pretty_table, resolve_user,
};
use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, Connection};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    let user_id = resolve_user(conn, m)?;
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user_id, sub)?,
        Some(("list", sub)) => list(conn, user_id, sub)?,
        Some(("pause", sub)) => set_active(conn, user_id, sub, false)?,
        Some(("resume", sub)) => set_active(conn, user_id, sub, true)?,
        Some(("rm", sub)) => rm(conn, user_id, sub)?,
        Some(("process", _)) => process(conn, user_id)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let amount = parse_positive_decimal(sub.get_one::<String>("amount").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap();
    let period: BillingPeriod = sub.get_one::<String>("period").unwrap().parse()?;
    let start = match sub.get_one::<String>("start") {
        Some(s) => parse_date(s)?,
        None => Utc::now().date_naive(),
    };

    conn.execute(
        "INSERT INTO subscriptions(user_id, name, amount, category, billing_period, started_at, next_due_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            user_id,
            name,
            amount.to_string(),
            category,
            period.as_str(),
            start.to_string()
        ],
    )?;
    println!(
        "Added subscription '{}' ({} {}), first charge due {}",
        name, amount, period, start
    );
    Ok(())
}

fn list(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let subs = db::fetch_subscriptions(conn, user_id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &subs)? {
        let rows: Vec<Vec<String>> = subs
            .iter()
            .map(|s| {
                vec![
                    s.id.to_string(),
                    s.name.clone(),
                    fmt_money(s.amount),
                    s.billing_period.to_string(),
                    s.category.clone(),
                    s.next_due_at.to_string(),
                    if s.active { "active" } else { "paused" }.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Name", "Amount", "Period", "Category", "Next due", "Status"],
                rows,
            )
        );
        let total = db::active_subscription_total(conn, user_id)?;
        println!("Active recurring commitment: {}", fmt_money(total));
    }
    Ok(())
}

fn set_active(conn: &Connection, user_id: i64, sub: &clap::ArgMatches, active: bool) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let changed = conn.execute(
        "UPDATE subscriptions SET active=?1 WHERE id=?2 AND user_id=?3",
        params![active as i64, id, user_id],
    )?;
    if changed == 0 {
        return Err(anyhow!("Subscription {} not found", id));
    }
    println!(
        "Subscription {} {}",
        id,
        if active { "resumed" } else { "paused" }
    );
    Ok(())
}

fn rm(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let affected = conn.execute(
        "DELETE FROM subscriptions WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if affected == 0 {
        return Err(anyhow!("Subscription {} not found", id));
    }
    println!("Deleted subscription {}", id);
    Ok(())
}

fn process(conn: &mut Connection, user_id: i64) -> Result<()> {
    let today = Utc::now().date_naive();
    let posted = db::post_due_charges(conn, user_id, today)?;
    if posted.is_empty() {
        println!("No recurring charges due.");
        return Ok(());
    }
    for charge in &posted {
        println!(
            "Posted {} for '{}', next due {}",
            fmt_money(charge.amount),
            charge.name,
            charge.next_due_at
        );
    }
    println!("{} charge(s) posted.", posted.len());
    Ok(())
}
