// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::engine::goals::{assess, average_monthly_surplus, global_progress, GoalOutlook};
use crate::engine::{period, trends};
use crate::error::ValidationError;
use crate::utils::{
    current_month, fmt_money, maybe_print_json, month_window, parse_date, parse_decimal,
    pretty_table, resolve_user,
};
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user_id = resolve_user(conn, m)?;
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user_id, sub)?,
        Some(("list", sub)) => list(conn, user_id, sub)?,
        Some(("fund", sub)) => fund(conn, user_id, sub)?,
        Some(("extend", sub)) => extend(conn, user_id, sub)?,
        Some(("rm", sub)) => rm(conn, user_id, sub)?,
        Some(("outlook", sub)) => outlook(conn, user_id, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap();
    let target = parse_decimal(sub.get_one::<String>("target").unwrap())?;
    if target <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveTarget(target).into());
    }
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    if date <= Utc::now().date_naive() {
        return Err(ValidationError::PastTargetDate(date).into());
    }

    conn.execute(
        "INSERT INTO goals(user_id, name, target_amount, target_date) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, name, target.to_string(), date.to_string()],
    )?;
    println!("Goal '{}' created: {} by {}", name, fmt_money(target), date);
    Ok(())
}

fn list(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let goals = db::fetch_goals(conn, user_id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &goals)? {
        let today = Utc::now().date_naive();
        let outlooks = assess(&goals, today, Decimal::ZERO);
        let rows: Vec<Vec<String>> = outlooks
            .iter()
            .map(|o| {
                vec![
                    o.id.to_string(),
                    o.name.clone(),
                    fmt_money(o.current_amount),
                    fmt_money(o.target_amount),
                    format!("{}%", o.progress),
                    o.target_date.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Name", "Saved", "Target", "Progress", "Target date"],
                rows,
            )
        );
    }
    Ok(())
}

fn fund(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount).into());
    }
    let goal = db::get_goal(conn, user_id, id)?;
    let updated = goal.current_amount + amount;
    db::update_goal_amount(conn, user_id, id, updated)?;
    println!(
        "Funded '{}' with {}, now {} of {}",
        goal.name,
        fmt_money(amount),
        fmt_money(updated),
        fmt_money(goal.target_amount)
    );
    if goal.current_amount < goal.target_amount && updated >= goal.target_amount {
        println!("Goal '{}' reached! 🎉", goal.name);
    }
    Ok(())
}

fn extend(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let goal = db::get_goal(conn, user_id, id)?;
    let pushed = goal.target_date + Duration::days(30);
    db::update_goal_target_date(conn, user_id, id, pushed)?;
    println!("Goal '{}' extended to {}", goal.name, pushed);
    Ok(())
}

fn rm(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let affected = conn.execute(
        "DELETE FROM goals WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if affected == 0 {
        return Err(anyhow!("Goal {} not found", id));
    }
    println!("Deleted goal {}", id);
    Ok(())
}

fn outlook(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let today = Utc::now().date_naive();
    let (start, end) = month_window(&current_month(today))?;

    let entries = db::fetch_entries(conn, user_id, start, end)?;
    let summary = period::summarize(&entries, start, end);
    let lookback = db::fetch_entries(conn, user_id, trends::lookback_start(start), end)?;
    let history = trends::monthly_history(&lookback);
    let surplus = average_monthly_surplus(&history, summary.balance);

    let goals = db::fetch_goals(conn, user_id)?;
    let outlooks = assess(&goals, today, surplus);

    if !maybe_print_json(json_flag, jsonl_flag, &outlooks)? {
        let rows: Vec<Vec<String>> = outlooks
            .iter()
            .map(|o| {
                vec![
                    o.name.clone(),
                    format!("{}%", o.progress),
                    fmt_money(o.remaining),
                    o.target_date.to_string(),
                    fmt_money(o.suggested_monthly),
                    fmt_money(o.suggested_weekly),
                    verdict_cell(o),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Goal", "Progress", "Remaining", "Target date", "Monthly", "Weekly", "Verdict"],
                rows,
            )
        );
        println!("Average monthly surplus: {}", fmt_money(surplus));
        println!("Overall progress: {}%", global_progress(&outlooks));
    }
    Ok(())
}

fn verdict_cell(o: &GoalOutlook) -> String {
    if o.remaining == Decimal::ZERO {
        return "reached".to_string();
    }
    if o.is_past_due {
        return "past due".to_string();
    }
    if o.is_due_today {
        return "due today".to_string();
    }
    match (o.feasibility, o.feasibility_ratio) {
        (Some(f), Some(r)) => format!("{} ({})", f.as_str(), r),
        _ => String::new(),
    }
}
