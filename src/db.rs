// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::engine::recurrence;
use crate::models::{Budget, LedgerEntry, NewEntry, SavingsGoal, Subscription};
use crate::utils::parse_date;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Moneta", "moneta"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("moneta.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

/// Creates any missing tables and indexes. Safe to run on every open.
pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS users(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS entries(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        amount TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('income','expense')),
        category TEXT NOT NULL,
        occurred_at TEXT NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_entries_user_date ON entries(user_id, occurred_at);

    CREATE TABLE IF NOT EXISTS subscriptions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        category TEXT NOT NULL,
        billing_period TEXT NOT NULL CHECK(billing_period IN ('monthly','yearly')),
        started_at TEXT NOT NULL,
        next_due_at TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_subscriptions_user_due ON subscriptions(user_id, next_due_at);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        category TEXT NOT NULL,
        cap TEXT NOT NULL,
        UNIQUE(user_id, category),
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS goals(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        target_amount TEXT NOT NULL,
        current_amount TEXT NOT NULL DEFAULT '0',
        target_date TEXT NOT NULL,
        FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}

fn parse_amount(s: &str, table: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}' in {}", s, table))
}

fn entry_from_row(r: &Row) -> Result<LedgerEntry> {
    let amount_s: String = r.get(3)?;
    let kind_s: String = r.get(4)?;
    let date_s: String = r.get(6)?;
    Ok(LedgerEntry {
        id: r.get(0)?,
        user_id: r.get(1)?,
        title: r.get(2)?,
        amount: parse_amount(&amount_s, "entries")?,
        kind: kind_s.parse()?,
        category: r.get(5)?,
        occurred_at: parse_date(&date_s)?,
        note: r.get(7)?,
    })
}

/// Entries in [from, to) for one user, newest first.
pub fn fetch_entries(
    conn: &Connection,
    user_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<LedgerEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, title, amount, kind, category, occurred_at, note
         FROM entries
         WHERE user_id=?1 AND occurred_at>=?2 AND occurred_at<?3
         ORDER BY occurred_at DESC, id DESC",
    )?;
    let mut rows = stmt.query(params![user_id, from.to_string(), to.to_string()])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(entry_from_row(r)?);
    }
    Ok(out)
}

pub fn append_entry(conn: &Connection, entry: &NewEntry) -> Result<i64> {
    conn.execute(
        "INSERT INTO entries(user_id, title, amount, kind, category, occurred_at, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.user_id,
            entry.title,
            entry.amount.to_string(),
            entry.kind.as_str(),
            entry.category,
            entry.occurred_at.to_string(),
            entry.note
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn subscription_from_row(r: &Row) -> Result<Subscription> {
    let amount_s: String = r.get(3)?;
    let period_s: String = r.get(5)?;
    let started_s: String = r.get(6)?;
    let due_s: String = r.get(7)?;
    let active: i64 = r.get(8)?;
    Ok(Subscription {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        amount: parse_amount(&amount_s, "subscriptions")?,
        category: r.get(4)?,
        billing_period: period_s.parse()?,
        started_at: parse_date(&started_s)?,
        next_due_at: parse_date(&due_s)?,
        active: active != 0,
    })
}

const SUBSCRIPTION_COLS: &str =
    "id, user_id, name, amount, category, billing_period, started_at, next_due_at, active";

pub fn fetch_subscriptions(conn: &Connection, user_id: i64) -> Result<Vec<Subscription>> {
    let sql = format!(
        "SELECT {} FROM subscriptions WHERE user_id=?1 ORDER BY next_due_at, id",
        SUBSCRIPTION_COLS
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(subscription_from_row(r)?);
    }
    Ok(out)
}

pub fn fetch_active_subscriptions(conn: &Connection, user_id: i64) -> Result<Vec<Subscription>> {
    let sql = format!(
        "SELECT {} FROM subscriptions WHERE user_id=?1 AND active=1 ORDER BY next_due_at, id",
        SUBSCRIPTION_COLS
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(subscription_from_row(r)?);
    }
    Ok(out)
}

/// Sum of active subscription amounts, the user's standing recurring
/// commitment per cycle.
pub fn active_subscription_total(conn: &Connection, user_id: i64) -> Result<Decimal> {
    let subs = fetch_active_subscriptions(conn, user_id)?;
    Ok(subs.iter().map(|s| s.amount).sum())
}

/// One recurring charge that was actually written to the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct PostedCharge {
    pub subscription_id: i64,
    pub name: String,
    pub amount: Decimal,
    pub next_due_at: NaiveDate,
}

/// Materializes due recurring charges for the user. The pure computation
/// lives in `engine::recurrence`; this function applies it in a single
/// transaction. Each subscription's advance is a compare-and-swap on the
/// due date it was computed from, so a concurrent invocation that got there
/// first wins and this one skips the insert: at most one posting per
/// elapsed period, and never an advance without its ledger entry.
pub fn post_due_charges(
    conn: &mut Connection,
    user_id: i64,
    today: NaiveDate,
) -> Result<Vec<PostedCharge>> {
    let subs = fetch_active_subscriptions(conn, user_id)?;
    let charges = recurrence::due_charges(&subs, today)?;
    if charges.is_empty() {
        return Ok(Vec::new());
    }

    let tx = conn.transaction()?;
    let mut posted = Vec::new();
    for charge in charges {
        let advanced = tx.execute(
            "UPDATE subscriptions SET next_due_at=?1 WHERE id=?2 AND next_due_at=?3",
            params![
                charge.next_due_at.to_string(),
                charge.subscription_id,
                charge.previous_due_at.to_string()
            ],
        )?;
        if advanced == 0 {
            continue;
        }
        append_entry(&tx, &charge.entry)?;
        posted.push(PostedCharge {
            subscription_id: charge.subscription_id,
            name: charge.subscription_name,
            amount: charge.entry.amount,
            next_due_at: charge.next_due_at,
        });
    }
    tx.commit()?;
    Ok(posted)
}

pub fn fetch_budgets(conn: &Connection, user_id: i64) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, category, cap FROM budgets WHERE user_id=?1 ORDER BY category",
    )?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let cap_s: String = r.get(3)?;
        out.push(Budget {
            id: r.get(0)?,
            user_id: r.get(1)?,
            category: r.get(2)?,
            cap: parse_amount(&cap_s, "budgets")?,
        });
    }
    Ok(out)
}

fn goal_from_row(r: &Row) -> Result<SavingsGoal> {
    let target_s: String = r.get(3)?;
    let current_s: String = r.get(4)?;
    let date_s: String = r.get(5)?;
    Ok(SavingsGoal {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        target_amount: parse_amount(&target_s, "goals")?,
        current_amount: parse_amount(&current_s, "goals")?,
        target_date: parse_date(&date_s)?,
    })
}

pub fn fetch_goals(conn: &Connection, user_id: i64) -> Result<Vec<SavingsGoal>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, name, target_amount, current_amount, target_date
         FROM goals WHERE user_id=?1 ORDER BY target_date, id",
    )?;
    let mut rows = stmt.query(params![user_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(goal_from_row(r)?);
    }
    Ok(out)
}

pub fn get_goal(conn: &Connection, user_id: i64, goal_id: i64) -> Result<SavingsGoal> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, name, target_amount, current_amount, target_date
         FROM goals WHERE user_id=?1 AND id=?2",
    )?;
    let mut rows = stmt.query(params![user_id, goal_id])?;
    match rows.next()? {
        Some(r) => goal_from_row(r),
        None => Err(anyhow::anyhow!("Goal {} not found", goal_id)),
    }
}

pub fn update_goal_amount(
    conn: &Connection,
    user_id: i64,
    goal_id: i64,
    amount: Decimal,
) -> Result<()> {
    let changed = conn.execute(
        "UPDATE goals SET current_amount=?1 WHERE user_id=?2 AND id=?3",
        params![amount.to_string(), user_id, goal_id],
    )?;
    if changed == 0 {
        return Err(anyhow::anyhow!("Goal {} not found", goal_id));
    }
    Ok(())
}

pub fn update_goal_target_date(
    conn: &Connection,
    user_id: i64,
    goal_id: i64,
    date: NaiveDate,
) -> Result<()> {
    let changed = conn.execute(
        "UPDATE goals SET target_date=?1 WHERE user_id=?2 AND id=?3",
        params![date.to_string(), user_id, goal_id],
    )?;
    if changed == 0 {
        return Err(anyhow::anyhow!("Goal {} not found", goal_id));
    }
    Ok(())
}
