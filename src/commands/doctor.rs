// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::utils::{add_months, pretty_table, resolve_user};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user_id = resolve_user(conn, m)?;
    let today = Utc::now().date_naive();
    let mut rows = Vec::new();

    // 1) Entries whose stored amount is not strictly positive
    let mut stmt = conn.prepare(
        "SELECT id, amount FROM entries WHERE user_id=?1 AND CAST(amount AS REAL) <= 0",
    )?;
    let mut cur = stmt.query(params![user_id])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let amount: String = r.get(1)?;
        rows.push(vec!["non_positive_amount".into(), format!("entry {}: {}", id, amount)]);
    }

    // 2) Active subscriptions more than one billing period behind. Posting
    // advances one period per run, so these need repeated runs to catch up.
    for sub in db::fetch_active_subscriptions(conn, user_id)? {
        let caught_up_at = add_months(sub.next_due_at, sub.billing_period.months())?;
        if caught_up_at <= today {
            rows.push(vec![
                "subscription_lagging".into(),
                format!("'{}' due {}", sub.name, sub.next_due_at),
            ]);
        }
    }

    // 3) Budgets whose category never appears in the ledger
    let mut stmt3 = conn.prepare(
        "SELECT category FROM budgets b
         WHERE b.user_id=?1 AND NOT EXISTS (
             SELECT 1 FROM entries e
             WHERE e.user_id=b.user_id AND e.category=b.category AND e.kind='expense'
         )",
    )?;
    let mut cur3 = stmt3.query(params![user_id])?;
    while let Some(r) = cur3.next()? {
        let category: String = r.get(0)?;
        rows.push(vec!["budget_unused".into(), category]);
    }

    // 4) Goals past their target date and still unmet
    let mut stmt4 = conn.prepare(
        "SELECT name, target_date FROM goals
         WHERE user_id=?1 AND target_date < ?2
           AND CAST(current_amount AS REAL) < CAST(target_amount AS REAL)",
    )?;
    let mut cur4 = stmt4.query(params![user_id, today.to_string()])?;
    while let Some(r) = cur4.next()? {
        let name: String = r.get(0)?;
        let due: String = r.get(1)?;
        rows.push(vec!["goal_past_due".into(), format!("'{}' was due {}", name, due)]);
    }

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
