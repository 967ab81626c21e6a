// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::engine::period;
use crate::engine::snapshot::{condense, Snapshot};
use crate::utils::{current_month, fmt_money, http_client, month_window, resolve_user};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

const SYSTEM_PROMPT: &str = "You are a pragmatic personal finance advisor. \
Answer using only the snapshot provided; keep it short, concrete, and free of disclaimers.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}
#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}
#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user_id = resolve_user(conn, m)?;
    if let Some(("ask", sub)) = m.subcommand() {
        ask(conn, user_id, sub)?;
    }
    Ok(())
}

fn ask(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let message = sub.get_one::<String>("message").unwrap();
    let api_key =
        std::env::var("GROQ_API_KEY").context("GROQ_API_KEY is not set; the advisor needs it")?;
    let model = sub
        .get_one::<String>("model")
        .cloned()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let base =
        std::env::var("MONETA_ADVISOR_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

    let today = Utc::now().date_naive();
    let (start, end) = month_window(&current_month(today))?;
    let entries = db::fetch_entries(conn, user_id, start, end)?;
    let summary = period::summarize(&entries, start, end);
    let goals = db::fetch_goals(conn, user_id)?;
    let snap = condense(&summary, &goals);

    let body = json!({
        "model": model,
        "messages": [
            {"role": "system", "content": SYSTEM_PROMPT},
            {"role": "user", "content": format!("{}\n\nQuestion: {}", render_snapshot(&snap), message)},
        ],
    });

    let client = http_client()?;
    let resp = client
        .post(format!("{}/chat/completions", base))
        .bearer_auth(&api_key)
        .json(&body)
        .send()?;
    if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
        return Err(anyhow!("Advisor API rejected the key (401); check GROQ_API_KEY"));
    }
    let parsed: ChatResponse = resp.error_for_status()?.json()?;
    let answer = parsed
        .choices
        .first()
        .map(|c| c.message.content.trim().to_string())
        .ok_or_else(|| anyhow!("Advisor returned no choices"))?;
    println!("{}", answer);
    Ok(())
}

fn render_snapshot(snap: &Snapshot) -> String {
    let mut lines = vec![
        "Current month snapshot:".to_string(),
        format!("  income {}", fmt_money(snap.total_income)),
        format!("  expense {}", fmt_money(snap.total_expense)),
        format!("  balance {}", fmt_money(snap.balance)),
    ];
    if let Some(top) = &snap.top_category {
        lines.push(format!(
            "  top spending category: {} at {} ({}% of spend)",
            top.name,
            fmt_money(top.total),
            top.percentage
        ));
    }
    for g in &snap.goals {
        lines.push(format!(
            "  goal '{}': {} of {}",
            g.name,
            fmt_money(g.current_amount),
            fmt_money(g.target_amount)
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::snapshot::GoalBrief;
    use rust_decimal::Decimal;

    #[test]
    fn snapshot_renders_goals_and_top_category() {
        let snap = Snapshot {
            balance: Decimal::new(2300, 0),
            total_income: Decimal::new(3000, 0),
            total_expense: Decimal::new(700, 0),
            top_category: Some(crate::engine::period::TopCategory {
                name: "rent".into(),
                total: Decimal::new(500, 0),
                percentage: Decimal::new(714, 1),
            }),
            goals: vec![GoalBrief {
                name: "Trip".into(),
                current_amount: Decimal::new(250, 0),
                target_amount: Decimal::new(1000, 0),
            }],
        };
        let text = render_snapshot(&snap);
        assert!(text.contains("balance $2300.00"));
        assert!(text.contains("rent"));
        assert!(text.contains("71.4% of spend"));
        assert!(text.contains("goal 'Trip': $250.00 of $1000.00"));
    }
}
