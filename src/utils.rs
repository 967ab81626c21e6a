// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Months, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::ValidationError;

const UA: &str = concat!(
    "moneta/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/moneta)"
);

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    chrono::NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Parses a monetary amount and rejects zero and negatives before anything
/// touches the store.
pub fn parse_positive_decimal(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(d).into());
    }
    Ok(d)
}

pub fn fmt_money(d: Decimal) -> String {
    format!("${:.2}", d)
}

/// Calendar-aware month addition with day clamping: Jan 31 + 1 month is
/// Feb 28 (Feb 29 in leap years), not an error and not Mar 3.
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .with_context(|| format!("Date {} + {} months is out of range", date, months))
}

/// Half-open window [first of month, first of next month) for "YYYY-MM".
pub fn month_window(month: &str) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", month))?;
    let end = add_months(start, 1)?;
    Ok((start, end))
}

pub fn current_month(today: NaiveDate) -> String {
    today.format("%Y-%m").to_string()
}

pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    match month {
        1..=12 => NAMES[(month - 1) as usize],
        _ => "Unknown",
    }
}

pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_email(email: &str) -> Result<()> {
    let re = Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]{2,}$")?;
    if re.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()).into())
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn id_for_user(conn: &Connection, email: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM users WHERE email=?1")?;
    let id: i64 = stmt
        .query_row(params![email], |r| r.get(0))
        .with_context(|| format!("User '{}' not found", email))?;
    Ok(id)
}

// Acting-user settings
pub fn get_default_user(conn: &Connection) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='default_user'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_default_user(conn: &Connection, email: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('default_user', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![email],
    )?;
    Ok(())
}

/// The user every store read and write is scoped to: the global `--user`
/// override when given, otherwise the configured default user.
pub fn resolve_user(conn: &Connection, m: &clap::ArgMatches) -> Result<i64> {
    if let Some(email) = m.get_one::<String>("user") {
        return id_for_user(conn, email);
    }
    let email = get_default_user(conn)?
        .context("No acting user: pass --user <EMAIL> or set one with 'moneta user use'")?;
    id_for_user(conn, &email)
}
