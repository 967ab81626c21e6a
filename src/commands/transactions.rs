// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::EntryKind;
use crate::utils::{
    maybe_print_json, parse_date, parse_positive_decimal, pretty_table, resolve_user,
};
use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user_id = resolve_user(conn, m)?;
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user_id, sub)?,
        Some(("list", sub)) => list(conn, user_id, sub)?,
        Some(("edit", sub)) => edit(conn, user_id, sub)?,
        Some(("rm", sub)) => rm(conn, user_id, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let title = sub.get_one::<String>("title").unwrap();
    let amount = parse_positive_decimal(sub.get_one::<String>("amount").unwrap())?;
    let kind: EntryKind = sub.get_one::<String>("kind").unwrap().parse()?;
    let category = sub.get_one::<String>("category").unwrap();
    let note = sub.get_one::<String>("note").map(|s| s.to_string());

    conn.execute(
        "INSERT INTO entries(user_id, title, amount, kind, category, occurred_at, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user_id,
            title,
            amount.to_string(),
            kind.as_str(),
            category,
            date.to_string(),
            note
        ],
    )?;
    println!("Recorded {} {} on {} ('{}')", kind, amount, date, title);
    Ok(())
}

fn list(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, user_id, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.title.clone(),
                    r.amount.clone(),
                    r.kind.clone(),
                    r.category.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Title", "Amount", "Kind", "Category", "Note"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct EntryRow {
    pub id: i64,
    pub date: String,
    pub title: String,
    pub amount: String,
    pub kind: String,
    pub category: String,
    pub note: String,
}

pub fn query_rows(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<Vec<EntryRow>> {
    let mut sql = String::from(
        "SELECT id, occurred_at, title, amount, kind, category, note FROM entries WHERE user_id=?",
    );
    let mut params_vec: Vec<String> = vec![user_id.to_string()];

    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(occurred_at,1,7)=?");
        params_vec.push(month.into());
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        sql.push_str(" AND category=?");
        params_vec.push(cat.into());
    }
    if let Some(kind) = sub.get_one::<String>("kind") {
        let kind: EntryKind = kind.parse()?;
        sql.push_str(" AND kind=?");
        params_vec.push(kind.as_str().into());
    }
    sql.push_str(" ORDER BY occurred_at DESC, id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let date: String = r.get(1)?;
        let title: String = r.get(2)?;
        let amount: String = r.get(3)?;
        let kind: String = r.get(4)?;
        let category: String = r.get(5)?;
        let note: Option<String> = r.get(6)?;
        data.push(EntryRow {
            id,
            date,
            title,
            amount,
            kind,
            category,
            note: note.unwrap_or_default(),
        });
    }
    Ok(data)
}

fn edit(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let existing: Option<(String, String, String, String, String, Option<String>)> = conn
        .query_row(
            "SELECT occurred_at, title, amount, kind, category, note FROM entries
             WHERE id=?1 AND user_id=?2",
            params![id, user_id],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                    r.get(5)?,
                ))
            },
        )
        .optional()?;
    let (mut date, mut title, mut amount, mut kind, mut category, mut note) =
        existing.ok_or_else(|| anyhow!("Entry {} not found", id))?;

    if let Some(d) = sub.get_one::<String>("date") {
        date = parse_date(d)?.to_string();
    }
    if let Some(t) = sub.get_one::<String>("title") {
        title = t.clone();
    }
    if let Some(a) = sub.get_one::<String>("amount") {
        amount = parse_positive_decimal(a)?.to_string();
    }
    if let Some(k) = sub.get_one::<String>("kind") {
        kind = k.parse::<EntryKind>()?.as_str().to_string();
    }
    if let Some(c) = sub.get_one::<String>("category") {
        category = c.clone();
    }
    if let Some(n) = sub.get_one::<String>("note") {
        note = Some(n.clone());
    }

    conn.execute(
        "UPDATE entries SET occurred_at=?1, title=?2, amount=?3, kind=?4, category=?5, note=?6
         WHERE id=?7 AND user_id=?8",
        params![date, title, amount, kind, category, note, id, user_id],
    )?;
    println!("Updated entry {}", id);
    Ok(())
}

fn rm(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let affected = conn.execute(
        "DELETE FROM entries WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if affected == 0 {
        return Err(anyhow!("Entry {} not found", id));
    }
    println!("Deleted entry {}", id);
    Ok(())
}
