// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_user, pretty_table, set_default_user, title_case, validate_email};
use anyhow::Result;
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", _)) => list(conn)?,
        Some(("use", sub)) => switch(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = title_case(sub.get_one::<String>("name").unwrap());
    let email = sub.get_one::<String>("email").unwrap().to_lowercase();
    validate_email(&email)?;
    conn.execute(
        "INSERT INTO users(name, email) VALUES (?1, ?2)",
        params![name, email],
    )?;
    println!("Registered {} <{}>", name, email);
    Ok(())
}

fn list(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT id, name, email FROM users ORDER BY id")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(vec![
                r.get::<_, i64>(0)?.to_string(),
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ])
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    println!("{}", pretty_table(&["Id", "Name", "Email"], rows));
    Ok(())
}

fn switch(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let email = sub.get_one::<String>("email").unwrap().to_lowercase();
    // Fails when the email is unknown, so we never point at a missing user.
    id_for_user(conn, &email)?;
    set_default_user(conn, &email)?;
    println!("Acting as {}", email);
    Ok(())
}
