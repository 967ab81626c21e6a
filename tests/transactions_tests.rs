// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneta::{cli, commands::transactions, db};
use rusqlite::{params, Connection};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO users(name, email) VALUES ('Ada', 'ada@example.com')",
        [],
    )
    .unwrap();
    conn
}

fn run_tx(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["moneta", "tx"];
    argv.extend_from_slice(args);
    argv.extend_from_slice(&["--user", "ada@example.com"]);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", tx_m)) => transactions::handle(conn, tx_m),
        _ => panic!("no tx subcommand"),
    }
}

#[test]
fn add_records_entry() {
    let conn = setup();
    run_tx(
        &conn,
        &[
            "add", "--date", "2025-01-02", "--title", "salary", "--amount", "3000", "--kind",
            "income", "--category", "salary",
        ],
    )
    .unwrap();

    let (title, amount, kind): (String, String, String) = conn
        .query_row("SELECT title, amount, kind FROM entries", [], |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?))
        })
        .unwrap();
    assert_eq!(title, "salary");
    assert_eq!(amount, "3000");
    assert_eq!(kind, "income");
}

#[test]
fn add_rejects_nonpositive_amount() {
    let conn = setup();
    let err = run_tx(
        &conn,
        &[
            "add", "--date", "2025-01-02", "--title", "rent", "--amount", "-500", "--kind",
            "expense", "--category", "rent",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("must be positive"));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn add_rejects_unknown_kind() {
    let conn = setup();
    let err = run_tx(
        &conn,
        &[
            "add", "--date", "2025-01-02", "--title", "rent", "--amount", "500", "--kind",
            "transfer", "--category", "rent",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown entry kind"));
}

fn seed_three_days(conn: &Connection) {
    for i in 1..=3 {
        conn.execute(
            "INSERT INTO entries(user_id, title, amount, kind, category, occurred_at)
             VALUES (1, 'coffee', '4.50', 'expense', 'food', ?1)",
            params![format!("2025-01-0{}", i)],
        )
        .unwrap();
    }
}

#[test]
fn list_limit_respected_newest_first() {
    let conn = setup();
    seed_three_days(&conn);
    let matches = cli::build_cli().get_matches_from([
        "moneta",
        "tx",
        "list",
        "--limit",
        "2",
        "--user",
        "ada@example.com",
    ]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, 1, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2025-01-03");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_filters_by_kind_and_month() {
    let conn = setup();
    seed_three_days(&conn);
    conn.execute(
        "INSERT INTO entries(user_id, title, amount, kind, category, occurred_at)
         VALUES (1, 'salary', '3000', 'income', 'salary', '2025-02-01')",
        [],
    )
    .unwrap();

    let matches = cli::build_cli().get_matches_from([
        "moneta",
        "tx",
        "list",
        "--month",
        "2025-01",
        "--kind",
        "expense",
        "--user",
        "ada@example.com",
    ]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = transactions::query_rows(&conn, 1, list_m).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.kind == "expense"));
}

#[test]
fn edit_changes_only_given_fields() {
    let conn = setup();
    seed_three_days(&conn);
    run_tx(&conn, &["edit", "--id", "1", "--amount", "6.00"]).unwrap();

    let (title, amount): (String, String) = conn
        .query_row("SELECT title, amount FROM entries WHERE id=1", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!(title, "coffee");
    assert_eq!(amount, "6.00");
}

#[test]
fn edit_rejects_foreign_entries() {
    let conn = setup();
    seed_three_days(&conn);
    conn.execute(
        "INSERT INTO users(name, email) VALUES ('Grace', 'grace@example.com')",
        [],
    )
    .unwrap();

    let matches = cli::build_cli().get_matches_from([
        "moneta",
        "tx",
        "edit",
        "--id",
        "1",
        "--amount",
        "9",
        "--user",
        "grace@example.com",
    ]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let err = transactions::handle(&conn, tx_m).unwrap_err();
    assert!(err.to_string().contains("not found"));
    let amount: String = conn
        .query_row("SELECT amount FROM entries WHERE id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(amount, "4.50");
}

#[test]
fn rm_deletes_own_entry_and_rejects_unknown() {
    let conn = setup();
    seed_three_days(&conn);
    run_tx(&conn, &["rm", "--id", "2"]).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);

    let err = run_tx(&conn, &["rm", "--id", "42"]).unwrap_err();
    assert!(err.to_string().contains("not found"));
}
