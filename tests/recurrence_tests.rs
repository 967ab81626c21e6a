// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use moneta::db;
use rusqlite::{params, Connection};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

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

fn add_subscription(conn: &Connection, name: &str, period: &str, next_due: &str) {
    conn.execute(
        "INSERT INTO subscriptions(user_id, name, amount, category, billing_period, started_at, next_due_at)
         VALUES (1, ?1, '15.99', 'entertainment', ?2, ?3, ?3)",
        params![name, period, next_due],
    )
    .unwrap();
}

fn entry_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))
        .unwrap()
}

fn next_due(conn: &Connection, name: &str) -> String {
    conn.query_row(
        "SELECT next_due_at FROM subscriptions WHERE name=?1",
        params![name],
        |r| r.get(0),
    )
    .unwrap()
}

#[test]
fn due_charge_posts_once_and_advances() {
    let mut conn = setup();
    add_subscription(&conn, "Gym", "monthly", "2025-03-10");

    let posted = db::post_due_charges(&mut conn, 1, d("2025-03-10")).unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].name, "Gym");
    assert_eq!(next_due(&conn, "Gym"), "2025-04-10");

    // Same day again: the subscription is no longer due.
    let again = db::post_due_charges(&mut conn, 1, d("2025-03-10")).unwrap();
    assert!(again.is_empty());
    assert_eq!(entry_count(&conn), 1);
}

#[test]
fn posted_entry_lands_today_with_subscription_shape() {
    let mut conn = setup();
    add_subscription(&conn, "Gym", "monthly", "2025-03-01");

    db::post_due_charges(&mut conn, 1, d("2025-03-10")).unwrap();
    let (title, amount, kind, category, occurred_at): (String, String, String, String, String) =
        conn.query_row(
            "SELECT title, amount, kind, category, occurred_at FROM entries",
            [],
            |r| {
                Ok((
                    r.get(0)?,
                    r.get(1)?,
                    r.get(2)?,
                    r.get(3)?,
                    r.get(4)?,
                ))
            },
        )
        .unwrap();
    assert_eq!(title, "recurring charge: Gym");
    assert_eq!(amount, "15.99");
    assert_eq!(kind, "expense");
    assert_eq!(category, "entertainment");
    // The entry lands on the posting day, not the original due date.
    assert_eq!(occurred_at, "2025-03-10");
}

#[test]
fn lagging_subscription_catches_up_one_period_per_run() {
    let mut conn = setup();
    add_subscription(&conn, "Gym", "monthly", "2025-01-31");

    let first = db::post_due_charges(&mut conn, 1, d("2025-03-10")).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(next_due(&conn, "Gym"), "2025-02-28");

    let second = db::post_due_charges(&mut conn, 1, d("2025-03-10")).unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(next_due(&conn, "Gym"), "2025-03-28");

    // Caught up: 2025-03-28 is in the future now.
    let third = db::post_due_charges(&mut conn, 1, d("2025-03-10")).unwrap();
    assert!(third.is_empty());
    assert_eq!(entry_count(&conn), 2);
}

#[test]
fn month_end_due_dates_clamp_through_the_store() {
    let mut conn = setup();
    add_subscription(&conn, "Rent", "monthly", "2025-01-31");

    db::post_due_charges(&mut conn, 1, d("2025-01-31")).unwrap();
    assert_eq!(next_due(&conn, "Rent"), "2025-02-28");
}

#[test]
fn yearly_subscription_advances_twelve_months() {
    let mut conn = setup();
    add_subscription(&conn, "Domain", "yearly", "2024-02-29");

    db::post_due_charges(&mut conn, 1, d("2024-03-01")).unwrap();
    assert_eq!(next_due(&conn, "Domain"), "2025-02-28");
}

#[test]
fn paused_subscription_never_posts() {
    let mut conn = setup();
    add_subscription(&conn, "Gym", "monthly", "2025-01-01");
    conn.execute("UPDATE subscriptions SET active=0", []).unwrap();

    let posted = db::post_due_charges(&mut conn, 1, d("2025-06-01")).unwrap();
    assert!(posted.is_empty());
    assert_eq!(entry_count(&conn), 0);
}

#[test]
fn other_users_subscriptions_stay_untouched() {
    let mut conn = setup();
    conn.execute(
        "INSERT INTO users(name, email) VALUES ('Grace', 'grace@example.com')",
        [],
    )
    .unwrap();
    add_subscription(&conn, "Gym", "monthly", "2025-01-01");
    conn.execute(
        "INSERT INTO subscriptions(user_id, name, amount, category, billing_period, started_at, next_due_at)
         VALUES (2, 'Cloud', '5', 'software', 'monthly', '2025-01-01', '2025-01-01')",
        [],
    )
    .unwrap();

    let posted = db::post_due_charges(&mut conn, 1, d("2025-01-15")).unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(next_due(&conn, "Cloud"), "2025-01-01");
    let cloud_entries: i64 = conn
        .query_row("SELECT COUNT(*) FROM entries WHERE user_id=2", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(cloud_entries, 0);
}
