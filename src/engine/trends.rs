// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{EntryKind, LedgerEntry};
use crate::utils::month_name;

/// How far history reaches back from the current period's start.
pub const LOOKBACK_DAYS: i64 = 180;

pub fn lookback_start(window_start: NaiveDate) -> NaiveDate {
    window_start - Duration::days(LOOKBACK_DAYS)
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
}

impl MonthlySummary {
    pub fn label(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

/// Buckets entries by calendar month, most recent bucket first. Months
/// without entries produce no bucket.
pub fn monthly_history(entries: &[LedgerEntry]) -> Vec<MonthlySummary> {
    let buckets = entries.iter().fold(
        BTreeMap::new(),
        |mut acc: BTreeMap<(i32, u32), (Decimal, Decimal)>, e| {
            let slot = acc
                .entry((e.occurred_at.year(), e.occurred_at.month()))
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            match e.kind {
                EntryKind::Income => slot.0 += e.amount,
                EntryKind::Expense => slot.1 += e.amount,
            }
            acc
        },
    );

    buckets
        .into_iter()
        .rev()
        .map(|((year, month), (total_income, total_expense))| MonthlySummary {
            year,
            month,
            total_income,
            total_expense,
            balance: total_income - total_expense,
        })
        .collect()
}
