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

#[derive(Debug, Clone, Serialize)]
pub struct TopCategory {
    pub name: String,
    pub total: Decimal,
    pub percentage: Decimal,
}

/// Aggregated figures for one half-open window, usually a calendar month.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub window_days: u32,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    /// Percent of income kept, clamped below at 0, one decimal. 0 when
    /// there is no income.
    pub savings_rate: Decimal,
    /// Expense totals per category, name ascending.
    pub category_totals: BTreeMap<String, Decimal>,
    /// Heaviest expense category; ties go to the lexicographically
    /// smallest name. None when the window has no expenses.
    pub top_category: Option<TopCategory>,
    /// Net cash flow per day of month. Every day of the window is present,
    /// quiet days at zero.
    pub daily_net: BTreeMap<u32, Decimal>,
    /// Days whose net is non-negative.
    pub surplus_days: u32,
}

pub fn summarize(
    entries: &[LedgerEntry],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> PeriodSummary {
    let in_window: Vec<&LedgerEntry> = entries
        .iter()
        .filter(|e| e.occurred_at >= window_start && e.occurred_at < window_end)
        .collect();

    let (total_income, total_expense) = in_window.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(inc, exp), e| match e.kind {
            EntryKind::Income => (inc + e.amount, exp),
            EntryKind::Expense => (inc, exp + e.amount),
        },
    );
    let balance = total_income - total_expense;

    let savings_rate = if total_income.is_zero() {
        Decimal::ZERO
    } else {
        (balance / total_income * Decimal::ONE_HUNDRED)
            .max(Decimal::ZERO)
            .round_dp(1)
    };

    let category_totals = in_window
        .iter()
        .filter(|e| e.kind == EntryKind::Expense)
        .fold(BTreeMap::new(), |mut acc: BTreeMap<String, Decimal>, e| {
            *acc.entry(e.category.clone()).or_insert(Decimal::ZERO) += e.amount;
            acc
        });

    let top_category = category_totals
        .iter()
        .fold(None::<(&String, Decimal)>, |best, (name, total)| match best {
            Some((_, best_total)) if *total <= best_total => best,
            _ => Some((name, *total)),
        })
        .map(|(name, total)| TopCategory {
            name: name.clone(),
            total,
            percentage: if total_expense.is_zero() {
                Decimal::ZERO
            } else {
                (total / total_expense * Decimal::ONE_HUNDRED).round_dp(1)
            },
        });

    let mut blank_days: BTreeMap<u32, Decimal> = BTreeMap::new();
    let mut day = window_start;
    while day < window_end {
        blank_days.insert(day.day(), Decimal::ZERO);
        day += Duration::days(1);
    }
    let daily_net = in_window.iter().fold(blank_days, |mut acc, e| {
        let signed = match e.kind {
            EntryKind::Income => e.amount,
            EntryKind::Expense => -e.amount,
        };
        *acc.entry(e.occurred_at.day()).or_insert(Decimal::ZERO) += signed;
        acc
    });
    let surplus_days = daily_net.values().filter(|net| **net >= Decimal::ZERO).count() as u32;

    PeriodSummary {
        window_start,
        window_end,
        window_days: (window_end - window_start).num_days().max(0) as u32,
        total_income,
        total_expense,
        balance,
        savings_rate,
        category_totals,
        top_category,
        daily_net,
        surplus_days,
    }
}
