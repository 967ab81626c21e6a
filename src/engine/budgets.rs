// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Budget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Success,
    Warning,
    Danger,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Success => "success",
            BudgetTier::Warning => "warning",
            BudgetTier::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    pub id: i64,
    pub category: String,
    pub cap: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// Share of the cap consumed, clamped at 100, one decimal.
    pub percentage: Decimal,
    pub tier: BudgetTier,
}

/// Scores each budget against the current period's expense totals.
/// Categories with no spend score zero; the tier is judged on the exact
/// percentage before rounding.
pub fn evaluate(budgets: &[Budget], category_totals: &BTreeMap<String, Decimal>) -> Vec<BudgetStatus> {
    let warning_floor = Decimal::new(80, 0);
    budgets
        .iter()
        .map(|b| {
            let spent = category_totals
                .get(&b.category)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let percentage = if b.cap > Decimal::ZERO {
                (spent / b.cap * Decimal::ONE_HUNDRED).min(Decimal::ONE_HUNDRED)
            } else {
                Decimal::ZERO
            };
            let tier = if percentage >= Decimal::ONE_HUNDRED {
                BudgetTier::Danger
            } else if percentage >= warning_floor {
                BudgetTier::Warning
            } else {
                BudgetTier::Success
            };
            BudgetStatus {
                id: b.id,
                category: b.category.clone(),
                cap: b.cap,
                spent,
                remaining: (b.cap - spent).max(Decimal::ZERO),
                percentage: percentage.round_dp(1),
                tier,
            }
        })
        .collect()
}
