// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::period::{PeriodSummary, TopCategory};
use crate::models::SavingsGoal;

#[derive(Debug, Clone, Serialize)]
pub struct GoalBrief {
    pub name: String,
    pub current_amount: Decimal,
    pub target_amount: Decimal,
}

/// The condensed read-only context handed to external collaborators (the
/// advisor): headline figures and goal standings, nothing else.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub balance: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub top_category: Option<TopCategory>,
    pub goals: Vec<GoalBrief>,
}

pub fn condense(period: &PeriodSummary, goals: &[SavingsGoal]) -> Snapshot {
    Snapshot {
        balance: period.balance,
        total_income: period.total_income,
        total_expense: period.total_expense,
        top_category: period.top_category.clone(),
        goals: goals
            .iter()
            .map(|g| GoalBrief {
                name: g.name.clone(),
                current_amount: g.current_amount,
                target_amount: g.target_amount,
            })
            .collect(),
    }
}
