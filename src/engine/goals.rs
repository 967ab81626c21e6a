// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::trends::MonthlySummary;
use crate::models::SavingsGoal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feasibility {
    Comfortable,
    Tight,
    Challenging,
}

impl Feasibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feasibility::Comfortable => "comfortable",
            Feasibility::Tight => "tight",
            Feasibility::Challenging => "challenging",
        }
    }
}

/// Everything the caller needs to render one goal: progress, date state,
/// smart pacing, and the feasibility verdict when one applies.
#[derive(Debug, Clone, Serialize)]
pub struct GoalOutlook {
    pub id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub target_date: NaiveDate,
    /// 0..=100, one decimal.
    pub progress: Decimal,
    pub remaining: Decimal,
    pub is_past_due: bool,
    pub is_due_today: bool,
    pub days_remaining: i64,
    pub suggested_monthly: Decimal,
    pub suggested_weekly: Decimal,
    pub suggested_daily: Decimal,
    /// None when the goal is met, past due, or due today; the caller
    /// renders a completion or overdue message instead.
    pub feasibility: Option<Feasibility>,
    pub feasibility_ratio: Option<Decimal>,
}

/// The capacity baseline: mean monthly balance over the history buckets.
/// A mean at or below 100 means there is no meaningful positive history
/// (including the empty case), so fall back to the current period's
/// balance floored at 100. The result is always strictly positive.
pub fn average_monthly_surplus(
    history: &[MonthlySummary],
    current_period_balance: Decimal,
) -> Decimal {
    let avg = if history.is_empty() {
        Decimal::ZERO
    } else {
        history.iter().map(|m| m.balance).sum::<Decimal>() / Decimal::from(history.len())
    };
    if avg <= Decimal::ONE_HUNDRED {
        current_period_balance.max(Decimal::ONE_HUNDRED)
    } else {
        avg
    }
}

pub fn assess(
    goals: &[SavingsGoal],
    today: NaiveDate,
    avg_monthly_surplus: Decimal,
) -> Vec<GoalOutlook> {
    goals
        .iter()
        .map(|g| outlook(g, today, avg_monthly_surplus))
        .collect()
}

fn outlook(goal: &SavingsGoal, today: NaiveDate, avg_monthly_surplus: Decimal) -> GoalOutlook {
    let remaining = (goal.target_amount - goal.current_amount).max(Decimal::ZERO);
    let progress = if goal.target_amount > Decimal::ZERO {
        (goal.current_amount / goal.target_amount * Decimal::ONE_HUNDRED)
            .min(Decimal::ONE_HUNDRED)
            .round_dp(1)
    } else {
        Decimal::ZERO
    };

    let is_past_due = goal.target_date < today;
    let is_due_today = goal.target_date == today;
    let days_remaining = (goal.target_date - today).num_days();

    // Smart pacing only makes sense while the deadline is still ahead.
    let mut suggested_monthly = Decimal::ZERO;
    let mut suggested_weekly = Decimal::ZERO;
    let mut suggested_daily = Decimal::ZERO;
    if !is_past_due && !is_due_today && remaining > Decimal::ZERO {
        let months_remaining = calendar_month_diff(goal.target_date, today).max(1);
        suggested_monthly = remaining / Decimal::from(months_remaining);
        if days_remaining > 0 {
            suggested_daily = remaining / Decimal::from(days_remaining);
            suggested_weekly = suggested_daily * Decimal::from(7);
        }
    }

    let (feasibility, feasibility_ratio) =
        if remaining > Decimal::ZERO && suggested_monthly > Decimal::ZERO {
            let ratio = if avg_monthly_surplus > Decimal::ZERO {
                suggested_monthly / avg_monthly_surplus
            } else {
                Decimal::new(999, 0)
            };
            (Some(classify(ratio)), Some(ratio.round_dp(2)))
        } else {
            (None, None)
        };

    GoalOutlook {
        id: goal.id,
        name: goal.name.clone(),
        target_amount: goal.target_amount,
        current_amount: goal.current_amount,
        target_date: goal.target_date,
        progress,
        remaining,
        is_past_due,
        is_due_today,
        days_remaining,
        suggested_monthly: suggested_monthly.round_dp(2),
        suggested_weekly: suggested_weekly.round_dp(2),
        suggested_daily: suggested_daily.round_dp(2),
        feasibility,
        feasibility_ratio,
    }
}

/// Required-over-available: above 1.2 the goal outruns the user's average
/// surplus; 1.2 itself still counts as tight.
fn classify(ratio: Decimal) -> Feasibility {
    if ratio > Decimal::new(12, 1) {
        Feasibility::Challenging
    } else if ratio > Decimal::new(8, 1) {
        Feasibility::Tight
    } else {
        Feasibility::Comfortable
    }
}

/// Whole calendar months between the two dates, ignoring days.
fn calendar_month_diff(target: NaiveDate, today: NaiveDate) -> i64 {
    (target.year() as i64 - today.year() as i64) * 12
        + (target.month() as i64 - today.month() as i64)
}

/// Mean progress across all goals, one decimal. Zero for no goals.
pub fn global_progress(outlooks: &[GoalOutlook]) -> Decimal {
    if outlooks.is_empty() {
        return Decimal::ZERO;
    }
    (outlooks.iter().map(|o| o.progress).sum::<Decimal>() / Decimal::from(outlooks.len()))
        .round_dp(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn goal(target: i64, current: i64, target_date: &str) -> SavingsGoal {
        SavingsGoal {
            id: 1,
            user_id: 1,
            name: "Emergency fund".into(),
            target_amount: Decimal::new(target, 0),
            current_amount: Decimal::new(current, 0),
            target_date: d(target_date),
        }
    }

    fn bucket(balance: i64) -> MonthlySummary {
        MonthlySummary {
            year: 2025,
            month: 1,
            total_income: Decimal::ZERO,
            total_expense: Decimal::ZERO,
            balance: Decimal::new(balance, 0),
        }
    }

    #[test]
    fn ratio_exactly_at_boundary_is_tight() {
        // One calendar month ahead: suggested monthly = 1200, avg = 1000.
        let today = d("2025-06-15");
        let outlooks = assess(&[goal(1200, 0, "2025-07-10")], today, Decimal::new(1000, 0));
        let o = &outlooks[0];
        assert_eq!(o.suggested_monthly, Decimal::new(1200, 0));
        assert_eq!(o.feasibility_ratio, Some(Decimal::new(12, 1)));
        assert_eq!(o.feasibility, Some(Feasibility::Tight));
    }

    #[test]
    fn ratio_above_boundary_is_challenging() {
        let today = d("2025-06-15");
        let outlooks = assess(&[goal(1201, 0, "2025-07-10")], today, Decimal::new(1000, 0));
        assert_eq!(outlooks[0].feasibility, Some(Feasibility::Challenging));
    }

    #[test]
    fn ratio_at_lower_boundary_is_comfortable() {
        let today = d("2025-06-15");
        let outlooks = assess(&[goal(800, 0, "2025-07-10")], today, Decimal::new(1000, 0));
        assert_eq!(outlooks[0].feasibility_ratio, Some(Decimal::new(8, 1)));
        assert_eq!(outlooks[0].feasibility, Some(Feasibility::Comfortable));
    }

    #[test]
    fn no_surplus_forces_sentinel_ratio() {
        let today = d("2025-06-15");
        let outlooks = assess(&[goal(500, 0, "2025-07-10")], today, Decimal::ZERO);
        assert_eq!(outlooks[0].feasibility_ratio, Some(Decimal::new(999, 0)));
        assert_eq!(outlooks[0].feasibility, Some(Feasibility::Challenging));
    }

    #[test]
    fn completed_goal_skips_feasibility() {
        let today = d("2025-06-15");
        let outlooks = assess(&[goal(500, 500, "2025-09-01")], today, Decimal::new(1000, 0));
        let o = &outlooks[0];
        assert_eq!(o.progress, Decimal::ONE_HUNDRED);
        assert_eq!(o.remaining, Decimal::ZERO);
        assert_eq!(o.suggested_monthly, Decimal::ZERO);
        assert!(o.feasibility.is_none());
        assert!(o.feasibility_ratio.is_none());
    }

    #[test]
    fn past_due_goal_skips_pacing() {
        let today = d("2025-06-15");
        let outlooks = assess(&[goal(500, 100, "2025-06-01")], today, Decimal::new(1000, 0));
        let o = &outlooks[0];
        assert!(o.is_past_due);
        assert_eq!(o.days_remaining, -14);
        assert_eq!(o.suggested_monthly, Decimal::ZERO);
        assert!(o.feasibility.is_none());
    }

    #[test]
    fn due_today_skips_pacing() {
        let today = d("2025-06-15");
        let outlooks = assess(&[goal(500, 100, "2025-06-15")], today, Decimal::new(1000, 0));
        let o = &outlooks[0];
        assert!(o.is_due_today);
        assert!(!o.is_past_due);
        assert_eq!(o.suggested_monthly, Decimal::ZERO);
        assert!(o.feasibility.is_none());
    }

    #[test]
    fn months_remaining_floors_at_one() {
        // Same calendar month: diff is 0, floored to 1.
        let today = d("2025-06-01");
        let outlooks = assess(&[goal(300, 0, "2025-06-20")], today, Decimal::new(1000, 0));
        assert_eq!(outlooks[0].suggested_monthly, Decimal::new(300, 0));
    }

    #[test]
    fn weekly_is_seven_dailies() {
        // 70 days and 2 calendar months ahead.
        let today = d("2025-01-01");
        let outlooks = assess(&[goal(700, 0, "2025-03-12")], today, Decimal::new(1000, 0));
        let o = &outlooks[0];
        assert_eq!(o.days_remaining, 70);
        assert_eq!(o.suggested_daily, Decimal::new(10, 0));
        assert_eq!(o.suggested_weekly, Decimal::new(70, 0));
        assert_eq!(o.suggested_monthly, Decimal::new(350, 0));
    }

    #[test]
    fn pacing_rounds_to_cents() {
        let today = d("2025-06-15");
        // 100 remaining over 30 days, one calendar month.
        let outlooks = assess(&[goal(100, 0, "2025-07-15")], today, Decimal::new(1000, 0));
        let o = &outlooks[0];
        assert_eq!(o.days_remaining, 30);
        assert_eq!(o.suggested_daily, Decimal::new(333, 2));
        // Weekly is derived from the exact daily figure, then rounded.
        assert_eq!(o.suggested_weekly, Decimal::new(2333, 2));
        assert_eq!(o.suggested_monthly, Decimal::new(100, 0));
    }

    #[test]
    fn progress_clamps_at_one_hundred() {
        let today = d("2025-06-15");
        let outlooks = assess(&[goal(500, 750, "2025-09-01")], today, Decimal::ZERO);
        assert_eq!(outlooks[0].progress, Decimal::ONE_HUNDRED);
        assert_eq!(outlooks[0].remaining, Decimal::ZERO);
    }

    #[test]
    fn surplus_average_over_buckets() {
        let history = vec![bucket(500), bucket(700)];
        assert_eq!(
            average_monthly_surplus(&history, Decimal::ZERO),
            Decimal::new(600, 0)
        );
    }

    #[test]
    fn thin_history_falls_back_to_current_balance() {
        let history = vec![bucket(50), bucket(-20)];
        assert_eq!(
            average_monthly_surplus(&history, Decimal::new(500, 0)),
            Decimal::new(500, 0)
        );
    }

    #[test]
    fn fallback_floors_at_one_hundred() {
        assert_eq!(
            average_monthly_surplus(&[], Decimal::new(-300, 0)),
            Decimal::ONE_HUNDRED
        );
        assert_eq!(
            average_monthly_surplus(&[], Decimal::new(40, 0)),
            Decimal::ONE_HUNDRED
        );
    }

    #[test]
    fn global_progress_is_mean_of_goal_progress() {
        let today = d("2025-06-15");
        let outlooks = assess(
            &[goal(100, 100, "2025-09-01"), goal(100, 50, "2025-09-01")],
            today,
            Decimal::new(1000, 0),
        );
        assert_eq!(global_progress(&outlooks), Decimal::new(75, 0));
        assert_eq!(global_progress(&[]), Decimal::ZERO);
    }
}
