// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::NaiveDate;

use crate::models::{EntryKind, NewEntry, Subscription};
use crate::utils::add_months;

/// A charge that should be posted: the ledger entry to append plus the
/// due-date advance that must land together with it.
#[derive(Debug, Clone)]
pub struct DueCharge {
    pub subscription_id: i64,
    pub subscription_name: String,
    pub previous_due_at: NaiveDate,
    pub next_due_at: NaiveDate,
    pub entry: NewEntry,
}

/// Computes the charges due as of `today`. A subscription is due when it is
/// active and its `next_due_at` has arrived. Exactly one charge per
/// subscription per call: a subscription that is several periods behind
/// catches up one period per invocation, not all at once.
///
/// The advance runs from the stored due date, not from `today`, so the
/// day-of-month anchor survives (with clamping for short months).
pub fn due_charges(subs: &[Subscription], today: NaiveDate) -> Result<Vec<DueCharge>> {
    let mut out = Vec::new();
    for sub in subs.iter().filter(|s| s.active && s.next_due_at <= today) {
        let next_due_at = add_months(sub.next_due_at, sub.billing_period.months())?;
        out.push(DueCharge {
            subscription_id: sub.id,
            subscription_name: sub.name.clone(),
            previous_due_at: sub.next_due_at,
            next_due_at,
            entry: NewEntry {
                user_id: sub.user_id,
                title: format!("recurring charge: {}", sub.name),
                amount: sub.amount,
                kind: EntryKind::Expense,
                category: sub.category.clone(),
                occurred_at: today,
                note: None,
            },
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillingPeriod;
    use rust_decimal::Decimal;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sub(next_due: &str, period: BillingPeriod, active: bool) -> Subscription {
        Subscription {
            id: 7,
            user_id: 1,
            name: "Netflix".into(),
            amount: Decimal::new(1599, 2),
            category: "streaming".into(),
            billing_period: period,
            started_at: d("2024-01-31"),
            next_due_at: d(next_due),
            active,
        }
    }

    #[test]
    fn monthly_rolls_into_shorter_month() {
        let subs = vec![sub("2025-01-31", BillingPeriod::Monthly, true)];
        let charges = due_charges(&subs, d("2025-01-31")).unwrap();
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].next_due_at, d("2025-02-28"));
        assert_eq!(charges[0].previous_due_at, d("2025-01-31"));
    }

    #[test]
    fn monthly_rolls_into_leap_february() {
        let subs = vec![sub("2024-01-31", BillingPeriod::Monthly, true)];
        let charges = due_charges(&subs, d("2024-02-05")).unwrap();
        assert_eq!(charges[0].next_due_at, d("2024-02-29"));
    }

    #[test]
    fn yearly_from_leap_day() {
        let subs = vec![sub("2024-02-29", BillingPeriod::Yearly, true)];
        let charges = due_charges(&subs, d("2024-02-29")).unwrap();
        assert_eq!(charges[0].next_due_at, d("2025-02-28"));
    }

    #[test]
    fn single_charge_even_when_far_behind() {
        let subs = vec![sub("2025-01-15", BillingPeriod::Monthly, true)];
        let charges = due_charges(&subs, d("2025-05-01")).unwrap();
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].next_due_at, d("2025-02-15"));
    }

    #[test]
    fn inactive_subscriptions_are_skipped() {
        let subs = vec![sub("2025-01-15", BillingPeriod::Monthly, false)];
        assert!(due_charges(&subs, d("2025-05-01")).unwrap().is_empty());
    }

    #[test]
    fn future_due_dates_are_skipped() {
        let subs = vec![sub("2025-06-01", BillingPeriod::Monthly, true)];
        assert!(due_charges(&subs, d("2025-05-31")).unwrap().is_empty());
    }

    #[test]
    fn charge_entry_shape() {
        let subs = vec![sub("2025-03-10", BillingPeriod::Monthly, true)];
        let charges = due_charges(&subs, d("2025-03-12")).unwrap();
        let entry = &charges[0].entry;
        assert_eq!(entry.title, "recurring charge: Netflix");
        assert_eq!(entry.kind, EntryKind::Expense);
        assert_eq!(entry.category, "streaming");
        assert_eq!(entry.amount, Decimal::new(1599, 2));
        assert_eq!(entry.occurred_at, d("2025-03-12"));
        assert!(entry.note.is_none());
    }
}
