// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Input rejections raised before anything is written. Commands surface
/// these through `anyhow`, so the message is what the user sees.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("target amount must be positive, got {0}")]
    NonPositiveTarget(Decimal),

    #[error("target date {0} is in the past")]
    PastTargetDate(NaiveDate),

    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    #[error("unknown entry kind '{0}', expected income|expense")]
    UnknownEntryKind(String),

    #[error("unknown billing period '{0}', expected monthly|yearly")]
    UnknownBillingPeriod(String),
}
