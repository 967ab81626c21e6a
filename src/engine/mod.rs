// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The aggregation and projection core. Every function in here is a pure
//! computation over already-fetched data: the store side effects live in
//! `db`, presentation lives in `commands`.

pub mod budgets;
pub mod goals;
pub mod period;
pub mod recurrence;
pub mod snapshot;
pub mod trends;
