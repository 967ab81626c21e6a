// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod users;
pub mod transactions;
pub mod subscriptions;
pub mod budgets;
pub mod goals;
pub mod dashboard;
pub mod reports;
pub mod advisor;
pub mod doctor;
