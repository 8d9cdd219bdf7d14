// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # load-pattern
//!
//! Turns wall-clock time into a target memory allocation, expressed as a
//! percentage of a configured maximum.
//!
//! # Key Components
//!
//! - [`Granularity`] — which time components index a pattern (second,
//!   minute, minute+second, hour+minute, weekday+hour+minute).
//! - [`PatternKey`] — the bucketed lookup key for an instant.
//! - [`PatternTable`] — the immutable table, loaded once from CSV, with
//!   cycle arithmetic (`start_of_cycle`, `time_shift_from_start`).
//! - [`Noise`] — bounded uniform noise with an injectable, seedable RNG.
//!
//! # Example
//! ```
//! use chrono::NaiveDate;
//! use load_pattern::{Noise, PatternTable};
//!
//! let mut table = PatternTable::from_csv_str(
//!     "s.csv",
//!     "s,value\n0,60\n30,10\n",
//!     Noise::none(),
//! ).unwrap();
//!
//! let t = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap().and_hms_opt(9, 0, 42).unwrap();
//! assert_eq!(table.lookup(t).unwrap(), 10);
//! assert_eq!(table.cycle_seconds(), 60);
//! ```

mod error;
mod granularity;
mod noise;
mod table;

pub use error::PatternError;
pub use granularity::{Granularity, PatternKey, TimeUnit};
pub use noise::Noise;
pub use table::PatternTable;
