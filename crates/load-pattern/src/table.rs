// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The immutable, cyclic pattern table.
//!
//! # CSV Format
//! ```text
//! d,h,m,value
//! 0,0,0,28
//! 0,0,5,31
//! ...
//! ```
//! All columns but the last name time components (see [`Granularity`]);
//! the last column is the target allocation as a percentage of the
//! configured maximum memory. The resolution is the spacing of the last
//! time column between the first two data rows.

use crate::{Granularity, Noise, PatternError, PatternKey, TimeUnit};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// A time-keyed table of target allocation percentages.
///
/// Stored values never change after construction; [`lookup`](Self::lookup)
/// only advances the noise generator.
#[derive(Debug, Clone)]
pub struct PatternTable {
    name: String,
    granularity: Granularity,
    resolution: u32,
    values: HashMap<PatternKey, u32>,
    noise: Noise,
}

impl PatternTable {
    /// Builds a table from a header and integer rows.
    ///
    /// The header lists the time columns followed by the value column,
    /// e.g. `["m", "s", "value"]`.
    pub fn from_rows<H: AsRef<str>>(
        header: &[H],
        rows: &[Vec<i64>],
        noise: Noise,
    ) -> Result<Self, PatternError> {
        let header: Vec<&str> = header.iter().map(|h| h.as_ref()).collect();
        let numbered = rows.iter().enumerate().map(|(i, r)| (i + 2, r.clone()));
        Self::build("<rows>".to_string(), &header, numbered, noise)
    }

    /// Parses a table from CSV text.
    ///
    /// Blank lines are skipped and fields are trimmed.
    pub fn from_csv_str(name: &str, content: &str, noise: Noise) -> Result<Self, PatternError> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let header: Vec<&str> = match lines.next() {
            Some((_, l)) => l.split(',').map(str::trim).collect(),
            None => return Err(PatternError::format(0, "missing header")),
        };

        let mut rows = Vec::new();
        for (line, l) in lines {
            let fields = l
                .split(',')
                .map(|f| {
                    f.trim().parse::<i64>().map_err(|_| {
                        PatternError::format(line, format!("expected integer, got '{}'", f.trim()))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push((line, fields));
        }

        Self::build(name.to_string(), &header, rows.into_iter(), noise)
    }

    /// Loads a table from a CSV file.
    pub fn from_path(path: &Path, noise: Noise) -> Result<Self, PatternError> {
        let content = std::fs::read_to_string(path).map_err(|e| PatternError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_csv_str(&name, &content, noise)
    }

    fn build(
        name: String,
        header: &[&str],
        rows: impl Iterator<Item = (usize, Vec<i64>)>,
        noise: Noise,
    ) -> Result<Self, PatternError> {
        if header.iter().all(|c| c.is_empty()) {
            return Err(PatternError::format(1, "empty header"));
        }
        if header.len() < 2 {
            return Err(PatternError::format(
                1,
                "header needs at least one time column and a value column",
            ));
        }

        let time_columns = &header[..header.len() - 1];
        let units = time_columns
            .iter()
            .map(|c| {
                TimeUnit::from_column(c).ok_or_else(|| {
                    PatternError::format(1, format!("unknown time column '{c}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let granularity = Granularity::from_units(&units).ok_or_else(|| {
            PatternError::format(
                1,
                format!("unsupported time columns '{}'", time_columns.join(",")),
            )
        })?;

        let mut values = HashMap::new();
        let mut leading = Vec::with_capacity(2);

        for (line, fields) in rows {
            if fields.len() != header.len() {
                return Err(PatternError::format(
                    line,
                    format!("expected {} fields, got {}", header.len(), fields.len()),
                ));
            }

            let (components, value) = fields.split_at(units.len());
            let mut key_parts = Vec::with_capacity(units.len());
            for (unit, &c) in units.iter().zip(components) {
                if c < 0 || c >= i64::from(unit.range_max()) {
                    return Err(PatternError::format(
                        line,
                        format!(
                            "'{}' component {c} outside 0..{}",
                            unit.as_str(),
                            unit.range_max()
                        ),
                    ));
                }
                key_parts.push(c as u32);
            }

            let value = value[0];
            if value < 0 || value > i64::from(u32::MAX) {
                return Err(PatternError::format(
                    line,
                    format!("value {value} must be a non-negative percentage"),
                ));
            }

            let key = granularity.key_from_components(&key_parts);
            if values.insert(key, value as u32).is_some() {
                return Err(PatternError::format(line, format!("duplicate key {key}")));
            }
            if leading.len() < 2 {
                leading.push(key_parts[key_parts.len() - 1]);
            }
        }

        if leading.len() < 2 {
            return Err(PatternError::format(
                0,
                "at least two data rows are needed to infer the resolution",
            ));
        }
        let resolution = i64::from(leading[1]) - i64::from(leading[0]);
        if resolution <= 0 {
            return Err(PatternError::format(
                0,
                format!("resolution must be positive, first two rows give {resolution}"),
            ));
        }

        let table = Self {
            name,
            granularity,
            resolution: resolution as u32,
            values,
            noise,
        };
        tracing::debug!("{table}");
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Width of one bucket, in units of the smallest time component.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Number of rows (distinct keys).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: construction rejects tables with fewer than two rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn noise_percent(&self) -> u32 {
        self.noise.percent()
    }

    /// Total span of one pass through the table, in seconds.
    ///
    /// `rows × resolution` smallest units; a minute-resolution table spans
    /// 60× the seconds of a second-resolution table of equal size.
    pub fn cycle_seconds(&self) -> u64 {
        self.values.len() as u64
            * u64::from(self.resolution)
            * self.granularity.smallest_unit().seconds()
    }

    /// Key of the bucket containing `t`.
    pub fn key_for(&self, t: NaiveDateTime) -> PatternKey {
        self.granularity.key_for(t, self.resolution)
    }

    /// The stored value for `t`, without noise.
    pub fn value_at(&self, t: NaiveDateTime) -> Result<u32, PatternError> {
        let key = self.key_for(t);
        self.values
            .get(&key)
            .copied()
            .ok_or(PatternError::Lookup { key })
    }

    /// The value for `t` with noise applied.
    pub fn lookup(&mut self, t: NaiveDateTime) -> Result<u32, PatternError> {
        let value = self.value_at(t)?;
        Ok(self.noise.apply(value))
    }

    /// Noise bounds for the stored value at `t`.
    pub fn bounds_at(&self, t: NaiveDateTime) -> Result<(u32, u32), PatternError> {
        Ok(self.noise.bounds(self.value_at(t)?))
    }

    /// Start of the cycle containing `t`.
    pub fn start_of_cycle(&self, t: NaiveDateTime) -> NaiveDateTime {
        self.granularity.start_of_cycle(t)
    }

    /// Offset of `t` into its cycle: `t - start_of_cycle(t)`.
    pub fn time_shift_from_start(&self, t: NaiveDateTime) -> chrono::Duration {
        t - self.start_of_cycle(t)
    }
}

impl fmt::Display for PatternTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pattern {}: type={}, noise +/- {}%, resolution={}{}, {} points, cycle={}s",
            self.name,
            self.granularity,
            self.noise.percent(),
            self.resolution,
            self.granularity.smallest_unit().as_str(),
            self.values.len(),
            self.cycle_seconds(),
        )
    }
}
