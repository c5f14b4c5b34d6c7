// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `HLAfloat64Time` / `HLAfloat64Interval`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{LogicalTime, LogicalTimeInterval};
use crate::error::{Result, RtiError};

/// Logical time backed by an `f64`, totally ordered with `f64::total_cmp`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Float64Time(f64);

/// Interval paired with [`Float64Time`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Float64Interval(f64);

impl Float64Time {
    /// Wrap a value. `-0.0` is normalised to `0.0`.
    pub fn new(value: f64) -> Self {
        Self(if value == 0.0 { 0.0 } else { value })
    }

    /// Raw value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Float64Interval {
    /// Wrap a value. `-0.0` is normalised to `0.0`.
    pub fn new(value: f64) -> Self {
        Self(if value == 0.0 { 0.0 } else { value })
    }

    /// Raw value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Float64Time {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<f64> for Float64Interval {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl PartialEq for Float64Time {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Float64Time {}

impl PartialOrd for Float64Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float64Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialEq for Float64Interval {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Float64Interval {}

impl PartialOrd for Float64Interval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float64Interval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Float64Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Float64Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Next representable value above `value` (`f64::next_up` for finite input).
fn next_up(value: f64) -> f64 {
    if value.is_nan() || value == f64::INFINITY {
        return value;
    }
    if value == 0.0 {
        return f64::from_bits(1);
    }
    let bits = value.to_bits();
    if value > 0.0 {
        f64::from_bits(bits + 1)
    } else {
        f64::from_bits(bits - 1)
    }
}

fn decode_f64(bytes: &[u8], what: &str) -> Result<f64> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| RtiError::CouldNotDecode(format!("{} expects 8 bytes", what)))?;
    Ok(f64::from_be_bytes(raw))
}

impl LogicalTimeInterval for Float64Interval {
    fn zero() -> Self {
        Self(0.0)
    }

    fn epsilon() -> Self {
        Self(f64::from_bits(1))
    }

    fn is_valid_lookahead(&self) -> bool {
        !self.0.is_nan() && self.0 >= 0.0
    }

    fn encode(&self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        decode_f64(bytes, "HLAfloat64Interval").map(Self::new)
    }
}

impl LogicalTime for Float64Time {
    type Interval = Float64Interval;

    fn initial() -> Self {
        Self(0.0)
    }

    fn final_time() -> Self {
        Self(f64::MAX)
    }

    fn add(&self, interval: Float64Interval) -> Result<Self> {
        let sum = self.0 + interval.0;
        if !sum.is_finite() {
            return Err(RtiError::IllegalTimeArithmetic(format!(
                "{} + {}",
                self.0, interval.0
            )));
        }
        Ok(Self::new(sum))
    }

    fn sub(&self, interval: Float64Interval) -> Result<Self> {
        let diff = self.0 - interval.0;
        if !diff.is_finite() || diff < 0.0 {
            return Err(RtiError::IllegalTimeArithmetic(format!(
                "{} - {}",
                self.0, interval.0
            )));
        }
        Ok(Self::new(diff))
    }

    fn distance(&self, other: &Self) -> Float64Interval {
        Float64Interval::new((self.0 - other.0).max(0.0))
    }

    fn successor(&self) -> Self {
        if self.0 >= f64::MAX {
            return Self::final_time();
        }
        Self::new(next_up(self.0))
    }

    fn is_valid(&self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }

    fn encode(&self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        decode_f64(bytes, "HLAfloat64Time").map(Self::new)
    }
}
