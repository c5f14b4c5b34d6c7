// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `HLAinteger64Time` / `HLAinteger64Interval`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{LogicalTime, LogicalTimeInterval};
use crate::error::{Result, RtiError};

/// Logical time backed by an `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Integer64Time(i64);

/// Interval paired with [`Integer64Time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Integer64Interval(i64);

impl Integer64Time {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl Integer64Interval {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Integer64Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Integer64Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn decode_i64(bytes: &[u8], what: &str) -> Result<i64> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| RtiError::CouldNotDecode(format!("{} expects 8 bytes", what)))?;
    Ok(i64::from_be_bytes(raw))
}

impl LogicalTimeInterval for Integer64Interval {
    fn zero() -> Self {
        Self(0)
    }

    fn epsilon() -> Self {
        Self(1)
    }

    fn encode(&self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        decode_i64(bytes, "HLAinteger64Interval").map(Self)
    }
}

impl LogicalTime for Integer64Time {
    type Interval = Integer64Interval;

    fn initial() -> Self {
        Self(0)
    }

    fn final_time() -> Self {
        Self(i64::MAX)
    }

    fn add(&self, interval: Integer64Interval) -> Result<Self> {
        self.0
            .checked_add(interval.0)
            .map(Self)
            .ok_or_else(|| RtiError::IllegalTimeArithmetic(format!("{} + {}", self.0, interval.0)))
    }

    fn sub(&self, interval: Integer64Interval) -> Result<Self> {
        match self.0.checked_sub(interval.0) {
            Some(v) if v >= 0 => Ok(Self(v)),
            _ => Err(RtiError::IllegalTimeArithmetic(format!(
                "{} - {}",
                self.0, interval.0
            ))),
        }
    }

    fn distance(&self, other: &Self) -> Integer64Interval {
        Integer64Interval(self.0.saturating_sub(other.0).max(0))
    }

    fn successor(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    fn is_valid(&self) -> bool {
        self.0 >= 0
    }

    fn encode(&self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        decode_i64(bytes, "HLAinteger64Time").map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_bounds() {
        assert!(Integer64Time::final_time().add(Integer64Interval::new(1)).is_err());
        assert!(Integer64Time::new(2).sub(Integer64Interval::new(3)).is_err());
        assert_eq!(Integer64Time::final_time().successor(), Integer64Time::final_time());
        assert_eq!(
            Integer64Time::new(5).distance(&Integer64Time::new(9)),
            Integer64Interval::zero()
        );
    }
}
