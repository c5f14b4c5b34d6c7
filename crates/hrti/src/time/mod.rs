// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pluggable logical time.
//!
//! A federation execution is parameterised by one [`LogicalTime`]
//! implementation. Two standard representations are provided:
//!
//! | Type | HLA name | Epsilon |
//! |------|----------|---------|
//! | [`Float64Time`] | `HLAfloat64Time` | next representable `f64` |
//! | [`Integer64Time`] | `HLAinteger64Time` | `1` |
//!
//! The only arithmetic the time manager needs is `add`/`sub` of an interval,
//! comparison, and [`LogicalTime::successor`], the smallest time strictly
//! greater than a given one (`t + epsilon`).

mod float64;
mod integer64;

pub use float64::{Float64Interval, Float64Time};
pub use integer64::{Integer64Interval, Integer64Time};

use std::fmt;

use crate::error::Result;

/// Distance between two logical times.
pub trait LogicalTimeInterval:
    Copy + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// The zero interval.
    fn zero() -> Self;

    /// The smallest non-zero interval.
    fn epsilon() -> Self;

    /// `true` for the zero interval.
    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// `false` for values that may not be used as a lookahead (negative, NaN).
    fn is_valid_lookahead(&self) -> bool {
        *self >= Self::zero()
    }

    /// Wire encoding.
    fn encode(&self) -> Vec<u8>;

    /// Inverse of [`LogicalTimeInterval::encode`].
    fn decode(bytes: &[u8]) -> Result<Self>;
}

/// A point on the federation time axis.
pub trait LogicalTime: Copy + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Interval type paired with this time.
    type Interval: LogicalTimeInterval;

    /// Time every federate starts at.
    fn initial() -> Self;

    /// Largest representable time.
    fn final_time() -> Self;

    /// `self + interval`; `IllegalTimeArithmetic` on overflow.
    fn add(&self, interval: Self::Interval) -> Result<Self>;

    /// `self - interval`; `IllegalTimeArithmetic` on underflow.
    fn sub(&self, interval: Self::Interval) -> Result<Self>;

    /// `self - other` as an interval (saturating at zero).
    fn distance(&self, other: &Self) -> Self::Interval;

    /// Smallest time strictly greater than `self`, saturating at
    /// [`LogicalTime::final_time`].
    fn successor(&self) -> Self;

    /// `false` for values that cannot take part in the ordering (NaN).
    fn is_valid(&self) -> bool {
        true
    }

    /// Wire encoding.
    fn encode(&self) -> Vec<u8>;

    /// Inverse of [`LogicalTime::encode`].
    fn decode(bytes: &[u8]) -> Result<Self>;

    /// `self + interval`, saturating at the final time.
    fn saturating_add(&self, interval: Self::Interval) -> Self {
        self.add(interval).unwrap_or_else(|_| Self::final_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laws<T: LogicalTime>(a: T, interval: T::Interval) {
        let b = a.add(interval).unwrap();
        assert!(b >= a);
        assert_eq!(b.sub(interval).unwrap(), a);
        assert_eq!(b.distance(&a), interval);
        assert!(a.successor() > a);
        assert_eq!(T::decode(&a.encode()).unwrap(), a);
    }

    #[test]
    fn test_time_laws() {
        laws(Float64Time::new(2.5), Float64Interval::new(0.5));
        laws(Float64Time::initial(), Float64Interval::zero());
        laws(Integer64Time::new(10), Integer64Interval::new(3));
    }
}
