// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::RtiAmbassador;
use crate::error::Result;
use crate::federation::AdvanceKind;
use crate::handle::MessageRetractionHandle;
use crate::time::LogicalTime;

/// Time management services.
///
/// Enabling regulation completes immediately with `time_regulation_enabled`;
/// enabling constraint completes with `time_constrained_enabled` once no
/// regulating federate can still send below the federate's time. Every
/// advance request is answered by exactly one `time_advance_grant`.
pub trait TimeManagement<T: LogicalTime> {
    fn enable_time_regulation(&self, lookahead: T::Interval) -> Result<()>;

    fn disable_time_regulation(&self) -> Result<()>;

    fn enable_time_constrained(&self) -> Result<()>;

    /// Queued timestamp-ordered messages are released in receive order.
    fn disable_time_constrained(&self) -> Result<()>;

    fn time_advance_request(&self, time: T) -> Result<()>;

    fn time_advance_request_available(&self, time: T) -> Result<()>;

    /// Advance to the next timestamp-ordered message, or `time` if none
    /// comes earlier.
    fn next_message_request(&self, time: T) -> Result<()>;

    fn next_message_request_available(&self, time: T) -> Result<()>;

    /// Deliver every queued message and advance as far as safely possible.
    fn flush_queue_request(&self, time: T) -> Result<()>;

    fn enable_asynchronous_delivery(&self) -> Result<()>;

    fn disable_asynchronous_delivery(&self) -> Result<()>;

    /// `None` when no other federate is regulating.
    fn query_galt(&self) -> Result<Option<T>>;

    fn query_logical_time(&self) -> Result<T>;

    fn query_lits(&self) -> Result<Option<T>>;

    fn modify_lookahead(&self, lookahead: T::Interval) -> Result<()>;

    fn query_lookahead(&self) -> Result<T::Interval>;

    /// Withdraw a timestamp-ordered message while the federate's logical
    /// time is still below its timestamp.
    fn retract(&self, retraction: MessageRetractionHandle) -> Result<()>;
}

impl<T: LogicalTime> TimeManagement<T> for RtiAmbassador<T> {
    fn enable_time_regulation(&self, lookahead: T::Interval) -> Result<()> {
        self.transact(|s, me, out| s.enable_time_regulation(me, lookahead, out))
    }

    fn disable_time_regulation(&self) -> Result<()> {
        self.transact(|s, me, _| s.disable_time_regulation(me))
    }

    fn enable_time_constrained(&self) -> Result<()> {
        self.transact(|s, me, _| s.enable_time_constrained(me))
    }

    fn disable_time_constrained(&self) -> Result<()> {
        self.transact(|s, me, out| s.disable_time_constrained(me, out))
    }

    fn time_advance_request(&self, time: T) -> Result<()> {
        self.transact(|s, me, out| s.time_advance(me, AdvanceKind::TimeAdvanceRequest, time, out))
    }

    fn time_advance_request_available(&self, time: T) -> Result<()> {
        self.transact(|s, me, out| {
            s.time_advance(me, AdvanceKind::TimeAdvanceRequestAvailable, time, out)
        })
    }

    fn next_message_request(&self, time: T) -> Result<()> {
        self.transact(|s, me, out| s.time_advance(me, AdvanceKind::NextMessageRequest, time, out))
    }

    fn next_message_request_available(&self, time: T) -> Result<()> {
        self.transact(|s, me, out| {
            s.time_advance(me, AdvanceKind::NextMessageRequestAvailable, time, out)
        })
    }

    fn flush_queue_request(&self, time: T) -> Result<()> {
        self.transact(|s, me, out| s.time_advance(me, AdvanceKind::FlushQueueRequest, time, out))
    }

    fn enable_asynchronous_delivery(&self) -> Result<()> {
        self.transact(|s, me, out| s.set_asynchronous_delivery(me, true, out))
    }

    fn disable_asynchronous_delivery(&self) -> Result<()> {
        self.transact(|s, me, out| s.set_asynchronous_delivery(me, false, out))
    }

    fn query_galt(&self) -> Result<Option<T>> {
        self.read(|s, me| s.query_galt(me))
    }

    fn query_logical_time(&self) -> Result<T> {
        self.read(|s, me| s.query_logical_time(me))
    }

    fn query_lits(&self) -> Result<Option<T>> {
        self.read(|s, me| s.query_lits(me))
    }

    fn modify_lookahead(&self, lookahead: T::Interval) -> Result<()> {
        self.transact(|s, me, _| s.modify_lookahead(me, lookahead))
    }

    fn query_lookahead(&self) -> Result<T::Interval> {
        self.read(|s, me| s.query_lookahead(me))
    }

    fn retract(&self, retraction: MessageRetractionHandle) -> Result<()> {
        self.transact(|s, me, out| s.retract(me, retraction, out))
    }
}
