// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Time management: regulation, constraint, GALT and grants.
//!
//! Every regulating federate has a least outgoing timestamp (LOTS), the
//! smallest timestamp it may still send:
//!
//! | State | LOTS |
//! |-------|------|
//! | granted at `t` | `t + L` |
//! | TAR/TARA(`t`) | `t + L` |
//! | NMR/NMRA/FQR(`t`) | `m + L`, `m = min(t, next queued TSO)` |
//!
//! With a zero lookahead a federate in TAR, NMR or FQR cannot send at its
//! requested time any more, so its LOTS is the successor of that time. LOTS
//! never decreases.
//!
//! The GALT of a federate is the minimum LOTS over the other regulating
//! federates. A constrained federate is granted `t` only once no message
//! stamped `t` (or earlier) can still arrive.
//!
//! A timestamp-ordered message stays retractable until its sender's logical
//! time reaches the message timestamp. Copies still queued at constrained
//! receivers are dropped on retraction; receivers that already got the
//! message are sent a `RequestRetraction` callback.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{FederationState, Outbox};
use crate::callback::Callback;
use crate::error::{Result, RtiError};
use crate::handle::{
    FederateHandle, FederateHandleSet, HandleAllocator, MessageRetractionHandle,
    MessageRetractionKind,
};
use crate::time::{LogicalTime, LogicalTimeInterval};
use crate::types::OrderType;

/// Kind of an outstanding time advance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvanceKind {
    TimeAdvanceRequest,
    TimeAdvanceRequestAvailable,
    NextMessageRequest,
    NextMessageRequestAvailable,
    FlushQueueRequest,
}

impl AdvanceKind {
    /// The `*Available` variants may be granted at GALT itself.
    pub fn is_available(self) -> bool {
        matches!(
            self,
            Self::TimeAdvanceRequestAvailable | Self::NextMessageRequestAvailable
        )
    }

    fn is_message_driven(self) -> bool {
        matches!(
            self,
            Self::NextMessageRequest | Self::NextMessageRequestAvailable | Self::FlushQueueRequest
        )
    }
}

/// Per-federate advance state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeAdvanceState<T> {
    /// No request outstanding.
    Granted,
    /// Waiting for a grant.
    TimeAdvancing { kind: AdvanceKind, requested: T },
}

#[derive(Debug, Clone)]
pub(crate) struct TimeState<T: LogicalTime> {
    time: T,
    lookahead: T::Interval,
    regulating: bool,
    constrained: bool,
    constrained_pending: bool,
    advancing: Option<(AdvanceKind, T)>,
    last_grant_available: bool,
    async_delivery: bool,
    lots_floor: Option<T>,
    tso: BTreeMap<(T, u64), Callback<T>>,
    held_ro: Vec<Callback<T>>,
}

impl<T: LogicalTime> TimeState<T> {
    fn new() -> Self {
        Self {
            time: T::initial(),
            lookahead: T::Interval::zero(),
            regulating: false,
            constrained: false,
            constrained_pending: false,
            advancing: None,
            last_grant_available: false,
            async_delivery: false,
            lots_floor: None,
            tso: BTreeMap::new(),
            held_ro: Vec::new(),
        }
    }

    fn next_tso(&self) -> Option<T> {
        self.tso.keys().next().map(|(t, _)| *t)
    }

    fn raw_lots(&self) -> Option<T> {
        if !self.regulating {
            return None;
        }
        let Some((kind, requested)) = self.advancing else {
            return Some(self.time.saturating_add(self.lookahead));
        };
        let base = if kind.is_message_driven() {
            self.next_tso().map_or(requested, |m| m.min(requested))
        } else {
            requested
        };
        if self.lookahead.is_zero() && !kind.is_available() {
            Some(base.successor())
        } else {
            Some(base.saturating_add(self.lookahead))
        }
    }

    fn lots(&self) -> Option<T> {
        let raw = self.raw_lots()?;
        Some(self.lots_floor.map_or(raw, |floor| raw.max(floor)))
    }

    fn refresh_floor(&mut self) {
        self.lots_floor = self.lots();
    }

    /// Smallest time a constrained federate in this state may still be
    /// granted, which a newly regulating federate must not undercut.
    fn grant_bound(&self) -> T {
        match self.advancing {
            Some((kind, t)) if kind.is_available() => t,
            Some((_, t)) => t.successor(),
            None if self.last_grant_available => self.time,
            None => self.time.successor(),
        }
    }

    fn advance_state(&self) -> TimeAdvanceState<T> {
        match self.advancing {
            None => TimeAdvanceState::Granted,
            Some((kind, requested)) => TimeAdvanceState::TimeAdvancing { kind, requested },
        }
    }
}

/// Where the copies of one retractable message went.
#[derive(Debug, Clone)]
struct Retractable<T> {
    sender: FederateHandle,
    time: T,
    /// TSO queue keys of copies not yet released.
    queued: BTreeMap<FederateHandle, (T, u64)>,
    delivered: FederateHandleSet,
}

/// Time state of every member of a federation execution.
#[derive(Debug, Clone)]
pub(crate) struct TimeManager<T: LogicalTime> {
    states: BTreeMap<FederateHandle, TimeState<T>>,
    seq: u64,
    retractables: BTreeMap<MessageRetractionHandle, Retractable<T>>,
    retraction_ids: HandleAllocator<MessageRetractionKind>,
}

impl<T: LogicalTime> Default for TimeManager<T> {
    fn default() -> Self {
        Self {
            states: BTreeMap::new(),
            seq: 0,
            retractables: BTreeMap::new(),
            retraction_ids: HandleAllocator::default(),
        }
    }
}

impl<T: LogicalTime> TimeManager<T> {
    pub(crate) fn join(&mut self, federate: FederateHandle) {
        self.states.insert(federate, TimeState::new());
    }

    pub(crate) fn leave(&mut self, federate: FederateHandle) {
        self.states.remove(&federate);
        self.retractables.retain(|_, r| r.sender != federate);
        for record in self.retractables.values_mut() {
            record.queued.remove(&federate);
            record.delivered.remove(&federate);
        }
    }

    /// Roll back to `saved`, keeping the retraction allocator so handles stay unique.
    pub(crate) fn restore_from(&mut self, saved: &TimeManager<T>) {
        self.states = saved.states.clone();
        self.retractables = saved.retractables.clone();
    }

    fn state(&self, federate: FederateHandle) -> Result<&TimeState<T>> {
        self.states
            .get(&federate)
            .ok_or(RtiError::FederateNotExecutionMember)
    }

    fn state_mut(&mut self, federate: FederateHandle) -> Result<&mut TimeState<T>> {
        self.states
            .get_mut(&federate)
            .ok_or(RtiError::FederateNotExecutionMember)
    }

    pub(crate) fn time_of(&self, federate: FederateHandle) -> Option<T> {
        self.states.get(&federate).map(|s| s.time)
    }

    #[cfg(test)]
    pub(crate) fn lots(&self, federate: FederateHandle) -> Option<T> {
        self.states.get(&federate).and_then(|s| s.lots())
    }

    /// Minimum LOTS over the regulating federates other than `federate`.
    pub(crate) fn galt_for(&self, federate: FederateHandle) -> Option<T> {
        self.states
            .iter()
            .filter(|(h, _)| **h != federate)
            .filter_map(|(_, s)| s.lots())
            .min()
    }

    /// Minimum LOTS over every regulating federate.
    pub(crate) fn federation_galt(&self) -> Option<T> {
        self.states.values().filter_map(|s| s.lots()).min()
    }

    /// Least incoming timestamp: GALT or the next queued TSO message.
    pub(crate) fn lits(&self, federate: FederateHandle) -> Option<T> {
        let next = self.states.get(&federate).and_then(|s| s.next_tso());
        match (self.galt_for(federate), next) {
            (Some(g), Some(m)) => Some(g.min(m)),
            (g, m) => g.or(m),
        }
    }

    fn refresh_floors(&mut self) {
        for state in self.states.values_mut() {
            state.refresh_floor();
        }
    }

    // ========================================================================
    // Message ordering
    // ========================================================================

    /// Timestamp a message travels with, or `None` for receive order.
    ///
    /// A message is timestamp ordered when it carries a time, its order type
    /// is timestamp, and the sender is regulating.
    pub(crate) fn message_timestamp(
        &self,
        sender: FederateHandle,
        time: Option<T>,
        order: OrderType,
    ) -> Result<Option<T>> {
        let Some(t) = time else {
            return Ok(None);
        };
        if !t.is_valid() {
            return Err(RtiError::InvalidLogicalTime(t.to_string()));
        }
        let state = self.state(sender)?;
        if order != OrderType::Timestamp || !state.regulating {
            return Ok(None);
        }
        if let Some(lots) = state.lots() {
            if t < lots {
                return Err(RtiError::InvalidLogicalTime(format!(
                    "{} is below the least outgoing timestamp {}",
                    t, lots
                )));
            }
        }
        Ok(Some(t))
    }

    /// Route a message to `receiver`: queue it by timestamp, hold it until
    /// the next request, or hand it over.
    pub(crate) fn deliver(
        &mut self,
        receiver: FederateHandle,
        callback: Callback<T>,
        stamp: Option<T>,
        out: &mut Outbox<T>,
    ) {
        let Some(state) = self.states.get_mut(&receiver) else {
            return;
        };
        let record = callback
            .retraction()
            .and_then(|h| self.retractables.get_mut(&h));
        match stamp {
            Some(t) if state.constrained => {
                self.seq += 1;
                if let Some(record) = record {
                    record.queued.insert(receiver, (t, self.seq));
                }
                state.tso.insert((t, self.seq), callback);
            }
            Some(_) => {
                if let Some(record) = record {
                    record.delivered.insert(receiver);
                }
                out.push(receiver, callback.with_received_order(OrderType::Receive));
            }
            None if state.constrained && state.advancing.is_none() && !state.async_delivery => {
                state.held_ro.push(callback);
            }
            None => out.push(receiver, callback),
        }
    }

    /// Note that a queued copy of a retractable message reached `receiver`.
    fn mark_released(
        retractables: &mut BTreeMap<MessageRetractionHandle, Retractable<T>>,
        receiver: FederateHandle,
        callback: &Callback<T>,
    ) {
        if let Some(record) = callback.retraction().and_then(|h| retractables.get_mut(&h)) {
            record.queued.remove(&receiver);
            record.delivered.insert(receiver);
        }
    }

    // ========================================================================
    // Retraction
    // ========================================================================

    /// Handle for a message `sender` is about to send stamped `time`.
    pub(crate) fn issue_retraction(
        &mut self,
        sender: FederateHandle,
        time: T,
    ) -> MessageRetractionHandle {
        let handle = self.retraction_ids.allocate();
        self.retractables.insert(
            handle,
            Retractable {
                sender,
                time,
                queued: BTreeMap::new(),
                delivered: FederateHandleSet::new(),
            },
        );
        handle
    }

    pub(crate) fn is_retractable(&self, retraction: MessageRetractionHandle) -> bool {
        self.retractables.contains_key(&retraction)
    }

    pub(crate) fn check_retractable(
        &self,
        federate: FederateHandle,
        retraction: MessageRetractionHandle,
    ) -> Result<()> {
        let state = self.state(federate)?;
        if !state.regulating {
            return Err(RtiError::TimeRegulationIsNotEnabled);
        }
        let Some(record) = self.retractables.get(&retraction) else {
            if self.retraction_ids.issued(retraction) {
                return Err(RtiError::MessageCanNoLongerBeRetracted(retraction));
            }
            return Err(RtiError::InvalidMessageRetractionHandle(retraction));
        };
        if record.sender != federate {
            return Err(RtiError::InvalidMessageRetractionHandle(retraction));
        }
        if state.time >= record.time {
            return Err(RtiError::MessageCanNoLongerBeRetracted(retraction));
        }
        Ok(())
    }

    /// Withdraw a message checked with [`Self::check_retractable`].
    pub(crate) fn retract(&mut self, retraction: MessageRetractionHandle, out: &mut Outbox<T>) {
        let Some(record) = self.retractables.remove(&retraction) else {
            return;
        };
        for (receiver, key) in record.queued {
            if let Some(state) = self.states.get_mut(&receiver) {
                state.tso.remove(&key);
            }
        }
        for receiver in record.delivered {
            if self.states.contains_key(&receiver) {
                out.push(receiver, Callback::RequestRetraction { retraction });
            }
        }
        log::debug!("[time] {:?} retracted by {:?}", retraction, record.sender);
    }

    fn release_held(state: &mut TimeState<T>, federate: FederateHandle, out: &mut Outbox<T>) {
        for callback in state.held_ro.drain(..) {
            out.push(federate, callback);
        }
    }

    // ========================================================================
    // Regulation and constraint
    // ========================================================================

    pub(crate) fn enable_time_regulation(
        &mut self,
        federate: FederateHandle,
        lookahead: T::Interval,
        out: &mut Outbox<T>,
    ) -> Result<T> {
        let state = self.state(federate)?;
        if state.regulating {
            return Err(RtiError::TimeRegulationAlreadyEnabled);
        }
        if state.advancing.is_some() {
            return Err(RtiError::InTimeAdvancingState);
        }
        if !lookahead.is_valid_lookahead() {
            return Err(RtiError::InvalidLookahead(lookahead.to_string()));
        }

        let own = state.time;
        let bound = self
            .states
            .iter()
            .filter(|(h, s)| **h != federate && s.constrained)
            .map(|(_, s)| s.grant_bound())
            .min();
        let mut time = match bound {
            Some(bound) => bound.sub(lookahead).map_or(own, |t| t.max(own)),
            None => own,
        };
        if let Some(bound) = bound {
            if time.saturating_add(lookahead) < bound {
                time = time.successor();
            }
        }

        let state = self.state_mut(federate)?;
        state.time = time;
        state.lookahead = lookahead;
        state.regulating = true;
        state.lots_floor = None;
        state.refresh_floor();
        out.push(federate, Callback::TimeRegulationEnabled { time });
        log::debug!("[time] {:?} regulating at {} lookahead {}", federate, time, lookahead);
        Ok(time)
    }

    pub(crate) fn disable_time_regulation(&mut self, federate: FederateHandle) -> Result<()> {
        let state = self.state_mut(federate)?;
        if !state.regulating {
            return Err(RtiError::TimeRegulationIsNotEnabled);
        }
        state.regulating = false;
        state.lots_floor = None;
        self.retractables.retain(|_, r| r.sender != federate);
        log::debug!("[time] {:?} no longer regulating", federate);
        Ok(())
    }

    pub(crate) fn enable_time_constrained(&mut self, federate: FederateHandle) -> Result<()> {
        let state = self.state_mut(federate)?;
        if state.constrained {
            return Err(RtiError::TimeConstrainedAlreadyEnabled);
        }
        if state.constrained_pending {
            return Err(RtiError::RequestForTimeConstrainedPending);
        }
        if state.advancing.is_some() {
            return Err(RtiError::InTimeAdvancingState);
        }
        state.constrained_pending = true;
        Ok(())
    }

    pub(crate) fn disable_time_constrained(
        &mut self,
        federate: FederateHandle,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        let state = self
            .states
            .get_mut(&federate)
            .ok_or(RtiError::FederateNotExecutionMember)?;
        if !state.constrained {
            return Err(RtiError::TimeConstrainedIsNotEnabled);
        }
        state.constrained = false;
        for (_, callback) in std::mem::take(&mut state.tso) {
            Self::mark_released(&mut self.retractables, federate, &callback);
            out.push(federate, callback.with_received_order(OrderType::Receive));
        }
        Self::release_held(state, federate, out);
        state.refresh_floor();
        log::debug!("[time] {:?} no longer constrained", federate);
        Ok(())
    }

    pub(crate) fn modify_lookahead(
        &mut self,
        federate: FederateHandle,
        lookahead: T::Interval,
    ) -> Result<()> {
        let state = self.state_mut(federate)?;
        if !state.regulating {
            return Err(RtiError::TimeRegulationIsNotEnabled);
        }
        if state.advancing.is_some() {
            return Err(RtiError::InTimeAdvancingState);
        }
        if !lookahead.is_valid_lookahead() {
            return Err(RtiError::InvalidLookahead(lookahead.to_string()));
        }
        state.lookahead = lookahead;
        state.refresh_floor();
        Ok(())
    }

    pub(crate) fn query_lookahead(&self, federate: FederateHandle) -> Result<T::Interval> {
        let state = self.state(federate)?;
        if !state.regulating {
            return Err(RtiError::TimeRegulationIsNotEnabled);
        }
        Ok(state.lookahead)
    }

    pub(crate) fn set_asynchronous_delivery(
        &mut self,
        federate: FederateHandle,
        enabled: bool,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        let state = self.state_mut(federate)?;
        match (state.async_delivery, enabled) {
            (true, true) => return Err(RtiError::AsynchronousDeliveryAlreadyEnabled),
            (false, false) => return Err(RtiError::AsynchronousDeliveryAlreadyDisabled),
            _ => {}
        }
        state.async_delivery = enabled;
        if enabled {
            Self::release_held(state, federate, out);
        }
        Ok(())
    }

    pub(crate) fn advance_state(&self, federate: FederateHandle) -> Result<TimeAdvanceState<T>> {
        Ok(self.state(federate)?.advance_state())
    }

    #[cfg(test)]
    pub(crate) fn is_constrained(&self, federate: FederateHandle) -> bool {
        self.states.get(&federate).is_some_and(|s| s.constrained)
    }

    // ========================================================================
    // Advancing
    // ========================================================================

    pub(crate) fn request(
        &mut self,
        federate: FederateHandle,
        kind: AdvanceKind,
        time: T,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        let state = self.state_mut(federate)?;
        if state.advancing.is_some() {
            return Err(RtiError::InTimeAdvancingState);
        }
        if state.constrained_pending {
            return Err(RtiError::RequestForTimeConstrainedPending);
        }
        if !time.is_valid() {
            return Err(RtiError::InvalidLogicalTime(time.to_string()));
        }
        let passed = if kind.is_available() {
            time < state.time
        } else {
            time <= state.time
        };
        if passed {
            return Err(RtiError::LogicalTimeAlreadyPassed(format!(
                "{} (current time {})",
                time, state.time
            )));
        }
        state.advancing = Some((kind, time));
        Self::release_held(state, federate, out);
        state.refresh_floor();
        log::debug!("[time] {:?} {:?}({})", federate, kind, time);
        Ok(())
    }

    /// Time `federate` can be granted now, if any.
    fn grantable(&self, federate: FederateHandle) -> Option<T> {
        let state = self.states.get(&federate)?;
        let (kind, requested) = state.advancing?;
        if !state.constrained {
            return Some(requested);
        }
        let galt = self.galt_for(federate);
        let next = state.next_tso();
        let below = |t: T, inclusive: bool| {
            galt.map_or(true, |g| if inclusive { t <= g } else { t < g })
        };
        match kind {
            AdvanceKind::TimeAdvanceRequest => below(requested, false).then_some(requested),
            AdvanceKind::TimeAdvanceRequestAvailable => below(requested, true).then_some(requested),
            AdvanceKind::NextMessageRequest | AdvanceKind::NextMessageRequestAvailable => {
                let m = next.map_or(requested, |m| m.min(requested));
                below(m, kind.is_available()).then_some(m)
            }
            AdvanceKind::FlushQueueRequest => {
                let mut g = requested;
                if let Some(galt) = galt {
                    g = g.min(galt);
                }
                if let Some(m) = next {
                    g = g.min(m);
                }
                Some(g.max(state.time))
            }
        }
    }

    fn grant(&mut self, federate: FederateHandle, time: T, out: &mut Outbox<T>) {
        let Some(state) = self.states.get_mut(&federate) else {
            return;
        };
        let Some((kind, _)) = state.advancing.take() else {
            return;
        };
        let due: Vec<(T, u64)> = if kind == AdvanceKind::FlushQueueRequest {
            state.tso.keys().copied().collect()
        } else {
            state.tso.keys().take_while(|(t, _)| *t <= time).copied().collect()
        };
        for key in due {
            if let Some(callback) = state.tso.remove(&key) {
                Self::mark_released(&mut self.retractables, federate, &callback);
                out.push(federate, callback);
            }
        }
        state.time = time;
        state.last_grant_available = kind.is_available();
        self.retractables
            .retain(|_, r| r.sender != federate || r.time > time);
        out.push(federate, Callback::TimeAdvanceGrant { time });
        log::debug!("[time] {:?} granted {}", federate, time);
    }

    /// Complete pending constraint enables and grants until nothing moves.
    pub(crate) fn evaluate(&mut self, out: &mut Outbox<T>) -> Vec<(FederateHandle, T)> {
        let mut grants = Vec::new();
        loop {
            let enable = self.states.iter().find_map(|(h, s)| {
                let ready = s.constrained_pending
                    && self.galt_for(*h).map_or(true, |g| g >= s.time);
                ready.then_some(*h)
            });
            if let Some(federate) = enable {
                if let Some(state) = self.states.get_mut(&federate) {
                    state.constrained_pending = false;
                    state.constrained = true;
                    out.push(federate, Callback::TimeConstrainedEnabled { time: state.time });
                    log::debug!("[time] {:?} constrained at {}", federate, state.time);
                }
                self.refresh_floors();
                continue;
            }

            let next = self
                .states
                .keys()
                .find_map(|h| self.grantable(*h).map(|t| (*h, t)));
            let Some((federate, time)) = next else {
                break;
            };
            self.grant(federate, time, out);
            self.refresh_floors();
            grants.push((federate, time));
        }
        grants
    }
}

impl<T: LogicalTime> FederationState<T> {
    pub(crate) fn enable_time_regulation(
        &mut self,
        federate: FederateHandle,
        lookahead: T::Interval,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.time.enable_time_regulation(federate, lookahead, out)?;
        Ok(())
    }

    pub(crate) fn disable_time_regulation(&mut self, federate: FederateHandle) -> Result<()> {
        self.check_active(federate)?;
        self.time.disable_time_regulation(federate)
    }

    pub(crate) fn enable_time_constrained(&mut self, federate: FederateHandle) -> Result<()> {
        self.check_active(federate)?;
        self.time.enable_time_constrained(federate)
    }

    pub(crate) fn disable_time_constrained(
        &mut self,
        federate: FederateHandle,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.time.disable_time_constrained(federate, out)
    }

    pub(crate) fn time_advance(
        &mut self,
        federate: FederateHandle,
        kind: AdvanceKind,
        time: T,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.time.request(federate, kind, time, out)
    }

    pub(crate) fn modify_lookahead(
        &mut self,
        federate: FederateHandle,
        lookahead: T::Interval,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.time.modify_lookahead(federate, lookahead)
    }

    pub(crate) fn query_lookahead(&self, federate: FederateHandle) -> Result<T::Interval> {
        self.check_member(federate)?;
        self.time.query_lookahead(federate)
    }

    pub(crate) fn query_galt(&self, federate: FederateHandle) -> Result<Option<T>> {
        self.check_member(federate)?;
        Ok(self.time.galt_for(federate))
    }

    pub(crate) fn query_lits(&self, federate: FederateHandle) -> Result<Option<T>> {
        self.check_member(federate)?;
        Ok(self.time.lits(federate))
    }

    pub(crate) fn query_logical_time(&self, federate: FederateHandle) -> Result<T> {
        self.check_member(federate)?;
        self.time
            .time_of(federate)
            .ok_or(RtiError::FederateNotExecutionMember)
    }

    pub(crate) fn set_asynchronous_delivery(
        &mut self,
        federate: FederateHandle,
        enabled: bool,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.time.set_asynchronous_delivery(federate, enabled, out)
    }

    pub(crate) fn time_advance_state(&self, federate: FederateHandle) -> Result<TimeAdvanceState<T>> {
        self.check_member(federate)?;
        self.time.advance_state(federate)
    }

    pub(crate) fn federation_galt(&self, federate: FederateHandle) -> Result<Option<T>> {
        self.check_member(federate)?;
        Ok(self.time.federation_galt())
    }

    pub(crate) fn retract(
        &mut self,
        federate: FederateHandle,
        retraction: MessageRetractionHandle,
        out: &mut Outbox<T>,
    ) -> Result<()> {
        self.check_active(federate)?;
        self.time.check_retractable(federate, retraction)?;
        self.check_revivable(retraction)?;
        self.time.retract(retraction, out);
        self.revive_instance(retraction);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::ObjectInstanceHandle;
    use crate::time::{Float64Interval, Float64Time};

    type Time = Float64Time;

    fn fed(v: u64) -> FederateHandle {
        FederateHandle::new(v)
    }

    fn t(v: f64) -> Time {
        Float64Time::new(v)
    }

    fn remove(time: f64) -> Callback<Time> {
        Callback::RemoveObjectInstance {
            object: ObjectInstanceHandle::new(1),
            tag: Vec::new(),
            sent_order: OrderType::Timestamp,
            time: Some(t(time)),
            received_order: OrderType::Timestamp,
            retraction: None,
            producer: fed(1),
        }
    }

    fn manager(feds: &[u64]) -> TimeManager<Time> {
        let mut tm = TimeManager::default();
        for f in feds {
            tm.join(fed(*f));
        }
        tm
    }

    #[test]
    fn test_lots_rules() {
        let mut tm = manager(&[1, 2]);
        let mut out = Outbox::default();
        tm.enable_time_regulation(fed(1), Float64Interval::new(2.0), &mut out)
            .unwrap();
        assert_eq!(tm.lots(fed(1)), Some(t(2.0)));
        assert_eq!(tm.galt_for(fed(2)), Some(t(2.0)));
        assert_eq!(tm.galt_for(fed(1)), None);

        tm.request(fed(1), AdvanceKind::TimeAdvanceRequest, t(5.0), &mut out)
            .unwrap();
        assert_eq!(tm.lots(fed(1)), Some(t(7.0)));
        tm.evaluate(&mut out);
        assert_eq!(tm.time_of(fed(1)), Some(t(5.0)));
        assert_eq!(tm.lots(fed(1)), Some(t(7.0)));
    }

    #[test]
    fn test_zero_lookahead_successor() {
        let mut tm = manager(&[1, 2]);
        let mut out = Outbox::default();
        tm.enable_time_regulation(fed(1), Float64Interval::zero(), &mut out)
            .unwrap();
        tm.request(fed(1), AdvanceKind::TimeAdvanceRequest, t(3.0), &mut out)
            .unwrap();
        assert!(tm.lots(fed(1)).unwrap() > t(3.0));
    }

    #[test]
    fn test_request_errors() {
        let mut tm = manager(&[1]);
        let mut out = Outbox::default();
        tm.request(fed(1), AdvanceKind::TimeAdvanceRequest, t(1.0), &mut out)
            .unwrap();
        assert_eq!(
            tm.request(fed(1), AdvanceKind::TimeAdvanceRequest, t(2.0), &mut out),
            Err(RtiError::InTimeAdvancingState)
        );
        tm.evaluate(&mut out);
        assert!(matches!(
            tm.request(fed(1), AdvanceKind::TimeAdvanceRequest, t(1.0), &mut out),
            Err(RtiError::LogicalTimeAlreadyPassed(_))
        ));
        tm.request(fed(1), AdvanceKind::TimeAdvanceRequestAvailable, t(1.0), &mut out)
            .unwrap();
        assert!(matches!(
            tm.request(fed(1), AdvanceKind::TimeAdvanceRequest, t(f64::NAN), &mut out),
            Err(RtiError::InTimeAdvancingState)
        ));
    }

    #[test]
    fn test_next_message_grants_queued_timestamp() {
        let mut tm = manager(&[1, 2]);
        let mut out = Outbox::default();
        tm.enable_time_regulation(fed(1), Float64Interval::new(1.0), &mut out)
            .unwrap();
        tm.enable_time_constrained(fed(2)).unwrap();
        tm.evaluate(&mut out);
        assert!(tm.is_constrained(fed(2)));

        tm.request(fed(1), AdvanceKind::TimeAdvanceRequest, t(4.0), &mut out)
            .unwrap();
        tm.evaluate(&mut out);
        tm.deliver(fed(2), remove(5.5), Some(t(5.5)), &mut out);

        tm.request(fed(2), AdvanceKind::NextMessageRequest, t(10.0), &mut out)
            .unwrap();
        // GALT is 5.0: the message at 5.5 may still be preceded.
        assert!(tm.evaluate(&mut out).is_empty());

        tm.request(fed(1), AdvanceKind::TimeAdvanceRequest, t(6.0), &mut out)
            .unwrap();
        let grants = tm.evaluate(&mut out);
        assert!(grants.contains(&(fed(2), t(5.5))));
    }

    #[test]
    fn test_held_receive_order_released_on_request() {
        let mut tm = manager(&[1, 2]);
        let mut out = Outbox::default();
        tm.enable_time_constrained(fed(2)).unwrap();
        tm.evaluate(&mut out);
        out.items.clear();

        tm.deliver(fed(2), remove(0.0), None, &mut out);
        assert!(out.items.is_empty());
        tm.request(fed(2), AdvanceKind::TimeAdvanceRequest, t(1.0), &mut out)
            .unwrap();
        assert_eq!(out.items.len(), 1);
    }

    fn retractable_remove(time: f64, handle: MessageRetractionHandle) -> Callback<Time> {
        match remove(time) {
            Callback::RemoveObjectInstance {
                object,
                tag,
                sent_order,
                time,
                received_order,
                producer,
                ..
            } => Callback::RemoveObjectInstance {
                object,
                tag,
                sent_order,
                time,
                received_order,
                retraction: Some(handle),
                producer,
            },
            other => other,
        }
    }

    #[test]
    fn test_retract_queued_and_delivered_copies() {
        let mut tm = manager(&[1, 2, 3]);
        let mut out = Outbox::default();
        tm.enable_time_regulation(fed(1), Float64Interval::new(1.0), &mut out)
            .unwrap();
        tm.enable_time_constrained(fed(2)).unwrap();
        tm.evaluate(&mut out);
        out.items.clear();

        let handle = tm.issue_retraction(fed(1), t(3.0));
        tm.deliver(fed(2), retractable_remove(3.0, handle), Some(t(3.0)), &mut out);
        tm.deliver(fed(3), retractable_remove(3.0, handle), Some(t(3.0)), &mut out);
        // Only the unconstrained receiver got its copy.
        assert_eq!(out.items.len(), 1);
        out.items.clear();

        assert_eq!(
            tm.check_retractable(fed(2), handle),
            Err(RtiError::TimeRegulationIsNotEnabled)
        );
        tm.check_retractable(fed(1), handle).unwrap();
        tm.retract(handle, &mut out);
        assert!(tm.states[&fed(2)].tso.is_empty());
        assert_eq!(
            out.items,
            vec![(fed(3), Callback::RequestRetraction { retraction: handle })]
        );

        assert_eq!(
            tm.check_retractable(fed(1), handle),
            Err(RtiError::MessageCanNoLongerBeRetracted(handle))
        );
        let unknown = MessageRetractionHandle::new(99);
        assert_eq!(
            tm.check_retractable(fed(1), unknown),
            Err(RtiError::InvalidMessageRetractionHandle(unknown))
        );
    }

    #[test]
    fn test_retraction_expires_with_sender_grant() {
        let mut tm = manager(&[1, 2]);
        let mut out = Outbox::default();
        tm.enable_time_regulation(fed(1), Float64Interval::new(1.0), &mut out)
            .unwrap();
        tm.enable_time_constrained(fed(2)).unwrap();
        tm.evaluate(&mut out);

        let handle = tm.issue_retraction(fed(1), t(2.0));
        tm.deliver(fed(2), retractable_remove(2.0, handle), Some(t(2.0)), &mut out);
        tm.request(fed(1), AdvanceKind::TimeAdvanceRequest, t(2.0), &mut out)
            .unwrap();
        tm.evaluate(&mut out);
        assert!(!tm.is_retractable(handle));
        assert_eq!(
            tm.check_retractable(fed(1), handle),
            Err(RtiError::MessageCanNoLongerBeRetracted(handle))
        );
    }
}
