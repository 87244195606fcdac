// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed delays: the [`Clock`] capability, a deterministic [`VirtualClock`],
//! and the [`TimeSimulator`] primitive built on them.
//!
//! The scheduler never reads wall time. All delays go through an injected
//! [`Clock`], so a test or demo can drive an entire simulation with
//! [`VirtualClock::advance`] and observe every intermediate state, while an
//! embedding host can back the same trait with its own timer facility.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::observe::Observers;
use crate::simulator::{AlreadyRunning, Simulator, SimulatorState};

/// Handle for a scheduled timer, used to cancel it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TimerId(pub u64);

/// A cancellable one-shot timer facility.
///
/// Implementations must not invoke `callback` from within [`Clock::schedule`]
/// itself, even for a zero delay; firing happens on a later turn of the
/// host's scheduler (or a later [`VirtualClock::advance`]). After
/// [`Clock::cancel`] returns, the callback is guaranteed never to run.
pub trait Clock {
    /// Schedule `callback` to run once after `delay_ms` milliseconds.
    fn schedule(&self, delay_ms: f64, callback: Box<dyn FnOnce()>) -> TimerId;

    /// Cancel a pending timer. No-op if it already fired or was cancelled.
    fn cancel(&self, timer: TimerId);
}

struct ScheduledTimer {
    id: TimerId,
    due: f64,
    callback: Box<dyn FnOnce()>,
}

/// A manually advanced clock for deterministic execution.
///
/// Timers fire in due-time order (insertion order among equal due times)
/// when [`VirtualClock::advance`] covers them. Callbacks run with the clock
/// already set to their due time, so work they schedule lands relative to
/// that instant; a queue of chained delays plays out within a single
/// sufficiently large `advance`.
pub struct VirtualClock {
    now: Cell<f64>,
    next_id: Cell<u64>,
    timers: RefCell<Vec<ScheduledTimer>>,
}

impl VirtualClock {
    /// A clock at time zero with no timers.
    pub fn new() -> Self {
        Self {
            now: Cell::new(0.0),
            next_id: Cell::new(0),
            timers: RefCell::new(Vec::new()),
        }
    }

    /// The current virtual time in milliseconds.
    pub fn now(&self) -> f64 {
        self.now.get()
    }

    /// Number of timers still pending.
    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Advance virtual time by `delta_ms`, firing every timer that comes due,
    /// including timers scheduled by the fired callbacks themselves.
    pub fn advance(&self, delta_ms: f64) {
        let target = self.now.get() + delta_ms;
        loop {
            // Re-scan each round: callbacks may schedule or cancel timers.
            let next = {
                let timers = self.timers.borrow();
                let mut earliest: Option<(usize, f64)> = None;
                for (index, timer) in timers.iter().enumerate() {
                    if timer.due <= target
                        && earliest.is_none_or(|(_, due)| timer.due < due)
                    {
                        earliest = Some((index, timer.due));
                    }
                }
                earliest.map(|(index, _)| index)
            };
            let Some(index) = next else { break };
            let timer = self.timers.borrow_mut().remove(index);
            if timer.due > self.now.get() {
                self.now.set(timer.due);
            }
            (timer.callback)();
        }
        self.now.set(target);
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for VirtualClock {
    fn schedule(&self, delay_ms: f64, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.timers.borrow_mut().push(ScheduledTimer {
            id,
            due: self.now.get() + delay_ms.max(0.0),
            callback,
        });
        id
    }

    fn cancel(&self, timer: TimerId) {
        self.timers.borrow_mut().retain(|pending| pending.id != timer);
    }
}

impl fmt::Debug for VirtualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualClock")
            .field("now", &self.now.get())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

/// A simulator that completes after a fixed delay.
///
/// `execute` schedules a timer on the injected clock; the timer's expiry
/// finishes the run. `stop` cancels the pending timer first, so a stopped
/// delay can never emit a late finish.
pub struct TimeSimulator {
    state: SimulatorState,
    duration_ms: f64,
    clock: Rc<dyn Clock>,
    pending: Cell<Option<TimerId>>,
}

impl TimeSimulator {
    /// A delay of `duration_ms` milliseconds on `clock`.
    pub fn new(duration_ms: f64, clock: Rc<dyn Clock>) -> Self {
        Self {
            state: SimulatorState::new(),
            duration_ms,
            clock,
            pending: Cell::new(None),
        }
    }

    /// The configured delay in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }
}

impl Simulator for TimeSimulator {
    fn execute(self: Rc<Self>) -> Result<(), AlreadyRunning> {
        self.state.begin()?;
        let weak = Rc::downgrade(&self);
        let id = self.clock.schedule(
            self.duration_ms,
            Box::new(move || {
                if let Some(simulator) = weak.upgrade() {
                    simulator.pending.set(None);
                    let source = simulator.clone() as Rc<dyn Simulator>;
                    simulator.state.finish(&source);
                }
            }),
        );
        self.pending.set(Some(id));
        Ok(())
    }

    fn stop(self: Rc<Self>) {
        if !self.state.is_running() {
            return;
        }
        if let Some(id) = self.pending.take() {
            self.clock.cancel(id);
        }
        let source = self.clone() as Rc<dyn Simulator>;
        self.state.halt(&source);
    }

    fn is_running(&self) -> bool {
        self.state.is_running()
    }

    fn observers(&self) -> &Observers {
        self.state.observers()
    }
}

impl fmt::Debug for TimeSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeSimulator")
            .field("duration_ms", &self.duration_ms)
            .field("running", &self.state.is_running())
            .finish_non_exhaustive()
    }
}
