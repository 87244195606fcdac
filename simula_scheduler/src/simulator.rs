// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The simulator capability and its shared run-state machine.
//!
//! A simulator is a unit of asynchronous work with a two-state lifecycle,
//! `idle → running → idle`, and a single terminal [`Signal`] per run. The
//! closed set of implementations is: `TimeSimulator`, `EventSimulator`,
//! `SimulatorQueue`, and `simula_gesture`'s `Simulation`. Each embeds a
//! [`SimulatorState`] and drives the shared transitions through it.
//!
//! Simulators are reference-counted and single-threaded; methods take
//! `Rc<Self>` receivers so an implementation can hand its own handle to
//! observers and host callbacks.

use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;

use crate::observe::{Observers, Signal};

/// Error returned by [`Simulator::execute`] on a simulator that is already
/// running. The in-flight run is unaffected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AlreadyRunning;

impl fmt::Display for AlreadyRunning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("simulator is already running")
    }
}

impl core::error::Error for AlreadyRunning {}

/// A unit of asynchronous simulation work.
///
/// `execute` starts a run; the simulator later returns to idle and emits
/// exactly one terminal signal, [`Signal::Finish`] on natural completion or
/// [`Signal::Stop`] on cancellation, never both. After either outcome the
/// simulator may be executed again from the beginning.
pub trait Simulator {
    /// Start a run.
    ///
    /// Fails with [`AlreadyRunning`] when called mid-run; the error is
    /// surfaced synchronously and the running state is not disturbed.
    fn execute(self: Rc<Self>) -> Result<(), AlreadyRunning>;

    /// Cancel a run in progress: abandon pending work (timer, listener,
    /// queued children) and emit one [`Signal::Stop`]. No-op when idle.
    fn stop(self: Rc<Self>);

    /// Whether a run is in progress.
    fn is_running(&self) -> bool;

    /// The observer set terminal signals fan out to.
    fn observers(&self) -> &Observers;

    /// Register an observer for terminal signals.
    fn add_observer(&self, observer: Rc<dyn crate::observe::Observer>) {
        self.observers().add(observer);
    }

    /// Unregister an observer.
    fn remove_observer(&self, observer: &Rc<dyn crate::observe::Observer>) {
        self.observers().remove(observer);
    }
}

/// The run flag and observer set shared by every simulator implementation.
///
/// `running` is true strictly between a successful [`SimulatorState::begin`]
/// and the matching [`SimulatorState::finish`] or [`SimulatorState::halt`].
#[derive(Debug, Default)]
pub struct SimulatorState {
    running: Cell<bool>,
    observers: Observers,
}

impl SimulatorState {
    /// A fresh idle state with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition idle → running.
    pub fn begin(&self) -> Result<(), AlreadyRunning> {
        if self.running.get() {
            return Err(AlreadyRunning);
        }
        self.running.set(true);
        Ok(())
    }

    /// Transition running → idle and emit [`Signal::Finish`] from `source`.
    ///
    /// Must only be called while running.
    pub fn finish(&self, source: &Rc<dyn Simulator>) {
        debug_assert!(self.running.get(), "finish called on an idle simulator");
        self.running.set(false);
        self.observers.notify(source, Signal::Finish);
    }

    /// If running, transition to idle and emit [`Signal::Stop`] from
    /// `source`. Returns whether a transition happened.
    pub fn halt(&self, source: &Rc<dyn Simulator>) -> bool {
        if !self.running.get() {
            return false;
        }
        self.running.set(false);
        self.observers.notify(source, Signal::Stop);
        true
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// The observer set.
    pub fn observers(&self) -> &Observers {
        &self.observers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::Observer;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    struct Recorder {
        seen: RefCell<Vec<Signal>>,
    }

    impl Recorder {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                seen: RefCell::new(Vec::new()),
            })
        }
    }

    impl Observer for Recorder {
        fn simulator_updated(self: Rc<Self>, _source: &Rc<dyn Simulator>, signal: Signal) {
            self.seen.borrow_mut().push(signal);
        }
    }

    /// A simulator finished by hand, standing in for real asynchronous work.
    struct Manual {
        state: SimulatorState,
    }

    impl Manual {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                state: SimulatorState::new(),
            })
        }

        fn finish_now(self: &Rc<Self>) {
            let source = self.clone() as Rc<dyn Simulator>;
            self.state.finish(&source);
        }
    }

    impl Simulator for Manual {
        fn execute(self: Rc<Self>) -> Result<(), AlreadyRunning> {
            self.state.begin()
        }
        fn stop(self: Rc<Self>) {
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

    #[test]
    fn execute_transitions_to_running() {
        let simulator = Manual::new();
        assert!(!simulator.is_running());
        simulator.clone().execute().unwrap();
        assert!(simulator.is_running());
    }

    #[test]
    fn execute_while_running_fails_without_side_effects() {
        let simulator = Manual::new();
        simulator.clone().execute().unwrap();
        assert_eq!(simulator.clone().execute(), Err(AlreadyRunning));
        // The in-flight run is untouched.
        assert!(simulator.is_running());
        simulator.finish_now();
        assert!(!simulator.is_running());
    }

    #[test]
    fn finish_emits_exactly_one_finish() {
        let simulator = Manual::new();
        let recorder = Recorder::new();
        simulator.add_observer(recorder.clone());
        simulator.clone().execute().unwrap();
        simulator.finish_now();
        assert_eq!(*recorder.seen.borrow(), [Signal::Finish]);
    }

    #[test]
    fn stop_when_idle_is_silent() {
        let simulator = Manual::new();
        let recorder = Recorder::new();
        simulator.add_observer(recorder.clone());
        simulator.clone().stop();
        assert!(recorder.seen.borrow().is_empty());
    }

    #[test]
    fn stop_when_running_emits_exactly_one_stop() {
        let simulator = Manual::new();
        let recorder = Recorder::new();
        simulator.add_observer(recorder.clone());
        simulator.clone().execute().unwrap();
        simulator.clone().stop();
        assert!(!simulator.is_running());
        // A second stop changes nothing.
        simulator.clone().stop();
        assert_eq!(*recorder.seen.borrow(), [Signal::Stop]);
    }

    #[test]
    fn rerun_after_finish_or_stop() {
        let simulator = Manual::new();
        let recorder = Recorder::new();
        simulator.add_observer(recorder.clone());

        simulator.clone().execute().unwrap();
        simulator.finish_now();
        simulator.clone().execute().unwrap();
        simulator.clone().stop();
        simulator.clone().execute().unwrap();
        simulator.finish_now();

        assert_eq!(
            *recorder.seen.borrow(),
            [Signal::Finish, Signal::Stop, Signal::Finish]
        );
    }
}
