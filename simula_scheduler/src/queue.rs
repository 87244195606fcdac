// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strictly sequential composition of simulators.
//!
//! A [`SimulatorQueue`] is itself a simulator: executing it runs its
//! children one after another, each driven to its own terminal signal before
//! the next starts, and emits a single terminal signal for the whole
//! sequence. The queue subscribes to the child it is currently running and
//! advances on that child's `Finish`. Signals from anything else are
//! ignored, including late notifications from a previously stopped run and
//! the `Stop` of a child the queue itself just cancelled.
//!
//! Children are reference-counted and may be shared with the code that built
//! the queue; they can also be appended with [`SimulatorQueue::push`] while
//! the queue is running, in which case the current run picks them up (the
//! remaining length is re-checked at every child finish).

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::observe::{Observer, Observers, Signal, same_simulator};
use crate::simulator::{AlreadyRunning, Simulator, SimulatorState};

/// Runs an ordered sequence of simulators one after another.
pub struct SimulatorQueue {
    state: SimulatorState,
    simulators: RefCell<Vec<Rc<dyn Simulator>>>,
    /// Index of the child currently running; `None` while idle.
    current: Cell<Option<usize>>,
}

impl SimulatorQueue {
    /// A queue over `simulators`, in order. The sequence may be empty; an
    /// empty queue finishes immediately on execute.
    pub fn new(simulators: Vec<Rc<dyn Simulator>>) -> Self {
        Self {
            state: SimulatorState::new(),
            simulators: RefCell::new(simulators),
            current: Cell::new(None),
        }
    }

    /// Append a child. Allowed while running; the in-flight run will reach
    /// it in order.
    pub fn push(&self, simulator: Rc<dyn Simulator>) {
        self.simulators.borrow_mut().push(simulator);
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.simulators.borrow().len()
    }

    /// Whether the queue has no children.
    pub fn is_empty(&self) -> bool {
        self.simulators.borrow().is_empty()
    }

    /// Index of the currently running child, `None` while idle.
    pub fn current_index(&self) -> Option<usize> {
        self.current.get()
    }

    /// Subscribe to and start the next child.
    fn proceed(this: &Rc<Self>) {
        let index = this.current.get().map_or(0, |current| current + 1);
        this.current.set(Some(index));
        let child = this.simulators.borrow()[index].clone();
        child.add_observer(this.clone() as Rc<dyn Observer>);
        // May complete synchronously and re-enter `simulator_updated`.
        let started = child.execute();
        debug_assert!(started.is_ok(), "queue child was already running");
    }

    fn complete(this: &Rc<Self>) {
        this.current.set(None);
        let source = this.clone() as Rc<dyn Simulator>;
        this.state.finish(&source);
    }
}

impl Observer for SimulatorQueue {
    fn simulator_updated(self: Rc<Self>, source: &Rc<dyn Simulator>, signal: Signal) {
        if signal != Signal::Finish {
            return;
        }
        let Some(index) = self.current.get() else {
            return;
        };
        let (child, remaining) = {
            let simulators = self.simulators.borrow();
            let Some(child) = simulators.get(index) else {
                return;
            };
            (child.clone(), simulators.len() - index - 1)
        };
        if !same_simulator(source, &child) {
            return;
        }
        let observer = self.clone() as Rc<dyn Observer>;
        child.remove_observer(&observer);
        if remaining > 0 {
            Self::proceed(&self);
        } else {
            Self::complete(&self);
        }
    }
}

impl Simulator for SimulatorQueue {
    fn execute(self: Rc<Self>) -> Result<(), AlreadyRunning> {
        self.state.begin()?;
        let empty = self.simulators.borrow().is_empty();
        if empty {
            Self::complete(&self);
        } else {
            Self::proceed(&self);
        }
        Ok(())
    }

    fn stop(self: Rc<Self>) {
        if !self.state.is_running() {
            return;
        }
        if let Some(index) = self.current.get() {
            let child = self.simulators.borrow()[index].clone();
            // Unsubscribe first: the child's own stop signal is not ours to
            // forward, and a lingering subscription would keep the child and
            // queue alive in a cycle.
            let this = self.clone() as Rc<dyn Observer>;
            child.remove_observer(&this);
            child.stop();
        }
        self.current.set(None);
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

impl fmt::Debug for SimulatorQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatorQueue")
            .field("len", &self.len())
            .field("current", &self.current.get())
            .field("running", &self.state.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{TimeSimulator, VirtualClock};
    use alloc::vec;

    /// A child finished by hand, for step-by-step queue control.
    struct Manual {
        state: SimulatorState,
        executions: Cell<usize>,
    }

    impl Manual {
        fn new() -> Rc<Self> {
            Rc::new(Self {
                state: SimulatorState::new(),
                executions: Cell::new(0),
            })
        }

        fn finish_now(self: &Rc<Self>) {
            let source = self.clone() as Rc<dyn Simulator>;
            self.state.finish(&source);
        }
    }

    impl Simulator for Manual {
        fn execute(self: Rc<Self>) -> Result<(), AlreadyRunning> {
            self.state.begin()?;
            self.executions.set(self.executions.get() + 1);
            Ok(())
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

    /// Observer that records labelled terminal signals into a shared log.
    struct Tap {
        label: &'static str,
        log: Rc<RefCell<Vec<(&'static str, Signal)>>>,
    }

    impl Tap {
        fn on(
            simulator: &Rc<impl Simulator>,
            label: &'static str,
            log: &Rc<RefCell<Vec<(&'static str, Signal)>>>,
        ) {
            simulator.add_observer(Rc::new(Self {
                label,
                log: log.clone(),
            }));
        }
    }

    impl Observer for Tap {
        fn simulator_updated(self: Rc<Self>, _source: &Rc<dyn Simulator>, signal: Signal) {
            self.log.borrow_mut().push((self.label, signal));
        }
    }

    fn shared_log() -> Rc<RefCell<Vec<(&'static str, Signal)>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn empty_queue_finishes_immediately() {
        let queue = Rc::new(SimulatorQueue::new(vec![]));
        let log = shared_log();
        Tap::on(&queue, "queue", &log);

        queue.clone().execute().unwrap();

        assert!(!queue.is_running());
        assert_eq!(queue.current_index(), None);
        assert_eq!(*log.borrow(), [("queue", Signal::Finish)]);
    }

    #[test]
    fn children_run_strictly_in_order() {
        let a = Manual::new();
        let b = Manual::new();
        let c = Manual::new();
        let queue = Rc::new(SimulatorQueue::new(vec![
            a.clone() as Rc<dyn Simulator>,
            b.clone() as Rc<dyn Simulator>,
            c.clone() as Rc<dyn Simulator>,
        ]));
        let log = shared_log();
        Tap::on(&a, "a", &log);
        Tap::on(&b, "b", &log);
        Tap::on(&c, "c", &log);
        Tap::on(&queue, "queue", &log);

        queue.clone().execute().unwrap();
        assert!(a.is_running());
        assert!(!b.is_running() && !c.is_running());
        assert_eq!(queue.current_index(), Some(0));

        a.finish_now();
        assert!(b.is_running());
        assert!(!a.is_running() && !c.is_running());
        assert_eq!(queue.current_index(), Some(1));

        b.finish_now();
        assert!(c.is_running());
        assert_eq!(queue.current_index(), Some(2));

        c.finish_now();
        assert!(!queue.is_running());
        assert_eq!(queue.current_index(), None);

        assert_eq!(
            *log.borrow(),
            [
                ("a", Signal::Finish),
                ("b", Signal::Finish),
                ("c", Signal::Finish),
                ("queue", Signal::Finish),
            ]
        );
    }

    #[test]
    fn rerun_replays_the_full_sequence() {
        let a = Manual::new();
        let b = Manual::new();
        let queue = Rc::new(SimulatorQueue::new(vec![
            a.clone() as Rc<dyn Simulator>,
            b.clone() as Rc<dyn Simulator>,
        ]));
        let log = shared_log();
        Tap::on(&queue, "queue", &log);

        queue.clone().execute().unwrap();
        a.finish_now();
        b.finish_now();

        queue.clone().execute().unwrap();
        assert_eq!(queue.current_index(), Some(0));
        a.finish_now();
        b.finish_now();

        assert_eq!(a.executions.get(), 2);
        assert_eq!(b.executions.get(), 2);
        assert_eq!(
            *log.borrow(),
            [("queue", Signal::Finish), ("queue", Signal::Finish)]
        );
    }

    #[test]
    fn stop_cancels_the_active_child_and_skips_the_rest() {
        let clock = Rc::new(VirtualClock::new());
        let a = Rc::new(TimeSimulator::new(10.0, clock.clone()));
        let b = Rc::new(TimeSimulator::new(10.0, clock.clone()));
        let c = Rc::new(TimeSimulator::new(10.0, clock.clone()));
        let queue = Rc::new(SimulatorQueue::new(vec![
            a.clone() as Rc<dyn Simulator>,
            b.clone() as Rc<dyn Simulator>,
            c.clone() as Rc<dyn Simulator>,
        ]));
        let log = shared_log();
        Tap::on(&c, "c", &log);
        Tap::on(&queue, "queue", &log);

        queue.clone().execute().unwrap();
        clock.advance(15.0); // a finished, b mid-flight
        assert_eq!(queue.current_index(), Some(1));

        queue.clone().stop();
        assert!(!queue.is_running());
        assert!(!b.is_running());
        assert_eq!(queue.current_index(), None);

        // b's timer is gone; nothing more can fire.
        assert_eq!(clock.pending(), 0);
        clock.advance(1000.0);
        assert_eq!(*log.borrow(), [("queue", Signal::Stop)]);
        // c never ran.
        assert!(!c.is_running());
    }

    #[test]
    fn stopped_queue_reruns_from_the_start() {
        let a = Manual::new();
        let b = Manual::new();
        let queue = Rc::new(SimulatorQueue::new(vec![
            a.clone() as Rc<dyn Simulator>,
            b.clone() as Rc<dyn Simulator>,
        ]));

        queue.clone().execute().unwrap();
        a.finish_now();
        queue.clone().stop();

        queue.clone().execute().unwrap();
        assert_eq!(queue.current_index(), Some(0));
        assert!(a.is_running());
        assert_eq!(a.executions.get(), 2);
    }

    #[test]
    fn unrelated_notifications_do_not_advance_the_queue() {
        let a = Manual::new();
        let b = Manual::new();
        let queue = Rc::new(SimulatorQueue::new(vec![
            a.clone() as Rc<dyn Simulator>,
            b.clone() as Rc<dyn Simulator>,
        ]));
        queue.clone().execute().unwrap();

        // A finish from a simulator the queue is not tracking.
        let foreign = Manual::new();
        foreign.clone().execute().unwrap();
        let observer = queue.clone() as Rc<dyn Observer>;
        observer.simulator_updated(&(foreign.clone() as Rc<dyn Simulator>), Signal::Finish);
        assert_eq!(queue.current_index(), Some(0));
        assert!(a.is_running());

        // A stop signal from the tracked child is ignored too; the queue
        // only advances on Finish.
        let observer = queue.clone() as Rc<dyn Observer>;
        observer.simulator_updated(&(a.clone() as Rc<dyn Simulator>), Signal::Stop);
        assert_eq!(queue.current_index(), Some(0));
        assert!(queue.is_running());
    }

    #[test]
    fn execute_while_running_fails_and_leaves_the_run_alone() {
        let a = Manual::new();
        let queue = Rc::new(SimulatorQueue::new(vec![a.clone() as Rc<dyn Simulator>]));
        queue.clone().execute().unwrap();
        assert_eq!(queue.clone().execute(), Err(AlreadyRunning));
        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(a.executions.get(), 1);

        a.finish_now();
        assert!(!queue.is_running());
    }

    #[test]
    fn children_pushed_mid_run_are_reached() {
        let a = Manual::new();
        let queue = Rc::new(SimulatorQueue::new(vec![a.clone() as Rc<dyn Simulator>]));
        queue.clone().execute().unwrap();

        let b = Manual::new();
        queue.push(b.clone() as Rc<dyn Simulator>);

        a.finish_now();
        assert!(b.is_running());
        assert!(queue.is_running());
        b.finish_now();
        assert!(!queue.is_running());
    }

    #[test]
    fn queue_of_delays_plays_out_on_the_clock() {
        let clock = Rc::new(VirtualClock::new());
        let queue = Rc::new(SimulatorQueue::new(vec![
            Rc::new(TimeSimulator::new(20.0, clock.clone())) as Rc<dyn Simulator>,
            Rc::new(TimeSimulator::new(30.0, clock.clone())) as Rc<dyn Simulator>,
        ]));
        let log = shared_log();
        Tap::on(&queue, "queue", &log);

        queue.clone().execute().unwrap();
        clock.advance(49.0);
        assert!(queue.is_running());

        clock.advance(1.0);
        assert!(!queue.is_running());
        assert_eq!(*log.borrow(), [("queue", Signal::Finish)]);
    }
}
