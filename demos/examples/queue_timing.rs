// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scheduler primitives without the gesture layer.
//!
//! Runs a queue of timed delays on a virtual clock, observing each child
//! and the queue itself, then stops a second run halfway through to show
//! cancellation.
//!
//! Run:
//! - `cargo run -p simula_demos --example queue_timing`

use std::cell::RefCell;
use std::rc::Rc;

use simula_scheduler::observe::{Observer, Signal};
use simula_scheduler::queue::SimulatorQueue;
use simula_scheduler::simulator::Simulator;
use simula_scheduler::time::{TimeSimulator, VirtualClock};

/// Prints and collects every signal it sees, labelled per simulator.
struct Tap {
    label: &'static str,
    clock: Rc<VirtualClock>,
    log: Rc<RefCell<Vec<(&'static str, Signal)>>>,
}

impl Observer for Tap {
    fn simulator_updated(self: Rc<Self>, _source: &Rc<dyn Simulator>, signal: Signal) {
        println!("[{:6.1} ms] {} -> {:?}", self.clock.now(), self.label, signal);
        self.log.borrow_mut().push((self.label, signal));
    }
}

fn main() {
    let clock = Rc::new(VirtualClock::new());
    let log = Rc::new(RefCell::new(Vec::new()));

    let delays = [("short", 20.0), ("medium", 50.0), ("long", 100.0)];
    let mut children: Vec<Rc<dyn Simulator>> = Vec::new();
    for (label, duration) in delays {
        let child = Rc::new(TimeSimulator::new(duration, clock.clone()));
        child.add_observer(Rc::new(Tap {
            label,
            clock: clock.clone(),
            log: log.clone(),
        }));
        children.push(child);
    }

    let queue = Rc::new(SimulatorQueue::new(children));
    queue.add_observer(Rc::new(Tap {
        label: "queue",
        clock: clock.clone(),
        log: log.clone(),
    }));

    // First run: the three delays play back to back, 170 ms in total.
    queue.clone().execute().expect("queue is idle");
    clock.advance(200.0);
    assert!(!queue.is_running());

    // Second run: cancel while the medium delay is in flight. The long
    // delay never starts and the clock holds no stale timers.
    queue.clone().execute().expect("queue is idle");
    clock.advance(40.0);
    queue.clone().stop();
    assert_eq!(clock.pending(), 0);

    let finishes = log
        .borrow()
        .iter()
        .filter(|(_, signal)| *signal == Signal::Finish)
        .count();
    println!("observed {} finishes across both runs", finishes);
}
