// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simula Scheduler: single-threaded orchestration of simulated input.
//!
//! ## Overview
//!
//! This crate provides the execution side of the simula input simulator: a
//! small family of [`Simulator`](simulator::Simulator) implementations, each
//! a unit of asynchronous work with an `idle → running → idle` lifecycle and
//! exactly one terminal signal per run.
//!
//! - [`TimeSimulator`](time::TimeSimulator) finishes after a fixed delay on
//!   an injected [`Clock`](time::Clock).
//! - [`EventSimulator`](event::EventSimulator) dispatches one synthetic
//!   mouse event through an [`EventHost`](event::EventHost) and finishes
//!   when the host observes it.
//! - [`SimulatorQueue`](queue::SimulatorQueue) runs children strictly in
//!   sequence and is itself a simulator, so sequences compose.
//!
//! Completion is reported through the [`Observer`](observe::Observer)
//! protocol: a simulator fans its terminal [`Signal`](observe::Signal) out
//! to registered observers synchronously, and the queue advances by
//! observing the child it is currently running.
//!
//! ## Capabilities
//!
//! The scheduler performs no I/O of its own. Timing goes through the
//! [`Clock`](time::Clock) trait and event delivery through the
//! [`EventHost`](event::EventHost) trait; both are injected as `Rc<dyn _>`
//! handles. The bundled [`VirtualClock`](time::VirtualClock) advances time
//! manually, which makes whole simulations deterministic under test.
//!
//! ```
//! use std::rc::Rc;
//!
//! use simula_scheduler::queue::SimulatorQueue;
//! use simula_scheduler::simulator::Simulator;
//! use simula_scheduler::time::{TimeSimulator, VirtualClock};
//!
//! let clock = Rc::new(VirtualClock::new());
//! let queue = Rc::new(SimulatorQueue::new(vec![
//!     Rc::new(TimeSimulator::new(20.0, clock.clone())) as Rc<dyn Simulator>,
//!     Rc::new(TimeSimulator::new(30.0, clock.clone())) as Rc<dyn Simulator>,
//! ]));
//! queue.clone().execute().unwrap();
//! clock.advance(50.0);
//! assert!(!queue.is_running());
//! ```
//!
//! Everything here is single-threaded: simulators are `Rc`-shared, use
//! interior mutability, and are not `Send`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod event;
pub mod observe;
pub mod queue;
pub mod simulator;
pub mod time;
