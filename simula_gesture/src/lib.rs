// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simula Gesture: a fluent builder for simulated mouse gestures.
//!
//! ## Overview
//!
//! This crate sits on top of `simula_scheduler` and turns a chained gesture
//! description into a queue of delay and event-dispatch simulators:
//!
//! - [`Simulation`](simulation::Simulation) is the builder. Chaining calls
//!   like `move_to`, `enter`, `press`, and `click` append work to an
//!   internal queue; executing the simulation plays it back.
//! - [`DocumentModel`](document::DocumentModel) answers the geometry and
//!   containment queries the builder needs: hit testing, element bounds,
//!   and parent links.
//!
//! Interpolated moves dispatch a `mousemove` every 15 ms and, in automatic
//! mode, emit `mouseout`/`mouseover` pairs for every boundary the pointer
//! crosses. `enter` and `leave` walk the hierarchy one level at a time, so
//! a single call produces the full event sequence a real pointer would
//! generate on the way to its target.
//!
//! All document queries happen while the chain is being built; the executed
//! gesture is a fixed recording and replays identically when executed
//! again.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod document;
pub mod simulation;
