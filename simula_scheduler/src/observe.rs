// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The observer protocol every simulator reports its lifecycle through.
//!
//! A simulator owns an [`Observers`] set and fans a single terminal
//! [`Signal`] out to it when a run ends. Registration is identity-based: the
//! same observer allocation is never registered twice, and removing an
//! unregistered observer is a no-op.
//!
//! Notification is synchronous and runs over a snapshot of the set taken at
//! call time. An observer may add or remove observers (including itself)
//! from within its callback; such mutations affect later notifications, not
//! the fan-out in progress.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use smallvec::SmallVec;

use crate::simulator::Simulator;

/// The terminal outcome of a simulator run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Signal {
    /// The run completed naturally.
    Finish,
    /// The run was cancelled via `stop`.
    Stop,
}

/// Receives lifecycle signals from simulators it is registered on.
pub trait Observer {
    /// Called when `source` emits a terminal signal.
    ///
    /// `source` identifies the notifying simulator; compare it against a
    /// tracked simulator with [`same_simulator`] before acting, since an
    /// observer may be registered on (or receive late signals from) several
    /// simulators.
    fn simulator_updated(self: Rc<Self>, source: &Rc<dyn Simulator>, signal: Signal);
}

/// Reference identity over observer handles.
pub fn same_observer(a: &Rc<dyn Observer>, b: &Rc<dyn Observer>) -> bool {
    core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Reference identity over simulator handles.
pub fn same_simulator(a: &Rc<dyn Simulator>, b: &Rc<dyn Simulator>) -> bool {
    core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// An ordered, identity-deduplicated set of observers.
///
/// Most simulators have exactly one observer (the queue driving them), so
/// the set is inlined for the common case.
#[derive(Default)]
pub struct Observers {
    list: RefCell<SmallVec<[Rc<dyn Observer>; 2]>>,
}

impl Observers {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. No-op if the same allocation is already
    /// registered.
    pub fn add(&self, observer: Rc<dyn Observer>) {
        let mut list = self.list.borrow_mut();
        if list.iter().any(|existing| same_observer(existing, &observer)) {
            return;
        }
        list.push(observer);
    }

    /// Unregister an observer. No-op if it is not registered.
    pub fn remove(&self, observer: &Rc<dyn Observer>) {
        let mut list = self.list.borrow_mut();
        if let Some(index) = list.iter().position(|existing| same_observer(existing, observer)) {
            list.remove(index);
        }
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.list.borrow().len()
    }

    /// Whether no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.list.borrow().is_empty()
    }

    /// Synchronously deliver `signal` from `source` to every observer
    /// registered at call time, in registration order.
    pub fn notify(&self, source: &Rc<dyn Simulator>, signal: Signal) {
        // Snapshot so callbacks can re-enter `add`/`remove` without aliasing
        // the live list.
        let snapshot: SmallVec<[Rc<dyn Observer>; 2]> = self.list.borrow().clone();
        for observer in snapshot {
            observer.simulator_updated(source, signal);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
