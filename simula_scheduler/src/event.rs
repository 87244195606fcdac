// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic event dispatch: the [`EventHost`] capability and the
//! [`EventSimulator`] primitive.
//!
//! The simulator core never touches native event plumbing. Building a
//! dispatchable event, installing listeners, and dispatching are delegated
//! to an injected [`EventHost`] strategy; the simulator only sequences those
//! calls and decides when the dispatch counts as complete.
//!
//! Completion is listener-based, not return-based: the host hands back an
//! identity token from [`EventHost::build`], and the run finishes only when
//! the installed listener reports *that* token firing. Hosts with
//! synchronous dispatch (the common case for DOM `dispatchEvent`) will
//! complete the run within [`Simulator::execute`]; nothing in the contract
//! relies on it.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;

use simula_events::{MouseEventDescriptor, MouseEventKind};

use crate::observe::Observers;
use crate::simulator::{AlreadyRunning, Simulator, SimulatorState};

/// Handle for an installed listener, used to remove it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ListenerId(pub u64);

/// Identity of one built native event instance.
///
/// Tokens are minted by [`EventHost::build`] and compared by the simulator
/// to tell its own dispatch apart from unrelated events of the same type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct DispatchToken(pub u64);

/// Native event plumbing, supplied by the embedding environment.
///
/// `K` is the element reference type. Listeners installed through
/// [`EventHost::add_listener`] observe events of the given kind reaching
/// `target` and receive the token of the event instance that fired.
pub trait EventHost<K> {
    /// Construct a native event from the descriptor, returning its identity
    /// token for a later [`EventHost::dispatch`].
    fn build(&self, event: &MouseEventDescriptor<K>) -> DispatchToken;

    /// Install a listener for events of `kind` on `target`.
    fn add_listener(
        &self,
        target: &K,
        kind: MouseEventKind,
        callback: Box<dyn Fn(DispatchToken)>,
    ) -> ListenerId;

    /// Remove a previously installed listener. No-op if already removed.
    fn remove_listener(&self, target: &K, kind: MouseEventKind, listener: ListenerId);

    /// Dispatch a built event on `target`. May fire listeners synchronously.
    fn dispatch(&self, target: &K, event: DispatchToken);
}

/// A simulator that dispatches one synthetic event and completes when its
/// own dispatch is observed firing.
///
/// `execute` builds the event, installs a one-shot listener, then
/// dispatches. Listener callbacks carrying any other token are ignored, so
/// late events from a previous stopped run or foreign events of the same
/// type never complete this run. `stop` removes a still-installed listener
/// so no stale callback can fire afterwards.
pub struct EventSimulator<K> {
    state: SimulatorState,
    target: K,
    event: MouseEventDescriptor<K>,
    host: Rc<dyn EventHost<K>>,
    pending: Cell<Option<(DispatchToken, ListenerId)>>,
}

impl<K: Clone + 'static> EventSimulator<K> {
    /// A simulator dispatching `event` on `target` through `host`.
    pub fn new(target: K, event: MouseEventDescriptor<K>, host: Rc<dyn EventHost<K>>) -> Self {
        Self {
            state: SimulatorState::new(),
            target,
            event,
            host,
            pending: Cell::new(None),
        }
    }

    /// The dispatch target.
    pub fn target(&self) -> &K {
        &self.target
    }

    /// The event this simulator dispatches.
    pub fn event(&self) -> &MouseEventDescriptor<K> {
        &self.event
    }

    fn handle_native(self: Rc<Self>, observed: DispatchToken) {
        let Some((expected, listener)) = self.pending.get() else {
            return;
        };
        if observed != expected {
            return;
        }
        self.pending.set(None);
        self.host.remove_listener(&self.target, self.event.kind, listener);
        let source = self.clone() as Rc<dyn Simulator>;
        self.state.finish(&source);
    }
}

impl<K: Clone + 'static> Simulator for EventSimulator<K> {
    fn execute(self: Rc<Self>) -> Result<(), AlreadyRunning> {
        self.state.begin()?;
        let token = self.host.build(&self.event);
        let weak = Rc::downgrade(&self);
        let listener = self.host.add_listener(
            &self.target,
            self.event.kind,
            Box::new(move |observed| {
                if let Some(simulator) = weak.upgrade() {
                    simulator.handle_native(observed);
                }
            }),
        );
        // Record the pending pair before dispatching: hosts may fire the
        // listener from within `dispatch`.
        self.pending.set(Some((token, listener)));
        self.host.dispatch(&self.target, token);
        Ok(())
    }

    fn stop(self: Rc<Self>) {
        if !self.state.is_running() {
            return;
        }
        if let Some((_, listener)) = self.pending.take() {
            self.host.remove_listener(&self.target, self.event.kind, listener);
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

impl<K: fmt::Debug> fmt::Debug for EventSimulator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSimulator")
            .field("target", &self.target)
            .field("kind", &self.event.kind)
            .field("running", &self.state.is_running())
            .finish_non_exhaustive()
    }
}
