// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A full mouse gesture over a small three-level layout.
//!
//! This example shows how to combine:
//! - `simula_gesture` for describing the gesture (`enter`, then `click`),
//! - a `DocumentModel` over plain layout data for hit tests and bounds,
//! - an `EventHost` that prints every dispatched event,
//! - `VirtualClock` to play the whole gesture deterministically.
//!
//! Run:
//! - `cargo run -p simula_demos --example gesture_walkthrough`

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kurbo::{Point, Rect};
use simula_events::{MouseEventDescriptor, MouseEventKind, MouseOptions};
use simula_gesture::document::DocumentModel;
use simula_gesture::simulation::Simulation;
use simula_scheduler::event::{DispatchToken, EventHost, ListenerId};
use simula_scheduler::simulator::Simulator;
use simula_scheduler::time::VirtualClock;

/// Deepest-first layout: a button inside a panel inside the page.
const LAYOUT: &[(&str, Rect, Option<&str>)] = &[
    ("button", Rect::new(250.0, 250.0, 450.0, 350.0), Some("panel")),
    ("panel", Rect::new(100.0, 100.0, 600.0, 500.0), Some("page")),
    ("page", Rect::new(0.0, 0.0, 800.0, 600.0), None),
];

struct Layout;

impl DocumentModel<&'static str> for Layout {
    fn element_at(&self, point: Point) -> Option<&'static str> {
        LAYOUT
            .iter()
            .find(|(_, rect, _)| rect.contains(point))
            .map(|(name, _, _)| *name)
    }

    fn bounds(&self, element: &&'static str) -> Rect {
        LAYOUT
            .iter()
            .find(|(name, _, _)| name == element)
            .map(|(_, rect, _)| *rect)
            .unwrap_or(Rect::ZERO)
    }

    fn parent(&self, element: &&'static str) -> Option<&'static str> {
        LAYOUT
            .iter()
            .find(|(name, _, _)| name == element)
            .and_then(|(_, _, parent)| *parent)
    }
}

/// Synchronous host printing each event with its virtual timestamp.
struct ConsoleHost {
    clock: Rc<VirtualClock>,
    next: Cell<u64>,
    built: RefCell<Vec<(DispatchToken, MouseEventDescriptor<&'static str>)>>,
    listeners: RefCell<
        Vec<(
            &'static str,
            MouseEventKind,
            ListenerId,
            Rc<dyn Fn(DispatchToken)>,
        )>,
    >,
    dispatched: Cell<usize>,
}

impl ConsoleHost {
    fn new(clock: Rc<VirtualClock>) -> Self {
        Self {
            clock,
            next: Cell::new(0),
            built: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            dispatched: Cell::new(0),
        }
    }
}

impl EventHost<&'static str> for ConsoleHost {
    fn build(&self, event: &MouseEventDescriptor<&'static str>) -> DispatchToken {
        let token = DispatchToken(self.next.get());
        self.next.set(token.0 + 1);
        self.built.borrow_mut().push((token, event.clone()));
        token
    }

    fn add_listener(
        &self,
        target: &&'static str,
        kind: MouseEventKind,
        callback: Box<dyn Fn(DispatchToken)>,
    ) -> ListenerId {
        let id = ListenerId(self.next.get());
        self.next.set(id.0 + 1);
        self.listeners
            .borrow_mut()
            .push((*target, kind, id, Rc::from(callback)));
        id
    }

    fn remove_listener(
        &self,
        _target: &&'static str,
        _kind: MouseEventKind,
        listener: ListenerId,
    ) {
        self.listeners.borrow_mut().retain(|(_, _, id, _)| *id != listener);
    }

    fn dispatch(&self, target: &&'static str, event: DispatchToken) {
        let descriptor = self
            .built
            .borrow()
            .iter()
            .find(|(token, _)| *token == event)
            .map(|(_, descriptor)| descriptor.clone())
            .expect("dispatch of a token that was never built");
        self.dispatched.set(self.dispatched.get() + 1);
        let related = descriptor
            .related_target
            .map_or(String::new(), |other| format!(" (related: {other})"));
        println!(
            "[{:8.1} ms] {:9} on {:8} at ({:5.1}, {:5.1}){}",
            self.clock.now(),
            descriptor.kind.dom_name(),
            target,
            descriptor.client.x,
            descriptor.client.y,
            related,
        );
        let callbacks: Vec<Rc<dyn Fn(DispatchToken)>> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(t, k, _, _)| *t == *target && *k == descriptor.kind)
            .map(|(_, _, _, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }
}

fn main() {
    let clock = Rc::new(VirtualClock::new());
    let host = Rc::new(ConsoleHost::new(clock.clone()));

    // Pointer starts near the top-left corner of the page.
    let simulation = Rc::new(Simulation::new(
        "page",
        Point::new(20.0, 20.0),
        Rc::new(Layout),
        host.clone(),
        clock.clone(),
    ));

    // Walk into the button, then click it. Every boundary on the way emits
    // its own mouseover, and the move legs interpolate at 15 ms per step.
    simulation
        .enter(&"button", MouseOptions::default())
        .click(None, MouseOptions::default());

    println!(
        "chained gesture: {:?} over {:?}",
        simulation.position(),
        simulation.element()
    );

    simulation
        .clone()
        .execute()
        .expect("simulation is idle");
    clock.advance(10_000.0);

    println!(
        "done after {} events; pointer over {:?} at {:?}",
        host.dispatched.get(),
        simulation.element(),
        simulation.position(),
    );
    assert!(!simulation.is_running());
}
