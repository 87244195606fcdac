// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The fluent gesture builder.
//!
//! A [`Simulation`] is chained first and executed second. Every chaining
//! call appends simulators to an internal queue and updates the builder's
//! idea of where the pointer is and which element it is over; executing the
//! simulation then plays the queue back. Hit tests, bounds reads, and
//! parent walks all happen at chain time, so the described gesture is fixed
//! once the chain is built and replays identically on re-execution.
//!
//! Interpolated moves dispatch one `mousemove` per 15 ms slice of the
//! requested duration, plus a shorter final slice when the duration is not
//! a multiple of 15. With automatic crossing enabled, each slice is hit
//! tested and `mouseout`/`mouseover` pairs are emitted per the DOM boundary
//! rules: moving into a descendant emits only `mouseover`, moving out to an
//! ancestor emits only `mouseout`, and moving between unrelated elements
//! emits both.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use kurbo::{Point, Vec2};

use simula_events::{MouseEventKind, MouseOptions};
use simula_scheduler::event::{EventHost, EventSimulator};
use simula_scheduler::observe::{Observer, Observers, Signal, same_simulator};
use simula_scheduler::queue::SimulatorQueue;
use simula_scheduler::simulator::{AlreadyRunning, Simulator, SimulatorState};
use simula_scheduler::time::{Clock, TimeSimulator};

use crate::document::DocumentModel;

/// Interval between interpolated `mousemove` dispatches, in milliseconds.
const MOVE_STEP_MS: f64 = 15.0;

/// Pause inserted by [`Simulation::wait`], in milliseconds.
const DEFAULT_WAIT_MS: f64 = 50.0;

/// Pause between the legs of a [`Simulation::click`], in milliseconds.
const CLICK_PAUSE_MS: f64 = 5.0;

/// A chainable mouse gesture over an element hierarchy.
///
/// The builder tracks an anchor element and an absolute pointer position.
/// Both reflect the state *at the end of the chain built so far*; gesture
/// methods read and advance them, so calls compose the way a real pointer
/// would move. Without an explicit duration, interpolated moves travel one
/// pixel per millisecond.
///
/// `Simulation` is itself a [`Simulator`]: `execute` plays the chained
/// queue, `stop` cancels whatever part of it is in flight, and one terminal
/// signal is emitted per run.
pub struct Simulation<K> {
    state: SimulatorState,
    queue: Rc<SimulatorQueue>,
    document: Rc<dyn DocumentModel<K>>,
    host: Rc<dyn EventHost<K>>,
    clock: Rc<dyn Clock>,
    element: RefCell<K>,
    position: Cell<Point>,
}

impl<K: Clone + PartialEq + 'static> Simulation<K> {
    /// A simulation with the pointer over `element`, at `position` relative
    /// to that element's bounds.
    pub fn new(
        element: K,
        position: Point,
        document: Rc<dyn DocumentModel<K>>,
        host: Rc<dyn EventHost<K>>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let origin = document.bounds(&element).origin();
        Self {
            state: SimulatorState::new(),
            queue: Rc::new(SimulatorQueue::new(Vec::new())),
            document,
            host,
            clock,
            element: RefCell::new(element),
            position: Cell::new(origin + position.to_vec2()),
        }
    }

    /// The element the pointer is over at the end of the chain so far.
    pub fn element(&self) -> K {
        self.element.borrow().clone()
    }

    /// The absolute pointer position at the end of the chain so far.
    pub fn position(&self) -> Point {
        self.position.get()
    }

    fn set_anchor(&self, element: K, position: Point) {
        *self.element.borrow_mut() = element;
        self.position.set(position);
    }

    fn push_event(&self, target: K, kind: MouseEventKind, options: MouseOptions<K>) {
        let event = options.resolve(kind);
        self.queue
            .push(Rc::new(EventSimulator::new(target, event, self.host.clone())));
    }

    /// Options layer carrying the pointer position computed at chain time.
    fn at(&self, client: Point) -> MouseOptions<K> {
        MouseOptions {
            client: Some(client),
            ..MouseOptions::default()
        }
    }

    /// Append a pause of the default duration (50 ms).
    pub fn wait(&self) -> &Self {
        self.wait_for(DEFAULT_WAIT_MS)
    }

    /// Append a pause of `duration_ms` milliseconds.
    pub fn wait_for(&self, duration_ms: f64) -> &Self {
        self.queue
            .push(Rc::new(TimeSimulator::new(duration_ms, self.clock.clone())));
        self
    }

    /// Append exactly one `mousemove` on `element` (default: the anchor).
    ///
    /// `mousemove` events are never cancelable; a `cancelable` option is
    /// overridden.
    pub fn mousemove(&self, element: Option<&K>, options: MouseOptions<K>) -> &Self {
        let target = element.cloned().unwrap_or_else(|| self.element());
        self.push_event(target, MouseEventKind::Move, options);
        self
    }

    /// Append exactly one `mouseover` on `element` (default: the anchor).
    pub fn mouseover(&self, element: Option<&K>, options: MouseOptions<K>) -> &Self {
        let target = element.cloned().unwrap_or_else(|| self.element());
        self.push_event(target, MouseEventKind::Over, options);
        self
    }

    /// Append exactly one `mouseout` on `element` (default: the anchor).
    pub fn mouseout(&self, element: Option<&K>, options: MouseOptions<K>) -> &Self {
        let target = element.cloned().unwrap_or_else(|| self.element());
        self.push_event(target, MouseEventKind::Out, options);
        self
    }

    /// Append exactly one `mousedown` on `element` (default: the anchor).
    pub fn mousedown(&self, element: Option<&K>, options: MouseOptions<K>) -> &Self {
        let target = element.cloned().unwrap_or_else(|| self.element());
        self.push_event(target, MouseEventKind::Down, options);
        self
    }

    /// Append exactly one `mouseup` on `element` (default: the anchor).
    pub fn mouseup(&self, element: Option<&K>, options: MouseOptions<K>) -> &Self {
        let target = element.cloned().unwrap_or_else(|| self.element());
        self.push_event(target, MouseEventKind::Up, options);
        self
    }

    /// Append exactly one `click` event on `element` (default: the anchor).
    ///
    /// This is the raw event; see [`Simulation::click`] for the full
    /// press/release gesture.
    pub fn mouseclick(&self, element: Option<&K>, options: MouseOptions<K>) -> &Self {
        let target = element.cloned().unwrap_or_else(|| self.element());
        self.push_event(target, MouseEventKind::Click, options);
        self
    }

    /// Move the pointer to `position`, relative to the current anchor
    /// element, dispatching a `mousemove` every 15 ms.
    ///
    /// Without `duration_ms`, or with a non-positive one, the move takes
    /// one millisecond per pixel of distance. The duration is cut into
    /// 15 ms slices, each advancing the pointer proportionally; a duration
    /// that is not a multiple of 15 gets a shorter final slice that lands
    /// exactly on the target.
    ///
    /// With `auto`, every slice is hit tested and boundary crossings emit
    /// `mouseout`/`mouseover` (with `related_target` set to the other side)
    /// and re-anchor the simulation on the element under the pointer. A
    /// slice whose point is over no element emits no boundary events and
    /// leaves the anchor as it was.
    pub fn move_to(
        &self,
        position: Point,
        duration_ms: Option<f64>,
        options: MouseOptions<K>,
        auto: bool,
    ) -> &Self {
        let start = self.position.get();
        let origin = self.document.bounds(&self.element()).origin();
        let target = origin + position.to_vec2();
        let delta = target - start;
        let duration = duration_ms
            .filter(|requested| *requested > 0.0)
            .unwrap_or_else(|| delta.hypot());

        let mut slices: Vec<(f64, Vec2)> = Vec::new();
        let mut time = MOVE_STEP_MS;
        while time <= duration {
            slices.push((MOVE_STEP_MS, delta * (time / duration)));
            time += MOVE_STEP_MS;
        }
        let remainder = duration % MOVE_STEP_MS;
        if remainder != 0.0 {
            slices.push((remainder, delta));
        }

        for (pause, travelled) in slices {
            let point = start + travelled;
            self.wait_for(pause);
            if auto {
                if let Some(under) = self.document.element_at(point) {
                    let anchor = self.element();
                    if under != anchor {
                        let to_descendant = self.document.is_ancestor_of(&anchor, &under);
                        let to_ancestor = self.document.is_ancestor_of(&under, &anchor);
                        if to_ancestor || !to_descendant {
                            self.mouseout(
                                Some(&anchor),
                                options.clone().or(MouseOptions {
                                    related_target: Some(under.clone()),
                                    ..self.at(point)
                                }),
                            );
                        }
                        if to_descendant || !to_ancestor {
                            self.mouseover(
                                Some(&under),
                                options.clone().or(MouseOptions {
                                    related_target: Some(anchor.clone()),
                                    ..self.at(point)
                                }),
                            );
                        }
                        *self.element.borrow_mut() = under;
                    }
                }
            }
            let anchor = self.element();
            self.mousemove(Some(&anchor), options.clone().or(self.at(point)));
            self.position.set(point);
        }
        self
    }

    /// Move the pointer over `element`, crossing every boundary in between.
    ///
    /// Descends one hierarchy level at a time: move to the center of the
    /// next element down, dispatch `mouseover` on it, re-anchor, repeat.
    /// When `element` is not inside the current anchor, the anchor is left
    /// first and the descent restarts from the common side. The caller's
    /// options apply to the first crossing only.
    pub fn enter(&self, element: &K, options: MouseOptions<K>) -> &Self {
        let anchor = self.element();
        if self.document.is_ancestor_of(&anchor, element) {
            // Child of the anchor on the path down to `element`.
            let mut to_enter = element.clone();
            while let Some(parent) = self.document.parent(&to_enter) {
                if parent == anchor {
                    break;
                }
                to_enter = parent;
            }
            let center = self.document.bounds(&to_enter).center();
            let origin = self.document.bounds(&anchor).origin();
            self.move_to(
                (center - origin).to_point(),
                None,
                MouseOptions::default(),
                false,
            );
            self.mouseover(
                Some(&to_enter),
                options.or(MouseOptions {
                    related_target: Some(anchor),
                    ..self.at(center)
                }),
            );
            self.set_anchor(to_enter.clone(), center);
            if to_enter != *element {
                self.enter(element, MouseOptions::default());
            }
        } else {
            self.leave(None, MouseOptions::default());
            // A root anchor cannot be left; bail instead of recursing in
            // place when the hierarchies are disjoint.
            if self.element() != anchor {
                self.enter(element, MouseOptions::default());
            }
        }
        self
    }

    /// Move the pointer out of `element` (default: the anchor), crossing
    /// every boundary on the way to that element's parent.
    ///
    /// Climbs one hierarchy level at a time: move to the center of the
    /// anchor's parent, dispatch `mouseout` on the anchor, re-anchor on the
    /// parent, repeat until the pointer sits in `element`'s parent. When
    /// the pointer is not inside `element`, it enters it first. The
    /// caller's options apply to the first crossing only. Leaving a
    /// hierarchy root is a no-op.
    pub fn leave(&self, element: Option<&K>, options: MouseOptions<K>) -> &Self {
        let anchor = self.element();
        let target = element.cloned().unwrap_or_else(|| anchor.clone());
        if target == anchor || self.document.is_ancestor_of(&target, &anchor) {
            let Some(parent) = self.document.parent(&anchor) else {
                return self;
            };
            let center = self.document.bounds(&parent).center();
            let origin = self.document.bounds(&anchor).origin();
            self.move_to(
                (center - origin).to_point(),
                None,
                MouseOptions::default(),
                false,
            );
            self.mouseout(
                Some(&anchor),
                options.or(MouseOptions {
                    related_target: Some(parent.clone()),
                    ..self.at(center)
                }),
            );
            self.set_anchor(parent.clone(), center);
            if self.document.parent(&target).as_ref() != Some(&parent) {
                self.leave(Some(&target), MouseOptions::default());
            }
        } else {
            self.enter(&target, MouseOptions::default());
            if self.element() != anchor {
                self.leave(Some(&target), MouseOptions::default());
            }
        }
        self
    }

    /// Press the primary button over `element` (default: the anchor),
    /// entering it first when the pointer is elsewhere.
    pub fn press(&self, element: Option<&K>, options: MouseOptions<K>) -> &Self {
        let target = element.cloned().unwrap_or_else(|| self.element());
        if self.element() != target {
            self.enter(&target, MouseOptions::default());
        }
        let anchor = self.element();
        self.mousedown(Some(&anchor), options.or(self.at(self.position.get())));
        self
    }

    /// Release the primary button over `element` (default: the anchor),
    /// entering it first when the pointer is elsewhere.
    pub fn release(&self, element: Option<&K>, options: MouseOptions<K>) -> &Self {
        let target = element.cloned().unwrap_or_else(|| self.element());
        if self.element() != target {
            self.enter(&target, MouseOptions::default());
        }
        let anchor = self.element();
        self.mouseup(Some(&anchor), options.or(self.at(self.position.get())));
        self
    }

    /// Click `element` (default: the anchor): press, a 5 ms pause, release,
    /// another 5 ms pause, then the `click` event itself. The caller's
    /// options apply to the final `click` event only.
    pub fn click(&self, element: Option<&K>, options: MouseOptions<K>) -> &Self {
        let target = element.cloned().unwrap_or_else(|| self.element());
        self.press(Some(&target), MouseOptions::default());
        self.wait_for(CLICK_PAUSE_MS);
        self.release(None, MouseOptions::default());
        self.wait_for(CLICK_PAUSE_MS);
        let anchor = self.element();
        self.mouseclick(Some(&anchor), options.or(self.at(self.position.get())));
        self
    }
}

impl<K: Clone + PartialEq + 'static> Observer for Simulation<K> {
    fn simulator_updated(self: Rc<Self>, source: &Rc<dyn Simulator>, signal: Signal) {
        if signal != Signal::Finish {
            return;
        }
        let queue = self.queue.clone() as Rc<dyn Simulator>;
        if !same_simulator(source, &queue) {
            return;
        }
        let this = self.clone() as Rc<dyn Observer>;
        self.queue.observers().remove(&this);
        let source = self.clone() as Rc<dyn Simulator>;
        self.state.finish(&source);
    }
}

impl<K: Clone + PartialEq + 'static> Simulator for Simulation<K> {
    fn execute(self: Rc<Self>) -> Result<(), AlreadyRunning> {
        self.state.begin()?;
        self.queue.add_observer(self.clone() as Rc<dyn Observer>);
        // May finish synchronously and re-enter `simulator_updated`.
        let started = self.queue.clone().execute();
        debug_assert!(started.is_ok(), "gesture queue was already running");
        Ok(())
    }

    fn stop(self: Rc<Self>) {
        if !self.state.is_running() {
            return;
        }
        let this = self.clone() as Rc<dyn Observer>;
        self.queue.observers().remove(&this);
        self.queue.clone().stop();
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

impl<K: fmt::Debug> fmt::Debug for Simulation<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("element", &self.element.borrow())
            .field("position", &self.position.get())
            .field("queued", &self.queue.len())
            .field("running", &self.state.is_running())
            .finish_non_exhaustive()
    }
}
