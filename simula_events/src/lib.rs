// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic mouse event value objects.
//!
//! This crate defines the value side of the simula input simulator: the
//! descriptor that a dispatched synthetic mouse event is built from, and the
//! partial options callers use to customize one. It deliberately contains no
//! scheduling or dispatch machinery; see `simula_scheduler` for that.
//!
//! Descriptors are flat. The W3C event/UI-event/mouse-event layering is
//! collapsed into a single [`MouseEventDescriptor`] with every field present,
//! since the simulator only ever produces mouse events. The `view` handle of
//! a UI event is a host concern and is supplied by the dispatching host, not
//! carried here.
//!
//! ## Override precedence
//!
//! A concrete descriptor is resolved from up to three layers:
//!
//! 1. explicit caller options (highest),
//! 2. computed defaults (for example, interpolated client coordinates or a
//!    `related_target` derived from a boundary crossing),
//! 3. library defaults (lowest; see [`MouseOptions::resolve`]).
//!
//! Layers combine with [`MouseOptions::or`], and [`MouseOptions::resolve`]
//! fills whatever is still unset. The event kind is never taken from
//! options: each gesture method forces its own kind, and `mousemove`
//! additionally forces `cancelable = false`.
//!
//! ```
//! use kurbo::Point;
//! use simula_events::{MouseButton, MouseEventKind, MouseOptions};
//!
//! // Caller asks for the middle button; the computed layer supplies the
//! // client position; everything else falls back to library defaults.
//! let explicit: MouseOptions<u32> = MouseOptions {
//!     button: Some(MouseButton::Middle),
//!     ..MouseOptions::default()
//! };
//! let computed: MouseOptions<u32> = MouseOptions {
//!     client: Some(Point::new(40.0, 25.0)),
//!     ..MouseOptions::default()
//! };
//! let event = explicit.or(computed).resolve(MouseEventKind::Down);
//! assert_eq!(event.button, MouseButton::Middle);
//! assert_eq!(event.client, Point::new(40.0, 25.0));
//! assert!(event.bubbles);
//! ```

#![no_std]

use kurbo::Point;

/// The mouse event family understood by the simulator.
///
/// Values correspond one-to-one to the DOM event types the simulator can
/// dispatch; [`MouseEventKind::dom_name`] yields the wire name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MouseEventKind {
    /// Pointer movement (`mousemove`). Never cancelable.
    Move,
    /// Pointer entered an element (`mouseover`).
    Over,
    /// Pointer left an element (`mouseout`).
    Out,
    /// Button pressed (`mousedown`).
    Down,
    /// Button released (`mouseup`).
    Up,
    /// Completed press/release pair (`click`).
    Click,
}

impl MouseEventKind {
    /// The DOM event type name for this kind.
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::Move => "mousemove",
            Self::Over => "mouseover",
            Self::Out => "mouseout",
            Self::Down => "mousedown",
            Self::Up => "mouseup",
            Self::Click => "click",
        }
    }
}

/// A mouse button, in W3C numbering.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum MouseButton {
    /// The primary button (0). For left-handed configurations this is the
    /// physical right button; the numbering is logical, not physical.
    #[default]
    Left,
    /// The middle button (1).
    Middle,
    /// The secondary button (2).
    Right,
}

impl MouseButton {
    /// The W3C `button` code.
    pub const fn code(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
        }
    }
}

bitflags::bitflags! {
    /// Modifier keys held while the event fires.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// The control key.
        const CTRL  = 0b0000_0001;
        /// The shift key.
        const SHIFT = 0b0000_0010;
        /// The alt (option) key.
        const ALT   = 0b0000_0100;
        /// The meta (command / windows) key.
        const META  = 0b0000_1000;
    }
}

/// A fully resolved synthetic mouse event.
///
/// Immutable once constructed; the gesture builder creates a fresh descriptor
/// per primitive at build time, freezing the geometry computed then. `K` is
/// the caller's element reference type.
#[derive(Clone, Debug, PartialEq)]
pub struct MouseEventDescriptor<K> {
    /// Which event to dispatch.
    pub kind: MouseEventKind,
    /// Whether the event bubbles.
    pub bubbles: bool,
    /// Whether the default action can be prevented. Always `false` for
    /// [`MouseEventKind::Move`].
    pub cancelable: bool,
    /// Kind-dependent detail (e.g. click count).
    pub detail: u32,
    /// Position in screen coordinates.
    pub screen: Point,
    /// Position in client (viewport/document) coordinates.
    pub client: Point,
    /// Modifier keys held.
    pub modifiers: Modifiers,
    /// The button that changed state (or the primary button for moves).
    pub button: MouseButton,
    /// The secondary target: the element being exited for `mouseover`, the
    /// element being entered for `mouseout`.
    pub related_target: Option<K>,
}

/// Partial event options; unset fields fall through to the next layer.
///
/// See the crate docs for the precedence rules. All fields are optional so a
/// caller only names what they want to pin down.
#[derive(Clone, Debug, PartialEq)]
pub struct MouseOptions<K> {
    /// Override for [`MouseEventDescriptor::bubbles`].
    pub bubbles: Option<bool>,
    /// Override for [`MouseEventDescriptor::cancelable`]. Ignored for
    /// `mousemove`, which is forced non-cancelable.
    pub cancelable: Option<bool>,
    /// Override for [`MouseEventDescriptor::detail`].
    pub detail: Option<u32>,
    /// Override for [`MouseEventDescriptor::screen`].
    pub screen: Option<Point>,
    /// Override for [`MouseEventDescriptor::client`].
    pub client: Option<Point>,
    /// Override for [`MouseEventDescriptor::modifiers`].
    pub modifiers: Option<Modifiers>,
    /// Override for [`MouseEventDescriptor::button`].
    pub button: Option<MouseButton>,
    /// Override for [`MouseEventDescriptor::related_target`].
    pub related_target: Option<K>,
}

impl<K> Default for MouseOptions<K> {
    fn default() -> Self {
        Self {
            bubbles: None,
            cancelable: None,
            detail: None,
            screen: None,
            client: None,
            modifiers: None,
            button: None,
            related_target: None,
        }
    }
}

impl<K> MouseOptions<K> {
    /// Combine with a lower-precedence layer: fields set here win, unset
    /// fields are taken from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            bubbles: self.bubbles.or(fallback.bubbles),
            cancelable: self.cancelable.or(fallback.cancelable),
            detail: self.detail.or(fallback.detail),
            screen: self.screen.or(fallback.screen),
            client: self.client.or(fallback.client),
            modifiers: self.modifiers.or(fallback.modifiers),
            button: self.button.or(fallback.button),
            related_target: self.related_target.or(fallback.related_target),
        }
    }

    /// Resolve into a concrete descriptor of the given kind, filling the
    /// library defaults: bubbling, cancelable (except moves), zero detail and
    /// coordinates, no modifiers, primary button, no related target.
    #[must_use]
    pub fn resolve(self, kind: MouseEventKind) -> MouseEventDescriptor<K> {
        MouseEventDescriptor {
            kind,
            bubbles: self.bubbles.unwrap_or(true),
            // mousemove is never cancelable, whatever the caller asked for.
            cancelable: if kind == MouseEventKind::Move {
                false
            } else {
                self.cancelable.unwrap_or(true)
            },
            detail: self.detail.unwrap_or(0),
            screen: self.screen.unwrap_or(Point::ZERO),
            client: self.client.unwrap_or(Point::ZERO),
            modifiers: self.modifiers.unwrap_or(Modifiers::empty()),
            button: self.button.unwrap_or(MouseButton::Left),
            related_target: self.related_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fills_library_defaults() {
        let event: MouseEventDescriptor<u32> =
            MouseOptions::default().resolve(MouseEventKind::Over);
        assert_eq!(event.kind, MouseEventKind::Over);
        assert!(event.bubbles);
        assert!(event.cancelable);
        assert_eq!(event.detail, 0);
        assert_eq!(event.screen, Point::ZERO);
        assert_eq!(event.client, Point::ZERO);
        assert_eq!(event.modifiers, Modifiers::empty());
        assert_eq!(event.button, MouseButton::Left);
        assert_eq!(event.related_target, None);
    }

    #[test]
    fn explicit_fields_survive_resolution() {
        let options: MouseOptions<u32> = MouseOptions {
            bubbles: Some(false),
            detail: Some(2),
            client: Some(Point::new(3.0, 4.0)),
            modifiers: Some(Modifiers::CTRL | Modifiers::SHIFT),
            button: Some(MouseButton::Right),
            related_target: Some(7),
            ..MouseOptions::default()
        };
        let event = options.resolve(MouseEventKind::Click);
        assert!(!event.bubbles);
        assert_eq!(event.detail, 2);
        assert_eq!(event.client, Point::new(3.0, 4.0));
        assert_eq!(event.modifiers, Modifiers::CTRL | Modifiers::SHIFT);
        assert_eq!(event.button, MouseButton::Right);
        assert_eq!(event.related_target, Some(7));
    }

    #[test]
    fn mousemove_is_forced_non_cancelable() {
        let options: MouseOptions<u32> = MouseOptions {
            cancelable: Some(true),
            ..MouseOptions::default()
        };
        let event = options.resolve(MouseEventKind::Move);
        assert!(!event.cancelable);
    }

    #[test]
    fn explicit_layer_beats_computed_layer() {
        let explicit: MouseOptions<u32> = MouseOptions {
            client: Some(Point::new(1.0, 1.0)),
            ..MouseOptions::default()
        };
        let computed: MouseOptions<u32> = MouseOptions {
            client: Some(Point::new(9.0, 9.0)),
            related_target: Some(3),
            ..MouseOptions::default()
        };
        let merged = explicit.or(computed);
        assert_eq!(merged.client, Some(Point::new(1.0, 1.0)));
        // Computed values still apply where the caller said nothing.
        assert_eq!(merged.related_target, Some(3));
    }

    #[test]
    fn dom_names_match_w3c_types() {
        assert_eq!(MouseEventKind::Move.dom_name(), "mousemove");
        assert_eq!(MouseEventKind::Over.dom_name(), "mouseover");
        assert_eq!(MouseEventKind::Out.dom_name(), "mouseout");
        assert_eq!(MouseEventKind::Down.dom_name(), "mousedown");
        assert_eq!(MouseEventKind::Up.dom_name(), "mouseup");
        assert_eq!(MouseEventKind::Click.dom_name(), "click");
    }

    #[test]
    fn button_codes_match_w3c_numbering() {
        assert_eq!(MouseButton::Left.code(), 0);
        assert_eq!(MouseButton::Middle.code(), 1);
        assert_eq!(MouseButton::Right.code(), 2);
    }
}
