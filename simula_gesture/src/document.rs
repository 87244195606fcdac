// Copyright 2026 the Simula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only view of the element hierarchy gestures play out over.

use kurbo::{Point, Rect};

/// Geometry and containment queries against the embedding document.
///
/// `K` is the element reference type; the gesture builder only needs to hit
/// test points, read element bounds, and walk parents. All queries are
/// answered at chain time, so implementations should reflect the layout the
/// gesture is being described against.
pub trait DocumentModel<K> {
    /// The innermost element under `point` in client coordinates, if any.
    fn element_at(&self, point: Point) -> Option<K>;

    /// The bounding rectangle of `element` in client coordinates.
    fn bounds(&self, element: &K) -> Rect;

    /// The parent of `element`, or `None` at a hierarchy root.
    fn parent(&self, element: &K) -> Option<K>;

    /// Whether `ancestor` strictly contains `element` in the hierarchy.
    ///
    /// Strict: an element is not its own ancestor.
    fn is_ancestor_of(&self, ancestor: &K, element: &K) -> bool
    where
        K: PartialEq,
    {
        let mut node = self.parent(element);
        while let Some(current) = node {
            if current == *ancestor {
                return true;
            }
            node = self.parent(&current);
        }
        false
    }
}
