//! Pointer input delivered by the hosting compositor.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in stage (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

impl PointerEvent {
    /// Pointer position carried by the event.
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position } => position,
        }
    }

    pub fn is_primary_down(&self) -> bool {
        matches!(
            self,
            PointerEvent::Down {
                button: MouseButton::Left,
                ..
            }
        )
    }
}

/// Whether an event continues to other handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Consumed.
    Stop,
    /// Let the next handler see it.
    Propagate,
}

/// Location of the concrete event target inside a widget, as child indices
/// from the widget's content box. Empty means the widget background, `[0]`
/// the loaded content root and `[0, i]` its children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The widget background itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_position() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(PointerEvent::Move { position: p }.position(), p);
        assert_eq!(
            PointerEvent::Up {
                position: p,
                button: MouseButton::Right
            }
            .position(),
            p
        );
    }

    #[test]
    fn test_primary_down() {
        let p = Point::ZERO;
        assert!(PointerEvent::Down { position: p, button: MouseButton::Left }.is_primary_down());
        assert!(!PointerEvent::Down { position: p, button: MouseButton::Right }.is_primary_down());
        assert!(!PointerEvent::Move { position: p }.is_primary_down());
    }

    #[test]
    fn test_node_path() {
        assert!(NodePath::root().is_root());
        assert_eq!(NodePath::new(vec![0, 2]).indices(), &[0, 2]);
    }
}
