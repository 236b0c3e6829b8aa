use crate::geometry::ViewportPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// Raw pointer input in viewport coordinates.
///
/// `buttons` is the pressed-button bitmask reported by the host; zero means no
/// button is held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: ViewportPoint,
    pub buttons: u32,
}

impl PointerEvent {
    pub const PRIMARY_BUTTON: u32 = 1;

    pub const fn new(kind: PointerKind, position: ViewportPoint, buttons: u32) -> Self {
        Self {
            kind,
            position,
            buttons,
        }
    }

    pub const fn down(x: f64, y: f64) -> Self {
        Self::new(
            PointerKind::Down,
            ViewportPoint::new(x, y),
            Self::PRIMARY_BUTTON,
        )
    }

    /// A move with the primary button held.
    pub const fn drag_to(x: f64, y: f64) -> Self {
        Self::new(
            PointerKind::Move,
            ViewportPoint::new(x, y),
            Self::PRIMARY_BUTTON,
        )
    }

    /// A move with no button held.
    pub const fn hover(x: f64, y: f64) -> Self {
        Self::new(PointerKind::Move, ViewportPoint::new(x, y), 0)
    }

    pub const fn up(x: f64, y: f64) -> Self {
        Self::new(PointerKind::Up, ViewportPoint::new(x, y), 0)
    }
}
