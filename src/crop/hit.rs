use super::{CropRect, ImagePoint};

/// Interaction zone under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Move,
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Zone {
    pub const ALL: [Zone; 9] = [
        Self::Move,
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];

    pub const fn moves_left(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    pub const fn moves_right(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub const fn moves_top(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    pub const fn moves_bottom(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    pub const fn is_corner(self) -> bool {
        matches!(
            self,
            Self::NorthEast | Self::NorthWest | Self::SouthEast | Self::SouthWest
        )
    }

    pub const fn is_edge(self) -> bool {
        matches!(self, Self::North | Self::South | Self::East | Self::West)
    }

    /// CSS cursor name hinting the drag this zone starts.
    pub const fn cursor_name(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::NorthWest | Self::SouthEast => "nwse-resize",
            Self::NorthEast | Self::SouthWest => "nesw-resize",
            Self::North | Self::South => "ns-resize",
            Self::East | Self::West => "ew-resize",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::North => "n",
            Self::South => "s",
            Self::East => "e",
            Self::West => "w",
            Self::NorthEast => "ne",
            Self::NorthWest => "nw",
            Self::SouthEast => "se",
            Self::SouthWest => "sw",
        }
    }
}

/// Classifies `point` against `rect`.
///
/// `threshold_px` is measured on screen and divided by `scale`, so handles keep
/// the same visual size at any zoom. Corners win over edges, edges over the
/// interior.
pub fn classify(
    point: ImagePoint,
    rect: &CropRect,
    threshold_px: f64,
    scale: f64,
) -> Option<Zone> {
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    };
    let tolerance = threshold_px.max(0.0) / scale;
    let (x1, x2) = (f64::from(rect.x1), f64::from(rect.x2));
    let (y1, y2) = (f64::from(rect.y1), f64::from(rect.y2));

    let near_left = (point.x - x1).abs() < tolerance;
    let near_right = (point.x - x2).abs() < tolerance;
    let near_top = (point.y - y1).abs() < tolerance;
    let near_bottom = (point.y - y2).abs() < tolerance;
    let inside_x = point.x > x1.min(x2) && point.x < x1.max(x2);
    let inside_y = point.y > y1.min(y2) && point.y < y1.max(y2);

    let zone = if near_left && near_top {
        Zone::NorthWest
    } else if near_right && near_top {
        Zone::NorthEast
    } else if near_left && near_bottom {
        Zone::SouthWest
    } else if near_right && near_bottom {
        Zone::SouthEast
    } else if near_top && inside_x {
        Zone::North
    } else if near_bottom && inside_x {
        Zone::South
    } else if near_left && inside_y {
        Zone::West
    } else if near_right && inside_y {
        Zone::East
    } else if inside_x && inside_y {
        Zone::Move
    } else {
        return None;
    };
    Some(zone)
}
