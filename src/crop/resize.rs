use super::{AspectRatio, CropRect, Edges, ImageBounds, Zone};

/// Recomputes the crop edges for a drag of `zone` by `(delta_x, delta_y)`
/// image pixels, starting from the rectangle captured at pointer-down.
///
/// With `ratio` set every resize keeps `width / height == ratio`:
/// - dragging a corner lets the axis with the larger ratio-weighted motion
///   drive, the other axis follows from the non-dragged edges;
/// - dragging a single edge re-derives the perpendicular size from the ratio,
///   growing from the top edge (east/west drags) or the left edge
///   (north/south drags);
/// - when an edge leaves the image it is clamped and the dragged edge of the
///   other axis is pulled in by the same amount scaled by the ratio.
///
/// The result may still be fractional; [`super::CropBox::commit`] rounds it.
pub fn drag_edges(
    zone: Zone,
    anchor: CropRect,
    delta_x: f64,
    delta_y: f64,
    bounds: ImageBounds,
    ratio: Option<AspectRatio>,
) -> Edges {
    let delta_x = if delta_x.is_finite() { delta_x } else { 0.0 };
    let delta_y = if delta_y.is_finite() { delta_y } else { 0.0 };

    if zone == Zone::Move {
        return anchor.translated_within(delta_x, delta_y, bounds);
    }

    let mut edges = Edges::from(anchor);
    if zone.moves_left() {
        edges.x1 = (edges.x1 + delta_x).min(edges.x2 - 1.0);
    }
    if zone.moves_right() {
        edges.x2 = (edges.x2 + delta_x).max(edges.x1 + 1.0);
    }
    if zone.moves_top() {
        edges.y1 = (edges.y1 + delta_y).min(edges.y2 - 1.0);
    }
    if zone.moves_bottom() {
        edges.y2 = (edges.y2 + delta_y).max(edges.y1 + 1.0);
    }

    match ratio {
        Some(ratio) => {
            derive_locked_axis(zone, &mut edges, delta_x, delta_y, ratio);
            clamp_locked(zone, &mut edges, bounds, ratio);
        }
        None => clamp_free(&mut edges, bounds),
    }
    edges
}

fn derive_locked_axis(
    zone: Zone,
    edges: &mut Edges,
    delta_x: f64,
    delta_y: f64,
    ratio: AspectRatio,
) {
    let width = edges.width();
    let height = edges.height();
    match zone {
        Zone::East | Zone::West => edges.y2 = edges.y1 + ratio.height_for(width),
        Zone::North | Zone::South => edges.x2 = edges.x1 + ratio.width_for(height),
        Zone::Move => {}
        _ if delta_x.abs() * ratio.value() > delta_y.abs() => {
            let height = ratio.height_for(width);
            if zone.moves_top() {
                edges.y1 = edges.y2 - height;
            } else {
                edges.y2 = edges.y1 + height;
            }
        }
        _ => {
            let width = ratio.width_for(height);
            if zone.moves_left() {
                edges.x1 = edges.x2 - width;
            } else {
                edges.x2 = edges.x1 + width;
            }
        }
    }
}

fn clamp_locked(zone: Zone, edges: &mut Edges, bounds: ImageBounds, ratio: AspectRatio) {
    let max_x = f64::from(bounds.width);
    let max_y = f64::from(bounds.height);

    if edges.x1 < 0.0 {
        let overshoot = -edges.x1;
        edges.x1 = 0.0;
        pull_in_y(zone, edges, ratio.height_for(overshoot));
    }
    if edges.y1 < 0.0 {
        let overshoot = -edges.y1;
        edges.y1 = 0.0;
        pull_in_x(zone, edges, ratio.width_for(overshoot));
    }
    if edges.x2 > max_x {
        let overshoot = edges.x2 - max_x;
        edges.x2 = max_x;
        pull_in_y(zone, edges, ratio.height_for(overshoot));
    }
    if edges.y2 > max_y {
        let overshoot = edges.y2 - max_y;
        edges.y2 = max_y;
        pull_in_x(zone, edges, ratio.width_for(overshoot));
    }
}

fn pull_in_x(zone: Zone, edges: &mut Edges, amount: f64) {
    if zone.moves_left() {
        edges.x1 += amount;
    } else {
        edges.x2 -= amount;
    }
}

fn pull_in_y(zone: Zone, edges: &mut Edges, amount: f64) {
    if zone.moves_top() {
        edges.y1 += amount;
    } else {
        edges.y2 -= amount;
    }
}

fn clamp_free(edges: &mut Edges, bounds: ImageBounds) {
    let max_x = f64::from(bounds.width);
    let max_y = f64::from(bounds.height);
    edges.x1 = edges.x1.max(0.0);
    edges.y1 = edges.y1.max(0.0);
    edges.x2 = edges.x2.min(max_x);
    edges.y2 = edges.y2.min(max_y);
}
