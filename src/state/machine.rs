use super::error::{StateError, StateResult};
use super::event::{PointerEvent, PointerKind};
use crate::crop::{classify, drag_edges, AspectLock, CropBox, CropRect, Zone};
use crate::geometry::{
    to_image_space, to_image_space_unbounded, ImageBounds, ImagePoint, ViewTransform,
    ViewportPoint,
};

/// Snapshot taken at pointer-down; every move recomputes from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub zone: Zone,
    pub anchor_rect: CropRect,
    pub anchor_pointer: ImagePoint,
    pub bounds: ImageBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Hovering(Zone),
    Dragging(DragSession),
}

/// Payload-free view of [`DragState`], used in transition errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragPhase {
    Idle,
    Hovering,
    Dragging,
}

impl DragState {
    pub const fn phase(&self) -> DragPhase {
        match self {
            Self::Idle => DragPhase::Idle,
            Self::Hovering(_) => DragPhase::Hovering,
            Self::Dragging(_) => DragPhase::Dragging,
        }
    }
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragUpdate {
    /// Not for this engine; the host may route the event elsewhere.
    Ignored,
    Hover(Option<Zone>),
    Started(Zone),
    Moved(CropRect),
    Finished(CropRect),
    Cancelled,
}

impl DragUpdate {
    pub const fn is_handled(&self) -> bool {
        match self {
            Self::Ignored => false,
            Self::Hover(zone) => zone.is_some(),
            Self::Started(_) | Self::Moved(_) | Self::Finished(_) | Self::Cancelled => true,
        }
    }

    pub const fn committed_rect(&self) -> Option<CropRect> {
        match self {
            Self::Moved(rect) | Self::Finished(rect) => Some(*rect),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct DragController {
    state: DragState,
    hit_threshold_px: f64,
}

impl DragController {
    pub fn new(hit_threshold_px: f64) -> Self {
        Self {
            state: DragState::Idle,
            hit_threshold_px,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Zone under the pointer: the hovered zone, or the dragged one.
    pub fn active_zone(&self) -> Option<Zone> {
        match self.state {
            DragState::Idle => None,
            DragState::Hovering(zone) => Some(zone),
            DragState::Dragging(session) => Some(session.zone),
        }
    }

    pub fn can_accept(&self, event: PointerKind) -> bool {
        match (self.state.phase(), event) {
            (DragPhase::Dragging, PointerKind::Down) => false,
            (_, PointerKind::Down | PointerKind::Move) => true,
            (phase, PointerKind::Up) => phase == DragPhase::Dragging,
        }
    }

    /// Dispatches a raw pointer event.
    ///
    /// Events [`Self::can_accept`] refuses (a second pointer-down, a release
    /// with no session) are logged and reported as [`DragUpdate::Ignored`].
    pub fn handle(
        &mut self,
        event: PointerEvent,
        transform: &ViewTransform,
        crop: Option<&mut CropBox>,
        lock: AspectLock,
    ) -> DragUpdate {
        if !self.can_accept(event.kind) {
            let from = self.state.phase();
            if event.kind == PointerKind::Down {
                tracing::warn!(
                    from = ?from,
                    event = ?event.kind,
                    "invalid drag transition requested"
                );
            } else {
                tracing::debug!(
                    from = ?from,
                    event = ?event.kind,
                    "pointer event without drag session"
                );
            }
            return DragUpdate::Ignored;
        }

        match event.kind {
            PointerKind::Down => {
                match self.pointer_down(event.position, transform, crop.as_deref()) {
                    Ok(Some(zone)) => DragUpdate::Started(zone),
                    Ok(None) => DragUpdate::Ignored,
                    Err(err) => {
                        tracing::warn!(%err, "pointer down rejected");
                        DragUpdate::Ignored
                    }
                }
            }
            PointerKind::Move => {
                self.pointer_move(event.position, event.buttons, transform, crop, lock)
            }
            PointerKind::Up => self.pointer_up(crop.as_deref()),
        }
    }

    /// Starts a session when the pointer lands on a zone of the crop box.
    pub fn pointer_down(
        &mut self,
        position: ViewportPoint,
        transform: &ViewTransform,
        crop: Option<&CropBox>,
    ) -> StateResult<Option<Zone>> {
        if let DragState::Dragging(_) = self.state {
            let from = self.state.phase();
            return Err(StateError::InvalidStateTransition {
                from,
                event: PointerKind::Down,
            });
        }
        let Some(crop) = crop else {
            return Ok(None);
        };
        let Some(pointer) = to_image_space(position, transform) else {
            return Ok(None);
        };
        let rect = crop.rect();
        let Some(zone) = classify(
            pointer,
            &rect,
            self.hit_threshold_px,
            transform.effective_scale(),
        ) else {
            return Ok(None);
        };

        tracing::debug!(from = ?self.state.phase(), zone = ?zone, "drag started");
        self.state = DragState::Dragging(DragSession {
            zone,
            anchor_rect: rect,
            anchor_pointer: pointer,
            bounds: crop.bounds(),
        });
        Ok(Some(zone))
    }

    pub fn pointer_move(
        &mut self,
        position: ViewportPoint,
        buttons: u32,
        transform: &ViewTransform,
        crop: Option<&mut CropBox>,
        lock: AspectLock,
    ) -> DragUpdate {
        let DragState::Dragging(session) = self.state else {
            return self.hover(position, transform, crop.as_deref());
        };
        let Some(crop) = crop else {
            return self.drop_session("image unloaded during drag");
        };
        if crop.bounds() != session.bounds {
            return self.drop_session("image bounds changed during drag");
        }
        if buttons == 0 {
            return self.pointer_up(Some(&*crop));
        }

        let pointer = to_image_space_unbounded(position, transform);
        let edges = drag_edges(
            session.zone,
            session.anchor_rect,
            pointer.x - session.anchor_pointer.x,
            pointer.y - session.anchor_pointer.y,
            session.bounds,
            lock.active_ratio(),
        );
        DragUpdate::Moved(crop.commit(edges))
    }

    pub fn pointer_up(&mut self, crop: Option<&CropBox>) -> DragUpdate {
        let DragState::Dragging(session) = self.state else {
            return DragUpdate::Ignored;
        };
        match crop {
            Some(crop) if crop.bounds() == session.bounds => {
                tracing::debug!(zone = ?session.zone, rect = ?crop.rect(), "drag finished");
                self.state = DragState::Idle;
                DragUpdate::Finished(crop.rect())
            }
            _ => self.drop_session("image changed before release"),
        }
    }

    /// Ends a session on capture loss. The rectangle keeps its last committed
    /// value.
    pub fn cancel(&mut self) -> DragUpdate {
        match self.state {
            DragState::Dragging(_) => self.drop_session("pointer capture lost"),
            DragState::Hovering(_) => {
                self.state = DragState::Idle;
                DragUpdate::Hover(None)
            }
            DragState::Idle => DragUpdate::Ignored,
        }
    }

    fn hover(
        &mut self,
        position: ViewportPoint,
        transform: &ViewTransform,
        crop: Option<&CropBox>,
    ) -> DragUpdate {
        let zone = crop.and_then(|crop| {
            let pointer = to_image_space(position, transform)?;
            classify(
                pointer,
                &crop.rect(),
                self.hit_threshold_px,
                transform.effective_scale(),
            )
        });
        self.state = match zone {
            Some(zone) => DragState::Hovering(zone),
            None => DragState::Idle,
        };
        DragUpdate::Hover(zone)
    }

    fn drop_session(&mut self, reason: &'static str) -> DragUpdate {
        tracing::debug!(reason, "drag session dropped");
        self.state = DragState::Idle;
        DragUpdate::Cancelled
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_HIT_THRESHOLD_PX)
    }
}

impl std::fmt::Display for DragController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state {
            DragState::Idle => write!(f, "DragState::Idle"),
            DragState::Hovering(zone) => write!(f, "DragState::Hovering({})", zone.label()),
            DragState::Dragging(session) => {
                write!(f, "DragState::Dragging({})", session.zone.label())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::AspectRatio;

    fn crop() -> CropBox {
        CropBox::with_rect(ImageBounds::new(1000, 800), CropRect::new(100, 100, 300, 300))
    }

    fn transform() -> ViewTransform {
        // Preview at half size, offset by (20, 10).
        ViewTransform::new(20.0, 10.0, 0.5).with_extent(500.0, 400.0)
    }

    fn viewport(x: f64, y: f64) -> (f64, f64) {
        (20.0 + x * 0.5, 10.0 + y * 0.5)
    }

    fn send(
        controller: &mut DragController,
        crop: &mut CropBox,
        event: PointerEvent,
        lock: AspectLock,
    ) -> DragUpdate {
        controller.handle(event, &transform(), Some(crop), lock)
    }

    #[test]
    fn can_accept_tracks_valid_and_invalid_events() {
        let mut controller = DragController::default();
        let mut crop = crop();
        assert!(controller.can_accept(PointerKind::Down));
        assert!(!controller.can_accept(PointerKind::Up));

        let (x, y) = viewport(200.0, 200.0);
        let update = send(
            &mut controller,
            &mut crop,
            PointerEvent::down(x, y),
            AspectLock::default(),
        );
        assert_eq!(update, DragUpdate::Started(Zone::Move));
        assert!(!controller.can_accept(PointerKind::Down));
        assert!(controller.can_accept(PointerKind::Up));
    }

    #[test]
    fn hover_reports_zone_without_mutating_the_rectangle() {
        let mut controller = DragController::default();
        let mut crop = crop();
        let (x, y) = viewport(300.0, 300.0);
        let update = send(
            &mut controller,
            &mut crop,
            PointerEvent::hover(x, y),
            AspectLock::default(),
        );
        assert_eq!(update, DragUpdate::Hover(Some(Zone::SouthEast)));
        assert_eq!(controller.state(), DragState::Hovering(Zone::SouthEast));
        assert_eq!(crop.rect(), CropRect::new(100, 100, 300, 300));

        let (x, y) = viewport(600.0, 600.0);
        let update = send(
            &mut controller,
            &mut crop,
            PointerEvent::hover(x, y),
            AspectLock::default(),
        );
        assert_eq!(update, DragUpdate::Hover(None));
        assert_eq!(controller.state(), DragState::Idle);
    }

    #[test]
    fn locked_corner_drag_session_commits_square() {
        let mut controller = DragController::default();
        let mut crop = crop();
        let lock = AspectLock::locked(AspectRatio::SQUARE);

        let (x, y) = viewport(300.0, 300.0);
        send(&mut controller, &mut crop, PointerEvent::down(x, y), lock);
        let (x, y) = viewport(350.0, 310.0);
        let update = send(&mut controller, &mut crop, PointerEvent::drag_to(x, y), lock);
        assert_eq!(update, DragUpdate::Moved(CropRect::new(100, 100, 350, 350)));

        let update = send(&mut controller, &mut crop, PointerEvent::up(x, y), lock);
        assert_eq!(update, DragUpdate::Finished(CropRect::new(100, 100, 350, 350)));
        assert_eq!(controller.state(), DragState::Idle);
    }

    #[test]
    fn moves_recompute_from_the_anchor_not_the_previous_move() {
        let mut controller = DragController::default();
        let mut crop = crop();
        let lock = AspectLock::default();

        let (x, y) = viewport(200.0, 200.0);
        send(&mut controller, &mut crop, PointerEvent::down(x, y), lock);
        for step in 1..=5 {
            let (x, y) = viewport(200.0 + 10.0 * f64::from(step), 200.0);
            send(&mut controller, &mut crop, PointerEvent::drag_to(x, y), lock);
        }
        assert_eq!(crop.rect(), CropRect::new(150, 100, 350, 300));
    }

    #[test]
    fn drag_continues_past_the_preview_edge() {
        let mut controller = DragController::default();
        let mut crop = crop();
        let lock = AspectLock::default();

        let (x, y) = viewport(300.0, 200.0);
        send(&mut controller, &mut crop, PointerEvent::down(x, y), lock);
        let update = send(
            &mut controller,
            &mut crop,
            PointerEvent::drag_to(2000.0, 2000.0),
            lock,
        );
        assert_eq!(update, DragUpdate::Moved(CropRect::new(100, 100, 1000, 300)));
    }

    #[test]
    fn move_without_buttons_ends_the_session() {
        let mut controller = DragController::default();
        let mut crop = crop();
        let lock = AspectLock::default();

        let (x, y) = viewport(200.0, 200.0);
        send(&mut controller, &mut crop, PointerEvent::down(x, y), lock);
        let update = send(&mut controller, &mut crop, PointerEvent::hover(x, y), lock);
        assert_eq!(update, DragUpdate::Finished(CropRect::new(100, 100, 300, 300)));
        assert!(!controller.is_dragging());
    }

    #[test]
    fn second_pointer_down_is_rejected_without_changing_the_session() {
        let mut controller = DragController::default();
        let crop = crop();
        let (x, y) = viewport(300.0, 200.0);
        controller
            .pointer_down(ViewportPoint::new(x, y), &transform(), Some(&crop))
            .expect("first pointer down should start a drag");

        let (x, y) = viewport(200.0, 200.0);
        let err = controller
            .pointer_down(ViewportPoint::new(x, y), &transform(), Some(&crop))
            .expect_err("second pointer down should be rejected");
        assert_eq!(
            err,
            StateError::InvalidStateTransition {
                from: DragPhase::Dragging,
                event: PointerKind::Down,
            }
        );
        assert_eq!(
            controller.session().map(|session| session.zone),
            Some(Zone::East)
        );
    }

    #[test]
    fn handle_ignores_events_the_phase_cannot_accept() {
        let mut controller = DragController::default();
        let mut crop = crop();
        let lock = AspectLock::default();
        let (x, y) = viewport(200.0, 200.0);
        assert_eq!(
            send(&mut controller, &mut crop, PointerEvent::up(x, y), lock),
            DragUpdate::Ignored
        );
        assert_eq!(controller.state(), DragState::Idle);

        let (x, y) = viewport(300.0, 200.0);
        send(&mut controller, &mut crop, PointerEvent::down(x, y), lock);
        let (x, y) = viewport(200.0, 200.0);
        let update = send(&mut controller, &mut crop, PointerEvent::down(x, y), lock);
        assert_eq!(update, DragUpdate::Ignored);
        assert_eq!(
            controller.session().map(|session| session.zone),
            Some(Zone::East)
        );
        assert_eq!(controller.to_string(), "DragState::Dragging(e)");
    }

    #[test]
    fn pointer_events_without_session_are_ignored() {
        let mut controller = DragController::default();
        let crop = crop();
        assert_eq!(controller.pointer_up(Some(&crop)), DragUpdate::Ignored);
        assert_eq!(controller.cancel(), DragUpdate::Ignored);

        let (x, y) = viewport(700.0, 700.0);
        let started = controller
            .pointer_down(ViewportPoint::new(x, y), &transform(), Some(&crop))
            .expect("idle controller accepts pointer down");
        assert_eq!(started, None);
        assert_eq!(controller.state(), DragState::Idle);
    }

    #[test]
    fn unloaded_image_degrades_session_to_idle_without_commit() {
        let mut controller = DragController::default();
        let mut crop = crop();
        let lock = AspectLock::default();
        let (x, y) = viewport(200.0, 200.0);
        send(&mut controller, &mut crop, PointerEvent::down(x, y), lock);

        let (x, y) = viewport(260.0, 200.0);
        let update = controller.handle(PointerEvent::drag_to(x, y), &transform(), None, lock);
        assert_eq!(update, DragUpdate::Cancelled);
        assert_eq!(controller.state(), DragState::Idle);
        assert_eq!(crop.rect(), CropRect::new(100, 100, 300, 300));
    }

    #[test]
    fn bounds_change_during_drag_drops_the_session() {
        let mut controller = DragController::default();
        let mut crop = crop();
        let lock = AspectLock::default();
        let (x, y) = viewport(200.0, 200.0);
        send(&mut controller, &mut crop, PointerEvent::down(x, y), lock);

        crop.set_bounds(ImageBounds::new(640, 480));
        let (x, y) = viewport(260.0, 200.0);
        let update = send(&mut controller, &mut crop, PointerEvent::drag_to(x, y), lock);
        assert_eq!(update, DragUpdate::Cancelled);
        assert_eq!(crop.rect(), CropRect::new(0, 0, 640, 480));
    }

    #[test]
    fn cancel_keeps_last_committed_rectangle() {
        let mut controller = DragController::default();
        let mut crop = crop();
        let lock = AspectLock::default();
        let (x, y) = viewport(200.0, 200.0);
        send(&mut controller, &mut crop, PointerEvent::down(x, y), lock);
        let (x, y) = viewport(240.0, 220.0);
        send(&mut controller, &mut crop, PointerEvent::drag_to(x, y), lock);

        assert_eq!(controller.cancel(), DragUpdate::Cancelled);
        assert_eq!(crop.rect(), CropRect::new(140, 120, 340, 320));
        assert_eq!(controller.to_string(), "DragState::Idle");
    }
}
