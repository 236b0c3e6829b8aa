use std::cell::Cell;
use std::rc::Rc;

use image::{DynamicImage, GenericImageView};

use crate::config::EngineConfig;
use crate::crop::{AspectLock, AspectRatio, CropBox, CropRect, ImageBounds, RatioPreset, Zone};
use crate::error::{EngineError, EngineResult};
use crate::geometry::{rect_to_viewport, ImagePoint, ViewTransform, ViewportPoint, ViewportRect};
use crate::output::{crop_image, CropRegion, CropReport, CropSummary};
use crate::state::{DragController, DragState, DragUpdate, PointerEvent};
use crate::sync::{CropParameters, ParameterChange, ParameterEdit, ParameterSync};

/// Result of routing one pointer event through the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerResponse {
    pub update: DragUpdate,
    /// Parameter writes caused by the event, for [`CropEngine::publish`].
    pub changes: Vec<ParameterChange>,
}

impl PointerResponse {
    /// Whether the host should stop propagating the event.
    pub fn is_handled(&self) -> bool {
        self.update.is_handled()
    }
}

/// Per-session crop editing state: the crop box, the drag controller, and the
/// parameter mirror.
#[derive(Debug)]
pub struct CropEngine {
    config: EngineConfig,
    crop: Option<CropBox>,
    previous_bounds: Option<ImageBounds>,
    drag: DragController,
    /// Set when the image was unloaded mid-drag; the next pointer event ends
    /// that session without committing.
    orphaned_drag: bool,
    sync: ParameterSync,
    transform: ViewTransform,
}

impl Default for CropEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl CropEngine {
    pub fn new(config: EngineConfig) -> Self {
        let params = CropParameters {
            ratio_text: config.default_ratio.clone(),
            ratio_lock: config.ratio_lock,
            ..CropParameters::default()
        };
        Self::with_parameters(config, params)
    }

    /// Starts from parameters the host already stores. Insets are applied
    /// when the first image loads.
    pub fn with_parameters(config: EngineConfig, params: CropParameters) -> Self {
        let config = config.sanitized();
        Self {
            drag: DragController::new(config.hit_threshold_px),
            orphaned_drag: false,
            sync: ParameterSync::new(params),
            crop: None,
            previous_bounds: None,
            transform: ViewTransform::identity(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bounds(&self) -> Option<ImageBounds> {
        self.crop.as_ref().map(CropBox::bounds)
    }

    pub fn crop_rect(&self) -> Option<CropRect> {
        self.crop.as_ref().map(CropBox::rect)
    }

    pub fn parameters(&self) -> &CropParameters {
        self.sync.parameters()
    }

    pub fn aspect_lock(&self) -> AspectLock {
        self.sync.aspect_lock()
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub fn view_transform(&self) -> ViewTransform {
        self.transform
    }

    /// Shared syncing flag for host widget callbacks.
    pub fn sync_flag(&self) -> Rc<Cell<bool>> {
        self.sync.sync_flag()
    }

    /// Loads or replaces the image.
    ///
    /// The first image applies the stored insets. Reloading an image of the
    /// same size keeps the rectangle; any other size resets it to the full
    /// image and drops an active drag.
    pub fn load_image(&mut self, bounds: ImageBounds) -> EngineResult<Vec<ParameterChange>> {
        if bounds.is_empty() {
            return Err(EngineError::InvalidImageBounds {
                width: bounds.width,
                height: bounds.height,
            });
        }

        match self.crop.as_mut() {
            Some(crop) => {
                if crop.set_bounds(bounds) {
                    self.drag.cancel();
                }
            }
            None => {
                let mut crop = CropBox::new(bounds);
                match self.previous_bounds {
                    Some(previous) if previous != bounds => {}
                    _ => {
                        self.sync.apply_insets(&mut crop);
                    }
                }
                self.crop = Some(crop);
            }
        }
        self.previous_bounds = Some(bounds);

        let Some(crop) = self.crop.as_ref() else {
            return Err(EngineError::NoImage);
        };
        tracing::debug!(?bounds, rect = ?crop.rect(), "image loaded");
        Ok(self.sync.push_rect(crop.rect(), crop.bounds()))
    }

    /// Drops the image. A drag still in progress ends on its next event,
    /// even if an image of the same size is loaded in between.
    pub fn unload_image(&mut self) {
        if self.crop.take().is_some() {
            self.orphaned_drag = self.drag.is_dragging();
            tracing::debug!(orphaned_drag = self.orphaned_drag, "image unloaded");
        }
    }

    pub fn set_view_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
    }

    /// Fits the loaded image into `area` and uses that as the view transform.
    pub fn fit_to_area(&mut self, area: ViewportRect) -> Option<ViewTransform> {
        let bounds = self.bounds()?;
        self.transform = ViewTransform::fit(bounds, area);
        Some(self.transform)
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerResponse {
        if std::mem::take(&mut self.orphaned_drag) {
            return PointerResponse {
                update: self.drag.cancel(),
                changes: Vec::new(),
            };
        }
        let lock = self.sync.aspect_lock();
        let update = self
            .drag
            .handle(event, &self.transform, self.crop.as_mut(), lock);
        let changes = match (update.committed_rect(), self.crop.as_ref()) {
            (Some(rect), Some(crop)) => self.sync.push_rect(rect, crop.bounds()),
            _ => Vec::new(),
        };
        PointerResponse { update, changes }
    }

    /// Starts a drag at `position`. Unlike [`Self::handle_pointer`], a press
    /// while a drag is already active is an error.
    pub fn begin_drag(&mut self, position: ViewportPoint) -> EngineResult<Option<Zone>> {
        if std::mem::take(&mut self.orphaned_drag) {
            self.drag.cancel();
        }
        Ok(self
            .drag
            .pointer_down(position, &self.transform, self.crop.as_ref())?)
    }

    /// Ends a drag on pointer capture loss.
    pub fn cancel_drag(&mut self) -> DragUpdate {
        self.orphaned_drag = false;
        self.drag.cancel()
    }

    /// Applies a parameter edit from the host. Ignored during a drag.
    pub fn apply_edit(&mut self, edit: ParameterEdit) -> Vec<ParameterChange> {
        if self.drag_active() {
            tracing::debug!(?edit, "ignoring parameter edit during drag");
            return Vec::new();
        }
        self.sync
            .apply_edit(edit, self.crop.as_mut(), self.config.ratio_fill)
    }

    /// Sets the ratio expression, rejecting text that does not parse.
    pub fn set_ratio(&mut self, text: &str) -> EngineResult<Vec<ParameterChange>> {
        AspectRatio::parse(text)?;
        if self.drag_active() {
            return Ok(Vec::new());
        }
        let mut changes = self.sync.set_ratio_text(text).into_iter().collect::<Vec<_>>();
        if self.sync.aspect_lock().enabled {
            if let Some(crop) = self.crop.as_mut() {
                changes.extend(self.sync.apply_ratio(crop, self.config.ratio_fill));
            }
        }
        Ok(changes)
    }

    pub fn reset_full(&mut self) -> Vec<ParameterChange> {
        self.mutate_crop(CropBox::reset_to_full)
    }

    pub fn center_selection(&mut self) -> Vec<ParameterChange> {
        self.mutate_crop(CropBox::center)
    }

    /// Resets the box to the current ratio whether or not the lock is on.
    pub fn apply_ratio(&mut self) -> Vec<ParameterChange> {
        if self.drag_active() {
            return Vec::new();
        }
        let fill = self.config.ratio_fill;
        match self.crop.as_mut() {
            Some(crop) => self.sync.apply_ratio(crop, fill),
            None => Vec::new(),
        }
    }

    /// Switches to a preset ratio and applies it. `Custom` leaves everything
    /// as it is.
    pub fn select_preset(&mut self, preset: RatioPreset) -> Vec<ParameterChange> {
        if preset.aspect_ratio().is_none() || self.drag_active() {
            return Vec::new();
        }
        let mut changes = self
            .sync
            .set_ratio_text(preset.label())
            .into_iter()
            .collect::<Vec<_>>();
        changes.extend(self.apply_ratio());
        changes
    }

    /// Hands `changes` to the host with the syncing flag raised.
    pub fn publish<F>(&self, changes: &[ParameterChange], sink: F)
    where
        F: FnMut(&ParameterChange),
    {
        self.sync.publish(changes, sink);
    }

    pub fn hover_zone(&self) -> Option<Zone> {
        if self.orphaned_drag {
            return None;
        }
        self.drag.active_zone()
    }

    pub fn cursor_name(&self) -> &'static str {
        self.hover_zone().map_or("default", Zone::cursor_name)
    }

    /// The crop box in display coordinates.
    pub fn overlay_rect(&self) -> Option<ViewportRect> {
        let rect = self.crop_rect()?;
        Some(rect_to_viewport(
            ImagePoint::new(f64::from(rect.x1), f64::from(rect.y1)),
            ImagePoint::new(f64::from(rect.x2), f64::from(rect.y2)),
            &self.transform,
        ))
    }

    pub fn summary(&self) -> Option<CropSummary> {
        let crop = self.crop.as_ref()?;
        Some(CropSummary::new(crop.rect(), crop.bounds()))
    }

    /// The region the crop step will cut, resolved from the parameters.
    pub fn region(&self) -> EngineResult<CropRegion> {
        let bounds = self.bounds().ok_or(EngineError::NoImage)?;
        Ok(CropRegion::resolve(self.sync.parameters(), bounds))
    }

    pub fn report(&self) -> EngineResult<CropReport> {
        let bounds = self.bounds().ok_or(EngineError::NoImage)?;
        Ok(self.region()?.report(bounds))
    }

    pub fn report_json(&self) -> EngineResult<String> {
        Ok(self.report()?.to_json()?)
    }

    /// Applies the current parameters to `image`, resolving the insets
    /// against the image's own size.
    pub fn crop_image(&self, image: &DynamicImage) -> EngineResult<DynamicImage> {
        let (width, height) = image.dimensions();
        let region = CropRegion::resolve(self.sync.parameters(), ImageBounds::new(width, height));
        Ok(crop_image(image, region)?)
    }

    fn drag_active(&self) -> bool {
        self.drag.is_dragging() && !self.orphaned_drag
    }

    fn mutate_crop(&mut self, mutate: fn(&mut CropBox) -> CropRect) -> Vec<ParameterChange> {
        if self.drag_active() {
            tracing::debug!("ignoring crop command during drag");
            return Vec::new();
        }
        let Some(crop) = self.crop.as_mut() else {
            return Vec::new();
        };
        let rect = mutate(crop);
        self.sync.push_rect(rect, crop.bounds())
    }
}
