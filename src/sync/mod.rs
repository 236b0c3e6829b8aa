//! Two-way binding between the crop rectangle and the host's typed parameter
//! record.

use std::cell::Cell;
use std::rc::Rc;

use crate::crop::{AspectLock, AspectRatio, CropBox, CropRect, ImageBounds, RatioPreset};

pub const DEFAULT_RATIO_TEXT: &str = "1:1";

/// Host-facing crop parameters. Insets are measured from each image edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropParameters {
    pub left: i64,
    pub right: i64,
    pub top: i64,
    pub bottom: i64,
    pub width: i64,
    pub height: i64,
    pub ratio_text: String,
    pub ratio_lock: bool,
}

impl Default for CropParameters {
    fn default() -> Self {
        Self {
            left: 0,
            right: 0,
            top: 0,
            bottom: 0,
            width: 0,
            height: 0,
            ratio_text: DEFAULT_RATIO_TEXT.to_string(),
            ratio_lock: false,
        }
    }
}

impl CropParameters {
    /// Geometry fields derived from `rect`; ratio fields are kept from `self`.
    pub fn for_rect(&self, rect: CropRect, bounds: ImageBounds) -> Self {
        Self {
            left: i64::from(rect.x1),
            right: i64::from(bounds.width) - i64::from(rect.x2),
            top: i64::from(rect.y1),
            bottom: i64::from(bounds.height) - i64::from(rect.y2),
            width: i64::from(rect.width()),
            height: i64::from(rect.height()),
            ratio_text: self.ratio_text.clone(),
            ratio_lock: self.ratio_lock,
        }
    }

    pub fn preset(&self) -> RatioPreset {
        RatioPreset::for_text(&self.ratio_text)
    }

    pub fn aspect_lock(&self) -> AspectLock {
        AspectLock {
            enabled: self.ratio_lock,
            ratio: AspectRatio::parse_or_square(&self.ratio_text),
        }
    }
}

/// A parameter value entered by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterEdit {
    Left(i64),
    Right(i64),
    Top(i64),
    Bottom(i64),
    Width(i64),
    Height(i64),
    RatioText(String),
    RatioLock(bool),
}

/// A parameter value the engine wrote back after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterChange {
    Left(i64),
    Right(i64),
    Top(i64),
    Bottom(i64),
    Width(i64),
    Height(i64),
    RatioText(String),
    RatioLock(bool),
}

impl ParameterChange {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Left(_) => "left",
            Self::Right(_) => "right",
            Self::Top(_) => "top",
            Self::Bottom(_) => "bottom",
            Self::Width(_) => "width",
            Self::Height(_) => "height",
            Self::RatioText(_) => "ratio",
            Self::RatioLock(_) => "ratio_lock",
        }
    }
}

impl From<ParameterChange> for ParameterEdit {
    fn from(change: ParameterChange) -> Self {
        match change {
            ParameterChange::Left(value) => Self::Left(value),
            ParameterChange::Right(value) => Self::Right(value),
            ParameterChange::Top(value) => Self::Top(value),
            ParameterChange::Bottom(value) => Self::Bottom(value),
            ParameterChange::Width(value) => Self::Width(value),
            ParameterChange::Height(value) => Self::Height(value),
            ParameterChange::RatioText(text) => Self::RatioText(text),
            ParameterChange::RatioLock(enabled) => Self::RatioLock(enabled),
        }
    }
}

/// Mirror of the host parameters plus the re-entrancy flag host callbacks
/// check before reacting to a value change.
#[derive(Debug)]
pub struct ParameterSync {
    params: CropParameters,
    lock: AspectLock,
    syncing: Rc<Cell<bool>>,
}

impl Default for ParameterSync {
    fn default() -> Self {
        Self::new(CropParameters::default())
    }
}

impl ParameterSync {
    pub fn new(params: CropParameters) -> Self {
        let lock = params.aspect_lock();
        Self {
            params,
            lock,
            syncing: Rc::new(Cell::new(false)),
        }
    }

    pub fn parameters(&self) -> &CropParameters {
        &self.params
    }

    pub fn aspect_lock(&self) -> AspectLock {
        self.lock
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.get()
    }

    /// Shared handle to the syncing flag for host widget callbacks.
    pub fn sync_flag(&self) -> Rc<Cell<bool>> {
        self.syncing.clone()
    }

    /// Writes the geometry of `rect` into the mirror and returns only the
    /// fields whose value changed.
    pub fn push_rect(&mut self, rect: CropRect, bounds: ImageBounds) -> Vec<ParameterChange> {
        let next = self.params.for_rect(rect, bounds);
        let mut changes = Vec::new();
        let fields: [(i64, i64, fn(i64) -> ParameterChange); 6] = [
            (self.params.left, next.left, ParameterChange::Left),
            (self.params.right, next.right, ParameterChange::Right),
            (self.params.top, next.top, ParameterChange::Top),
            (self.params.bottom, next.bottom, ParameterChange::Bottom),
            (self.params.width, next.width, ParameterChange::Width),
            (self.params.height, next.height, ParameterChange::Height),
        ];
        for (current, value, change) in fields {
            if current != value {
                changes.push(change(value));
            }
        }
        self.params = next;
        changes
    }

    /// Hands `changes` to the host with the syncing flag raised, so echoes of
    /// these writes are ignored by [`Self::apply_edit`].
    pub fn publish<F>(&self, changes: &[ParameterChange], mut sink: F)
    where
        F: FnMut(&ParameterChange),
    {
        if changes.is_empty() {
            return;
        }
        let _guard = SyncGuard::raise(&self.syncing);
        for change in changes {
            sink(change);
        }
    }

    /// Records a new ratio expression. Returns the change when it differs.
    pub fn set_ratio_text(&mut self, text: &str) -> Option<ParameterChange> {
        if self.params.ratio_text == text {
            return None;
        }
        self.params.ratio_text = text.to_string();
        self.lock.ratio = AspectRatio::parse_or_square(text);
        Some(ParameterChange::RatioText(self.params.ratio_text.clone()))
    }

    pub fn set_ratio_lock(&mut self, enabled: bool) -> Option<ParameterChange> {
        if self.params.ratio_lock == enabled {
            return None;
        }
        self.params.ratio_lock = enabled;
        self.lock.enabled = enabled;
        Some(ParameterChange::RatioLock(enabled))
    }

    /// Applies a user edit to the mirror and, when an image is loaded, to the
    /// crop box. Returns the corrections the host must write back.
    pub fn apply_edit(
        &mut self,
        edit: ParameterEdit,
        crop: Option<&mut CropBox>,
        fill: f64,
    ) -> Vec<ParameterChange> {
        if self.is_syncing() {
            tracing::debug!(?edit, "ignoring parameter edit while syncing");
            return Vec::new();
        }
        if self.matches_mirror(&edit) {
            return Vec::new();
        }

        match &edit {
            ParameterEdit::Left(value) => self.params.left = *value,
            ParameterEdit::Right(value) => self.params.right = *value,
            ParameterEdit::Top(value) => self.params.top = *value,
            ParameterEdit::Bottom(value) => self.params.bottom = *value,
            ParameterEdit::Width(value) => self.params.width = *value,
            ParameterEdit::Height(value) => self.params.height = *value,
            ParameterEdit::RatioText(text) => {
                self.set_ratio_text(text);
                return match crop {
                    Some(crop) if self.lock.enabled => self.apply_ratio(crop, fill),
                    _ => Vec::new(),
                };
            }
            ParameterEdit::RatioLock(enabled) => {
                self.set_ratio_lock(*enabled);
                return match crop {
                    Some(crop) if self.lock.enabled => self.apply_ratio(crop, fill),
                    _ => Vec::new(),
                };
            }
        }

        let Some(crop) = crop else {
            return Vec::new();
        };
        match edit {
            ParameterEdit::Width(width) => {
                let width = width as f64;
                let (width, height) = match self.lock.active_ratio() {
                    Some(ratio) => {
                        fit_locked(ratio, width, ratio.height_for(width), crop.bounds())
                    }
                    None => (width, f64::from(crop.rect().height())),
                };
                crop.resize_about_center(width, height);
            }
            ParameterEdit::Height(height) => {
                let height = height as f64;
                let (width, height) = match self.lock.active_ratio() {
                    Some(ratio) => {
                        fit_locked(ratio, ratio.width_for(height), height, crop.bounds())
                    }
                    None => (f64::from(crop.rect().width()), height),
                };
                crop.resize_about_center(width, height);
            }
            _ => {
                self.apply_insets(crop);
            }
        }
        self.push_rect(crop.rect(), crop.bounds())
    }

    /// Applies the mirrored insets to `crop`.
    pub fn apply_insets(&self, crop: &mut CropBox) -> CropRect {
        let params = &self.params;
        crop.set_from_insets(params.left, params.right, params.top, params.bottom)
    }

    /// Resets `crop` to the current ratio and pushes the result.
    pub fn apply_ratio(&mut self, crop: &mut CropBox, fill: f64) -> Vec<ParameterChange> {
        let rect = crop.reset_to_ratio(self.lock.ratio, fill);
        tracing::debug!(ratio = %self.lock.ratio, ?rect, "applied aspect ratio");
        self.push_rect(rect, crop.bounds())
    }

    fn matches_mirror(&self, edit: &ParameterEdit) -> bool {
        let params = &self.params;
        match edit {
            ParameterEdit::Left(value) => params.left == *value,
            ParameterEdit::Right(value) => params.right == *value,
            ParameterEdit::Top(value) => params.top == *value,
            ParameterEdit::Bottom(value) => params.bottom == *value,
            ParameterEdit::Width(value) => params.width == *value,
            ParameterEdit::Height(value) => params.height == *value,
            ParameterEdit::RatioText(text) => params.ratio_text == *text,
            ParameterEdit::RatioLock(enabled) => params.ratio_lock == *enabled,
        }
    }
}

/// Shrinks a locked size until it fits the image, keeping the ratio.
fn fit_locked(ratio: AspectRatio, width: f64, height: f64, bounds: ImageBounds) -> (f64, f64) {
    let max_width = width.min(f64::from(bounds.width));
    let max_height = height.min(f64::from(bounds.height));
    ratio.fit_within(max_width, max_height)
}

struct SyncGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> SyncGuard<'a> {
    fn raise(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}
