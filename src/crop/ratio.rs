use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatioError {
    #[error("ratio expression is empty")]
    Empty,
    #[error("ratio expression {input:?} is neither a number nor a W:H pair")]
    Malformed { input: String },
    #[error("ratio expression {input:?} must have finite positive components")]
    NonPositive { input: String },
}

/// Width divided by height. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio(f64);

impl Default for AspectRatio {
    fn default() -> Self {
        Self::SQUARE
    }
}

impl AspectRatio {
    pub const SQUARE: Self = Self(1.0);

    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    pub fn from_pair(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Self::new(f64::from(width) / f64::from(height))
    }

    /// Accepts `"W:H"`, `"W/H"` or a bare number.
    pub fn parse(text: &str) -> Result<Self, RatioError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RatioError::Empty);
        }
        let normalized = trimmed.replace('/', ":");
        let parts = normalized.split(':').map(str::trim).collect::<Vec<_>>();
        let malformed = || RatioError::Malformed {
            input: trimmed.to_string(),
        };
        let non_positive = || RatioError::NonPositive {
            input: trimmed.to_string(),
        };

        let value = match parts.as_slice() {
            [single] => positive_component(single).map_err(|err| match err {
                ComponentError::Unparsable => malformed(),
                ComponentError::NonPositive => non_positive(),
            })?,
            [width, height] => {
                let width = positive_component(width);
                let height = positive_component(height);
                match (width, height) {
                    (Ok(width), Ok(height)) => width / height,
                    (Err(ComponentError::Unparsable), _) | (_, Err(ComponentError::Unparsable)) => {
                        return Err(malformed());
                    }
                    _ => return Err(non_positive()),
                }
            }
            _ => return Err(malformed()),
        };

        Self::new(value).ok_or_else(non_positive)
    }

    /// Parses `text`, falling back to 1:1 on any error.
    pub fn parse_or_square(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|err| {
            tracing::debug!(%err, "invalid aspect ratio; falling back to 1:1");
            Self::SQUARE
        })
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    pub fn height_for(self, width: f64) -> f64 {
        width / self.0
    }

    pub fn width_for(self, height: f64) -> f64 {
        height * self.0
    }

    /// Largest `(width, height)` with this ratio that fits inside the given box.
    pub fn fit_within(self, width: f64, height: f64) -> (f64, f64) {
        if height > 0.0 && width / height > self.0 {
            (self.width_for(height), height)
        } else {
            (width, self.height_for(width))
        }
    }
}

impl FromStr for AspectRatio {
    type Err = RatioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

enum ComponentError {
    Unparsable,
    NonPositive,
}

fn positive_component(text: &str) -> Result<f64, ComponentError> {
    let value = text
        .parse::<f64>()
        .map_err(|_| ComponentError::Unparsable)?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::NonPositive)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AspectLock {
    pub enabled: bool,
    pub ratio: AspectRatio,
}

impl AspectLock {
    pub const fn unlocked(ratio: AspectRatio) -> Self {
        Self {
            enabled: false,
            ratio,
        }
    }

    pub const fn locked(ratio: AspectRatio) -> Self {
        Self {
            enabled: true,
            ratio,
        }
    }

    pub const fn active_ratio(&self) -> Option<AspectRatio> {
        if self.enabled {
            Some(self.ratio)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatioPreset {
    Ratio1x1,
    Ratio4x3,
    Ratio3x4,
    Ratio16x9,
    Ratio9x16,
    Ratio2x3,
    Ratio3x2,
    Ratio21x9,
    Custom,
}

impl RatioPreset {
    pub const ALL: [RatioPreset; 9] = [
        Self::Ratio1x1,
        Self::Ratio4x3,
        Self::Ratio3x4,
        Self::Ratio16x9,
        Self::Ratio9x16,
        Self::Ratio2x3,
        Self::Ratio3x2,
        Self::Ratio21x9,
        Self::Custom,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ratio1x1 => "1:1",
            Self::Ratio4x3 => "4:3",
            Self::Ratio3x4 => "3:4",
            Self::Ratio16x9 => "16:9",
            Self::Ratio9x16 => "9:16",
            Self::Ratio2x3 => "2:3",
            Self::Ratio3x2 => "3:2",
            Self::Ratio21x9 => "21:9",
            Self::Custom => "Custom",
        }
    }

    pub const fn ratio(self) -> Option<(u32, u32)> {
        match self {
            Self::Ratio1x1 => Some((1, 1)),
            Self::Ratio4x3 => Some((4, 3)),
            Self::Ratio3x4 => Some((3, 4)),
            Self::Ratio16x9 => Some((16, 9)),
            Self::Ratio9x16 => Some((9, 16)),
            Self::Ratio2x3 => Some((2, 3)),
            Self::Ratio3x2 => Some((3, 2)),
            Self::Ratio21x9 => Some((21, 9)),
            Self::Custom => None,
        }
    }

    pub fn aspect_ratio(self) -> Option<AspectRatio> {
        let (width, height) = self.ratio()?;
        AspectRatio::from_pair(width, height)
    }

    /// The preset whose label matches `text`, or `Custom`.
    pub fn for_text(text: &str) -> Self {
        let normalized = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == '/' { ':' } else { c })
            .collect::<String>();
        Self::ALL
            .into_iter()
            .find(|preset| preset.ratio().is_some() && preset.label() == normalized)
            .unwrap_or(Self::Custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parse_accepts_colon_slash_and_bare_number() {
        assert_abs_diff_eq!(
            AspectRatio::parse("16:9").expect("colon form").value(),
            16.0 / 9.0
        );
        assert_abs_diff_eq!(
            AspectRatio::parse(" 4 / 3 ").expect("slash form").value(),
            4.0 / 3.0
        );
        assert_abs_diff_eq!(AspectRatio::parse("1.5").expect("bare").value(), 1.5);
    }

    #[test]
    fn parse_rejects_malformed_and_non_positive_input() {
        assert_eq!(AspectRatio::parse("   "), Err(RatioError::Empty));
        assert!(matches!(
            AspectRatio::parse("wide"),
            Err(RatioError::Malformed { .. })
        ));
        assert!(matches!(
            AspectRatio::parse("16:9:1"),
            Err(RatioError::Malformed { .. })
        ));
        assert!(matches!(
            AspectRatio::parse("0:9"),
            Err(RatioError::NonPositive { .. })
        ));
        assert!(matches!(
            AspectRatio::parse("-2"),
            Err(RatioError::NonPositive { .. })
        ));
        assert!(matches!(
            AspectRatio::parse("inf"),
            Err(RatioError::NonPositive { .. })
        ));
    }

    #[test]
    fn parse_or_square_falls_back_to_one() {
        assert_eq!(AspectRatio::parse_or_square("abc"), AspectRatio::SQUARE);
        assert_eq!(AspectRatio::parse_or_square("3:0"), AspectRatio::SQUARE);
        assert_abs_diff_eq!(AspectRatio::parse_or_square("2/1").value(), 2.0);
    }

    #[test]
    fn fit_within_maximizes_the_constrained_axis() {
        let ratio = AspectRatio::parse("16:9").expect("valid ratio");
        let (width, height) = ratio.fit_within(1000.0, 500.0);
        assert_abs_diff_eq!(height, 500.0);
        assert_abs_diff_eq!(width, 500.0 * 16.0 / 9.0);

        let (width, height) = ratio.fit_within(400.0, 500.0);
        assert_abs_diff_eq!(width, 400.0);
        assert_abs_diff_eq!(height, 225.0);
    }

    #[test]
    fn aspect_lock_exposes_ratio_only_when_enabled() {
        let ratio = AspectRatio::new(2.0).expect("positive");
        assert_eq!(AspectLock::unlocked(ratio).active_ratio(), None);
        assert_eq!(AspectLock::locked(ratio).active_ratio(), Some(ratio));
    }

    #[test]
    fn preset_for_text_matches_labels_and_falls_back_to_custom() {
        assert_eq!(RatioPreset::for_text("16:9"), RatioPreset::Ratio16x9);
        assert_eq!(RatioPreset::for_text("9 / 16"), RatioPreset::Ratio9x16);
        assert_eq!(RatioPreset::for_text("5:4"), RatioPreset::Custom);
        assert_eq!(RatioPreset::for_text("Custom"), RatioPreset::Custom);
    }

    #[test]
    fn preset_all_contains_every_unique_variant() {
        for (i, a) in RatioPreset::ALL.iter().enumerate() {
            for (j, b) in RatioPreset::ALL.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "ALL has duplicate at indices {i} and {j}");
                }
            }
        }
        assert_eq!(RatioPreset::Custom.aspect_ratio(), None);
        assert_eq!(
            RatioPreset::Ratio3x2.aspect_ratio(),
            AspectRatio::new(1.5)
        );
    }
}
