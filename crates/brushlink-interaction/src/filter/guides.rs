//! Task thresholds and the guides they produce on each axis.

use std::str::FromStr;

use brushlink_core::AxisDomain;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::range::FilterRange;

/// Which side of a threshold the task asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdDirection {
    Less,
    Lowest,
    More,
    Highest,
}

impl ThresholdDirection {
    /// Does the guide run towards the start of the track?
    pub fn towards_min(&self) -> bool {
        matches!(self, ThresholdDirection::Less | ThresholdDirection::Lowest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown threshold direction '{0}'")]
pub struct ParseDirectionError(pub String);

impl FromStr for ThresholdDirection {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "less" => Ok(ThresholdDirection::Less),
            "lowest" => Ok(ThresholdDirection::Lowest),
            "more" => Ok(ThresholdDirection::More),
            "highest" => Ok(ThresholdDirection::Highest),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// One dimension constraint of the current trial.
///
/// Quantitative constraints carry a direction; categorical ones name the
/// tick label to look for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskThreshold {
    pub field: String,
    pub value: String,
    #[serde(default)]
    pub direction: Option<ThresholdDirection>,
}

impl TaskThreshold {
    pub fn quantitative(field: impl Into<String>, value: f32, direction: ThresholdDirection) -> Self {
        Self {
            field: field.into(),
            value: value.to_string(),
            direction: Some(direction),
        }
    }

    pub fn categorical(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: label.into(),
            direction: None,
        }
    }
}

/// Segment along the track marking the region the task asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeGuide {
    pub start: f32,
    pub end: f32,
}

/// What an axis shows for the current task.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AxisGuide {
    /// No task, or the task does not involve this axis.
    #[default]
    Hidden,
    /// A range guide from the threshold to one end; handles snap to `threshold`.
    Range { threshold: f32, guide: RangeGuide },
    /// A categorical tick label drawn emphasised.
    EmphasisedLabel(String),
}

impl AxisGuide {
    /// Snap target in track space.
    pub fn threshold(&self) -> Option<f32> {
        match self {
            AxisGuide::Range { threshold, .. } => Some(*threshold),
            _ => None,
        }
    }

    pub fn range(&self) -> Option<RangeGuide> {
        match self {
            AxisGuide::Range { guide, .. } => Some(*guide),
            _ => None,
        }
    }

    pub fn emphasised_label(&self) -> Option<&str> {
        match self {
            AxisGuide::EmphasisedLabel(label) => Some(label),
            _ => None,
        }
    }
}

/// Works out the guide for one axis from the task's thresholds.
///
/// The first threshold naming the axis field applies. Coincident guide
/// endpoints are pulled apart by `spread` so the segment stays drawable.
pub fn resolve(
    domain: &AxisDomain,
    range: &FilterRange,
    thresholds: &[TaskThreshold],
    spread: f32,
) -> AxisGuide {
    let Some(task) = thresholds.iter().find(|t| t.field == domain.field) else {
        return AxisGuide::Hidden;
    };

    let Some(direction) = task.direction else {
        return if domain.tick_labels.iter().any(|label| *label == task.value) {
            AxisGuide::EmphasisedLabel(task.value.clone())
        } else {
            AxisGuide::Hidden
        };
    };

    let value: f32 = match task.value.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(
                "Threshold '{}' on {} is not numeric; no guide shown",
                task.value, domain.field
            );
            return AxisGuide::Hidden;
        }
    };

    let threshold = range.track_position(value, domain.domain_min, domain.domain_max);
    if !threshold.is_finite() {
        warn!("Threshold {} on {} has no track position", value, domain.field);
        return AxisGuide::Hidden;
    }
    // Out-of-domain values pin to the nearest end of the track.
    let threshold = threshold.clamp(range.track_min(), range.track_max());
    let end = if direction.towards_min() {
        range.track_min()
    } else {
        range.track_max()
    };

    let mut start = threshold;
    if start == end {
        match direction {
            ThresholdDirection::Lowest => start += spread,
            ThresholdDirection::Highest => start -= spread,
            _ => {}
        }
    }

    AxisGuide::Range {
        threshold,
        guide: RangeGuide { start, end },
    }
}
