//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so trial loggers can persist them
//! verbatim.

use serde::{Deserialize, Serialize};

/// Root event enum for all application events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// A participant-facing interaction happened
    Interaction(InteractionEvent),
    /// The brushed selection changed
    Selection(SelectionEvent),
    /// The visualization (marks, axes, entities) changed
    Vis(VisEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Interaction(_) => EventCategory::Interaction,
            AppEvent::Selection(_) => EventCategory::Selection,
            AppEvent::Vis(_) => EventCategory::Vis,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Interaction(e) => e.description(),
            AppEvent::Selection(e) => e.description(),
            AppEvent::Vis(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Interaction events.
    Interaction,
    /// Selection events.
    Selection,
    /// Visualization lifecycle events.
    Vis,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Interaction => write!(f, "Interaction"),
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Vis => write!(f, "Vis"),
        }
    }
}

/// Kind of interaction, as recorded by trial logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    /// Brushing started or ended
    Brushing,
    /// A filter handle was grabbed or released
    Filter,
    /// The encoded dimension changed
    DimensionChange,
    /// The brush shape changed
    BrushChange,
    /// An entity was picked directly
    ProductSelect,
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionKind::Brushing => write!(f, "Brushing"),
            InteractionKind::Filter => write!(f, "Filter"),
            InteractionKind::DimensionChange => write!(f, "DimensionChange"),
            InteractionKind::BrushChange => write!(f, "BrushChange"),
            InteractionKind::ProductSelect => write!(f, "ProductSelect"),
        }
    }
}

/// A participant interaction stamped with simulated session time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// What kind of interaction occurred.
    pub kind: InteractionKind,
    /// Free-form detail, e.g. "Start" / "End" or the new brush mode.
    pub comment: String,
    /// Session time in seconds when the interaction occurred.
    pub at_seconds: f64,
}

impl InteractionEvent {
    /// Create a new interaction event
    pub fn new(kind: InteractionKind, comment: impl Into<String>, at_seconds: f64) -> Self {
        Self {
            kind,
            comment: comment.into(),
            at_seconds,
        }
    }

    /// Short description for logging
    pub fn description(&self) -> String {
        if self.comment.is_empty() {
            format!("{} at {:.3}s", self.kind, self.at_seconds)
        } else {
            format!("{} {} at {:.3}s", self.kind, self.comment, self.at_seconds)
        }
    }
}

/// Selection-related events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// The set of brushed names changed.
    NamesChanged {
        /// Names now brushed, sorted.
        names: Vec<String>,
    },
    /// Brushed marks were evicted because they were filtered out.
    Evicted {
        /// Number of marks removed from the selection.
        count: usize,
    },
    /// All brushing was removed.
    Cleared,
}

impl SelectionEvent {
    fn description(&self) -> String {
        match self {
            SelectionEvent::NamesChanged { names } => {
                format!("Brushed names: [{}]", names.join(", "))
            }
            SelectionEvent::Evicted { count } => format!("{} filtered marks evicted", count),
            SelectionEvent::Cleared => "Brushing cleared".to_string(),
        }
    }
}

/// Visualization lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VisEvent {
    /// The mark set was rebuilt.
    MarksRebuilt {
        /// Registry generation after the rebuild.
        generation: u64,
        /// Number of marks after the rebuild.
        mark_count: usize,
    },
    /// The set of active entities changed (layout switch).
    EntitiesRebuilt {
        /// Number of distinct entity names.
        name_count: usize,
    },
    /// Filtering was reset to the full domain.
    FilterReset,
}

impl VisEvent {
    fn description(&self) -> String {
        match self {
            VisEvent::MarksRebuilt {
                generation,
                mark_count,
            } => format!("Marks rebuilt (gen {}, {} marks)", generation, mark_count),
            VisEvent::EntitiesRebuilt { name_count } => {
                format!("Entities rebuilt ({} names)", name_count)
            }
            VisEvent::FilterReset => "Filter reset".to_string(),
        }
    }
}
