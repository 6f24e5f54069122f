//! Action definitions per EN 1990
//!
//! An [`ActionCase`] is one declared characteristic action on the beam: its
//! category (which selects the ψ factors and the load-duration class) and
//! its load shape in beam coordinates.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Action categories per EN 1990 Table A1.1
///
/// # Example
/// ```
/// use beam_core::loads::ActionCategory;
///
/// assert_eq!(ActionCategory::ImposedA.code(), "A");
/// assert!(ActionCategory::SnowLow.is_variable());
/// assert!(!ActionCategory::Permanent.is_variable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCategory {
    /// G - Self-weight and other permanent actions
    Permanent,
    /// Imposed load, category A (domestic, residential)
    ImposedA,
    /// Imposed load, category B (offices)
    ImposedB,
    /// Imposed load, category C (congregation areas)
    ImposedC,
    /// Imposed load, category D (shopping areas)
    ImposedD,
    /// Imposed load, category E (storage areas)
    ImposedE,
    /// Imposed load, category F (traffic, vehicle weight ≤ 30 kN)
    ImposedF,
    /// Imposed load, category G (traffic, 30 kN < vehicle weight ≤ 160 kN)
    ImposedG,
    /// Imposed load, category H (roofs)
    ImposedH,
    /// Snow, site altitude ≤ 1000 m
    SnowLow,
    /// Snow, site altitude > 1000 m
    SnowHigh,
    /// Wind
    Wind,
    /// Temperature (non-fire)
    Temperature,
    /// Accidental action
    Accidental,
    /// User-defined variable category; needs its own ψ entry
    Other(String),
}

impl ActionCategory {
    /// Short code used in combination labels
    pub fn code(&self) -> &str {
        match self {
            ActionCategory::Permanent => "G",
            ActionCategory::ImposedA => "A",
            ActionCategory::ImposedB => "B",
            ActionCategory::ImposedC => "C",
            ActionCategory::ImposedD => "D",
            ActionCategory::ImposedE => "E",
            ActionCategory::ImposedF => "F",
            ActionCategory::ImposedG => "G_traffic",
            ActionCategory::ImposedH => "H",
            ActionCategory::SnowLow => "S",
            ActionCategory::SnowHigh => "S_high",
            ActionCategory::Wind => "W",
            ActionCategory::Temperature => "T",
            ActionCategory::Accidental => "Ad",
            ActionCategory::Other(name) => name,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        match self {
            ActionCategory::Permanent => "Permanent action",
            ActionCategory::ImposedA => "Imposed load, domestic/residential",
            ActionCategory::ImposedB => "Imposed load, offices",
            ActionCategory::ImposedC => "Imposed load, congregation areas",
            ActionCategory::ImposedD => "Imposed load, shopping areas",
            ActionCategory::ImposedE => "Imposed load, storage areas",
            ActionCategory::ImposedF => "Traffic, vehicle weight ≤ 30 kN",
            ActionCategory::ImposedG => "Traffic, vehicle weight ≤ 160 kN",
            ActionCategory::ImposedH => "Imposed load, roofs",
            ActionCategory::SnowLow => "Snow, altitude ≤ 1000 m",
            ActionCategory::SnowHigh => "Snow, altitude > 1000 m",
            ActionCategory::Wind => "Wind",
            ActionCategory::Temperature => "Temperature",
            ActionCategory::Accidental => "Accidental action",
            ActionCategory::Other(name) => name,
        }
    }

    /// Whether this is a permanent action
    pub fn is_permanent(&self) -> bool {
        matches!(self, ActionCategory::Permanent)
    }

    /// Whether this is a variable action
    pub fn is_variable(&self) -> bool {
        !matches!(self, ActionCategory::Permanent | ActionCategory::Accidental)
    }
}

/// Load-duration classes per EN 1995-1-1, 2.3.1.2
///
/// Ordered from the longest to the shortest duration, so `max()` over a set
/// of classes yields the shortest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoadDurationClass {
    /// More than 10 years
    Permanent,
    /// 6 months to 10 years
    LongTerm,
    /// 1 week to 6 months
    MediumTerm,
    /// Less than one week
    ShortTerm,
    /// Instantaneous
    Instantaneous,
}

impl LoadDurationClass {
    /// All classes, longest first
    pub const ALL: [LoadDurationClass; 5] = [
        LoadDurationClass::Permanent,
        LoadDurationClass::LongTerm,
        LoadDurationClass::MediumTerm,
        LoadDurationClass::ShortTerm,
        LoadDurationClass::Instantaneous,
    ];

    /// Label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            LoadDurationClass::Permanent => "permanent",
            LoadDurationClass::LongTerm => "long-term",
            LoadDurationClass::MediumTerm => "medium-term",
            LoadDurationClass::ShortTerm => "short-term",
            LoadDurationClass::Instantaneous => "instantaneous",
        }
    }
}

/// Shape of a characteristic action, positions from the left beam end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionLoad {
    /// Area load (kN/m²) over the full length, multiplied by the tributary width
    Area { q: f64 },
    /// Line load (kN/m) over the full length
    Line { w: f64 },
    /// Point load (kN) at `position`
    Point { p: f64, position: f64 },
    /// Line load (kN/m) over [start, end]
    Patch { w: f64, start: f64, end: f64 },
    /// Concentrated couple (kNm, counter-clockwise positive) at `position`
    Moment { m: f64, position: f64 },
}

impl ActionLoad {
    /// Factored design load in line-load units
    pub fn to_design(&self, factor: f64, tributary_width: f64) -> DesignLoad {
        match *self {
            ActionLoad::Area { q } => DesignLoad::Uniform {
                w: factor * q * tributary_width,
            },
            ActionLoad::Line { w } => DesignLoad::Uniform { w: factor * w },
            ActionLoad::Point { p, position } => DesignLoad::Point {
                p: factor * p,
                position,
            },
            ActionLoad::Patch { w, start, end } => DesignLoad::Patch {
                w: factor * w,
                start,
                end,
            },
            ActionLoad::Moment { m, position } => DesignLoad::Moment {
                m: factor * m,
                position,
            },
        }
    }

    /// Whether the load covers the whole beam uniformly
    pub fn is_full_length(&self) -> bool {
        matches!(self, ActionLoad::Area { .. } | ActionLoad::Line { .. })
    }
}

/// Factored load of a combination in beam coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DesignLoad {
    /// Line load (kN/m) over every segment it is applied to
    Uniform { w: f64 },
    /// Point load (kN) at `position`
    Point { p: f64, position: f64 },
    /// Line load (kN/m) over [start, end]
    Patch { w: f64, start: f64, end: f64 },
    /// Concentrated couple (kNm, counter-clockwise positive) at `position`
    Moment { m: f64, position: f64 },
}

/// A declared characteristic action
///
/// # Example
/// ```
/// use beam_core::loads::{ActionCase, ActionCategory, ActionLoad};
///
/// let snow = ActionCase::new("Snow", ActionCategory::SnowLow, ActionLoad::Area { q: 0.85 });
/// assert!(snow.validate(10.0).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCase {
    /// Name used in combination labels and reports
    pub name: String,
    /// Action category (ψ lookup key)
    pub category: ActionCategory,
    /// Characteristic load
    pub load: ActionLoad,
}

impl ActionCase {
    /// Create a new action case
    pub fn new(name: impl Into<String>, category: ActionCategory, load: ActionLoad) -> Self {
        ActionCase {
            name: name.into(),
            category,
            load,
        }
    }

    /// Permanent full-length line load
    pub fn permanent_line(name: impl Into<String>, w: f64) -> Self {
        Self::new(name, ActionCategory::Permanent, ActionLoad::Line { w })
    }

    /// Validate magnitudes and positions against a beam of the given length
    pub fn validate(&self, beam_length: f64) -> CalcResult<()> {
        let field = |name: &str| format!("{}.{}", self.name, name);
        let check_position = |name: &str, position: f64| {
            if !(position.is_finite() && (0.0..=beam_length).contains(&position)) {
                return Err(CalcError::invalid_input(
                    field(name),
                    position.to_string(),
                    format!("Position must lie on the beam [0, {}]", beam_length),
                ));
            }
            Ok(())
        };

        let magnitude = match self.load {
            ActionLoad::Area { q } => q,
            ActionLoad::Line { w } => w,
            ActionLoad::Point { p, position } => {
                check_position("position", position)?;
                p
            }
            ActionLoad::Patch { w, start, end } => {
                check_position("start", start)?;
                check_position("end", end)?;
                if end <= start {
                    return Err(CalcError::invalid_input(
                        field("end"),
                        end.to_string(),
                        "Patch end must be greater than its start",
                    ));
                }
                w
            }
            ActionLoad::Moment { m, position } => {
                check_position("position", position)?;
                m
            }
        };

        if !magnitude.is_finite() {
            return Err(CalcError::invalid_input(
                field("magnitude"),
                magnitude.to_string(),
                "Characteristic value must be finite",
            ));
        }
        Ok(())
    }
}
