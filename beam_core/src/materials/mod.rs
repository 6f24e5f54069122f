//! # Materials
//!
//! Timber properties and the EN 1995 modification factors used by the
//! verification step.
//!
//! ## Lookup
//!
//! Material data is consumed through the [`MaterialCatalog`] trait so that a
//! project can plug in its own database. [`TimberCatalog`] ships the EN 338
//! solid softwood and EN 14080 glulam classes.
//!
//! | Factor | Depends on | Source |
//! |--------|------------|--------|
//! | kmod   | group, service class, load-duration class | EN 1995-1-1 Table 3.1 |
//! | kdef   | group, service class | EN 1995-1-1 Table 3.2 |
//! | γ_M    | group | EN 1995-1-1 Table 2.3 |
//!
//! ## Example
//!
//! ```rust
//! use beam_core::loads::LoadDurationClass;
//! use beam_core::materials::{MaterialCatalog, ServiceClass, TimberCatalog};
//!
//! let values = TimberCatalog::standard()
//!     .lookup("C24", ServiceClass::One, LoadDurationClass::MediumTerm)
//!     .unwrap();
//! assert_eq!(values.kmod, 0.8);
//! assert_eq!(values.properties.f_m_k, 24_000.0); // kN/m²
//! ```

pub mod timber;

pub use timber::{TimberCatalog, TimberGroup, TimberProperties};

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::loads::LoadDurationClass;

/// Service classes per EN 1995-1-1, 2.3.1.3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServiceClass {
    /// Heated interior (≤ 65 % relative humidity)
    #[default]
    One,
    /// Covered, unheated (≤ 85 % relative humidity)
    Two,
    /// Exposed to weather
    Three,
}

impl ServiceClass {
    /// Numeric label (1, 2, 3)
    pub fn number(&self) -> u8 {
        match self {
            ServiceClass::One => 1,
            ServiceClass::Two => 2,
            ServiceClass::Three => 3,
        }
    }
}

/// kmod per EN 1995-1-1 Table 3.1 (solid timber and glulam)
pub fn kmod(service_class: ServiceClass, duration: LoadDurationClass) -> f64 {
    use LoadDurationClass::*;
    match service_class {
        ServiceClass::One | ServiceClass::Two => match duration {
            Permanent => 0.60,
            LongTerm => 0.70,
            MediumTerm => 0.80,
            ShortTerm => 0.90,
            Instantaneous => 1.10,
        },
        ServiceClass::Three => match duration {
            Permanent => 0.50,
            LongTerm => 0.55,
            MediumTerm => 0.65,
            ShortTerm => 0.70,
            Instantaneous => 0.90,
        },
    }
}

/// kdef per EN 1995-1-1 Table 3.2 (solid timber and glulam)
pub fn kdef(service_class: ServiceClass) -> f64 {
    match service_class {
        ServiceClass::One => 0.60,
        ServiceClass::Two => 0.80,
        ServiceClass::Three => 2.00,
    }
}

/// Everything the verification needs for one strength class in one situation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialValues {
    /// Characteristic properties
    pub properties: TimberProperties,
    /// Modification factor for the load-duration class
    pub kmod: f64,
    /// Creep factor
    pub kdef: f64,
}

/// Read-only material lookup
pub trait MaterialCatalog: Send + Sync {
    /// Characteristic properties of a strength class.
    ///
    /// # Errors
    ///
    /// `MissingCoefficient` if the class is unknown.
    fn properties(&self, strength_class: &str) -> CalcResult<TimberProperties>;

    /// Properties plus kmod and kdef for a service and load-duration class
    fn lookup(
        &self,
        strength_class: &str,
        service_class: ServiceClass,
        duration: LoadDurationClass,
    ) -> CalcResult<MaterialValues> {
        let properties = self.properties(strength_class)?;
        Ok(MaterialValues {
            properties,
            kmod: kmod(service_class, duration),
            kdef: kdef(service_class),
        })
    }
}
