//! Timber strength classes (EN 338:2016, EN 14080:2013)
//!
//! Characteristic values are stored in solver units: strengths and moduli
//! in kN/m² (1 N/mm² = 1000 kN/m²), density in kg/m³.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::MaterialCatalog;
use crate::errors::{CalcError, CalcResult};

const N_PER_MM2: f64 = 1000.0;
const GRAVITY: f64 = 9.81;

/// Product group of a strength class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimberGroup {
    /// Solid softwood, EN 338
    SolidSoftwood,
    /// Glued laminated timber, EN 14080
    Glulam,
}

impl TimberGroup {
    /// Partial factor γ_M per EN 1995-1-1 Table 2.3
    pub fn gamma_m(&self) -> f64 {
        match self {
            TimberGroup::SolidSoftwood => 1.3,
            TimberGroup::Glulam => 1.25,
        }
    }
}

/// Characteristic properties of one strength class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimberProperties {
    /// Strength class name, e.g. "C24"
    pub name: String,
    /// Product group
    pub group: TimberGroup,
    /// Bending strength f_m,k (kN/m²)
    pub f_m_k: f64,
    /// Shear strength f_v,k (kN/m²)
    pub f_v_k: f64,
    /// Mean modulus of elasticity E_0,mean (kN/m²)
    pub e_mean: f64,
    /// Mean density ρ_mean (kg/m³)
    pub density: f64,
    /// Partial factor γ_M
    pub gamma_m: f64,
}

impl TimberProperties {
    /// Create a class from N/mm² strengths and moduli and a kg/m³ density
    pub fn new(name: &str, group: TimberGroup, f_m_k: f64, f_v_k: f64, e_mean: f64, density: f64) -> Self {
        TimberProperties {
            name: name.to_string(),
            group,
            f_m_k: f_m_k * N_PER_MM2,
            f_v_k: f_v_k * N_PER_MM2,
            e_mean: e_mean * N_PER_MM2,
            density,
            gamma_m: group.gamma_m(),
        }
    }

    /// Self-weight per volume (kN/m³)
    pub fn unit_weight(&self) -> f64 {
        self.density * GRAVITY / 1000.0
    }
}

/// Strength class catalogue
#[derive(Debug, Clone, Default)]
pub struct TimberCatalog {
    classes: HashMap<String, TimberProperties>,
}

static STANDARD: Lazy<TimberCatalog> = Lazy::new(|| {
    use TimberGroup::*;
    TimberCatalog::new()
        .with_class(TimberProperties::new("C16", SolidSoftwood, 16.0, 3.2, 8000.0, 370.0))
        .with_class(TimberProperties::new("C24", SolidSoftwood, 24.0, 4.0, 11000.0, 420.0))
        .with_class(TimberProperties::new("C30", SolidSoftwood, 30.0, 4.0, 12000.0, 460.0))
        .with_class(TimberProperties::new("GL24h", Glulam, 24.0, 3.5, 11500.0, 420.0))
        .with_class(TimberProperties::new("GL28h", Glulam, 28.0, 3.5, 12600.0, 460.0))
        .with_class(TimberProperties::new("GL32h", Glulam, 32.0, 3.5, 14200.0, 490.0))
});

impl TimberCatalog {
    /// Create an empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in EN 338 / EN 14080 classes
    pub fn standard() -> &'static TimberCatalog {
        &STANDARD
    }

    /// Builder: add or replace a class (names are case-insensitive)
    pub fn with_class(mut self, properties: TimberProperties) -> Self {
        self.classes.insert(properties.name.to_uppercase(), properties);
        self
    }

    /// Class names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.values().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl MaterialCatalog for TimberCatalog {
    fn properties(&self, strength_class: &str) -> CalcResult<TimberProperties> {
        self.classes
            .get(&strength_class.trim().to_uppercase())
            .cloned()
            .ok_or_else(|| {
                CalcError::missing_coefficient(
                    strength_class,
                    format!("Unknown strength class (available: {})", self.names().join(", ")),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::LoadDurationClass;
    use crate::materials::ServiceClass;
    use approx::assert_relative_eq;

    #[test]
    fn test_c24_properties() {
        let c24 = TimberCatalog::standard().properties("C24").unwrap();
        assert_eq!(c24.f_m_k, 24_000.0);
        assert_eq!(c24.e_mean, 11_000_000.0);
        assert_eq!(c24.gamma_m, 1.3);
        assert_relative_eq!(c24.unit_weight(), 4.1202, epsilon = 1e-4);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let glulam = TimberCatalog::standard().properties("gl28h").unwrap();
        assert_eq!(glulam.name, "GL28h");
        assert_eq!(glulam.group, TimberGroup::Glulam);
        assert_eq!(glulam.gamma_m, 1.25);
    }

    #[test]
    fn test_unknown_class() {
        let result = TimberCatalog::standard().properties("C99");
        assert!(matches!(result, Err(CalcError::MissingCoefficient { .. })));
    }

    #[test]
    fn test_lookup_combines_factors() {
        let values = TimberCatalog::standard()
            .lookup("GL24h", ServiceClass::Two, LoadDurationClass::ShortTerm)
            .unwrap();
        assert_eq!(values.kmod, 0.9);
        assert_eq!(values.kdef, 0.8);
    }

    #[test]
    fn test_custom_class() {
        let catalog = TimberCatalog::new().with_class(TimberProperties::new(
            "D30",
            TimberGroup::SolidSoftwood,
            30.0,
            3.9,
            11000.0,
            640.0,
        ));
        assert_eq!(catalog.names(), vec!["D30"]);
        assert!(catalog.properties("C24").is_err());
    }
}
