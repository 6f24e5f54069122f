//! Combination coefficients ψ and load-duration classes
//!
//! The combination generator resolves ψ₀/ψ₁/ψ₂ and the load-duration class of
//! every variable action through a [`CoefficientSource`]. The built-in
//! [`PsiTable::en1990`] carries EN 1990 Table A1.1 (recommended values) with
//! the EN 1995 duration class of each category; a project can start from it
//! and override or add entries.
//!
//! # Example
//! ```
//! use beam_core::loads::{ActionCategory, CoefficientSource, PsiFactors, PsiTable, LoadDurationClass};
//!
//! let table = PsiTable::en1990()
//!     .clone()
//!     .with_entry(
//!         ActionCategory::Other("Crane".into()),
//!         PsiFactors::new(1.0, 0.9, 0.5, LoadDurationClass::ShortTerm),
//!     );
//!
//! let snow = table.psi(&ActionCategory::SnowLow).unwrap();
//! assert_eq!(snow.psi0, 0.5);
//! assert!(table.psi(&ActionCategory::Other("Crane".into())).is_ok());
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::actions::{ActionCategory, LoadDurationClass};
use crate::errors::{CalcError, CalcResult};

/// Combination coefficients of one action category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PsiFactors {
    /// ψ₀ - combination value
    pub psi0: f64,
    /// ψ₁ - frequent value
    pub psi1: f64,
    /// ψ₂ - quasi-permanent value
    pub psi2: f64,
    /// Load-duration class for kmod/kdef
    pub duration: LoadDurationClass,
}

impl PsiFactors {
    /// Create a new set of factors
    pub const fn new(psi0: f64, psi1: f64, psi2: f64, duration: LoadDurationClass) -> Self {
        PsiFactors {
            psi0,
            psi1,
            psi2,
            duration,
        }
    }

    fn validate(&self, key: &str) -> CalcResult<()> {
        for (name, value) in [("psi0", self.psi0), ("psi1", self.psi1), ("psi2", self.psi2)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CalcError::invalid_input(
                    format!("{}.{}", key, name),
                    value.to_string(),
                    "Combination coefficients must lie in [0, 1]",
                ));
            }
        }
        Ok(())
    }
}

/// Read-only lookup of combination coefficients.
///
/// Implementations are shared across worker threads during a run.
pub trait CoefficientSource: Send + Sync {
    /// ψ factors and duration class of a category.
    ///
    /// # Errors
    ///
    /// `MissingCoefficient` if the category is unknown to this source.
    fn psi(&self, category: &ActionCategory) -> CalcResult<PsiFactors>;
}

/// Table-backed coefficient source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PsiTable {
    entries: HashMap<ActionCategory, PsiFactors>,
}

static EN1990_TABLE: Lazy<PsiTable> = Lazy::new(|| {
    use ActionCategory::*;
    use LoadDurationClass::{LongTerm, MediumTerm, ShortTerm};

    PsiTable::new()
        .with_entry(Permanent, PsiFactors::new(1.0, 1.0, 1.0, LoadDurationClass::Permanent))
        .with_entry(ImposedA, PsiFactors::new(0.7, 0.5, 0.3, MediumTerm))
        .with_entry(ImposedB, PsiFactors::new(0.7, 0.5, 0.3, MediumTerm))
        .with_entry(ImposedC, PsiFactors::new(0.7, 0.7, 0.6, ShortTerm))
        .with_entry(ImposedD, PsiFactors::new(0.7, 0.7, 0.6, ShortTerm))
        .with_entry(ImposedE, PsiFactors::new(1.0, 0.9, 0.8, LongTerm))
        .with_entry(ImposedF, PsiFactors::new(0.7, 0.7, 0.6, ShortTerm))
        .with_entry(ImposedG, PsiFactors::new(0.7, 0.5, 0.3, ShortTerm))
        .with_entry(ImposedH, PsiFactors::new(0.0, 0.0, 0.0, ShortTerm))
        .with_entry(SnowLow, PsiFactors::new(0.5, 0.2, 0.0, ShortTerm))
        .with_entry(SnowHigh, PsiFactors::new(0.7, 0.5, 0.2, MediumTerm))
        .with_entry(Wind, PsiFactors::new(0.6, 0.2, 0.0, ShortTerm))
        .with_entry(Temperature, PsiFactors::new(0.6, 0.5, 0.0, ShortTerm))
});

impl PsiTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// EN 1990 Table A1.1 with EN 1995 duration classes (built once)
    pub fn en1990() -> &'static PsiTable {
        &EN1990_TABLE
    }

    /// Builder: insert or replace an entry
    pub fn with_entry(mut self, category: ActionCategory, factors: PsiFactors) -> Self {
        self.entries.insert(category, factors);
        self
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CoefficientSource for PsiTable {
    fn psi(&self, category: &ActionCategory) -> CalcResult<PsiFactors> {
        let factors = self.entries.get(category).copied().ok_or_else(|| {
            CalcError::missing_coefficient(
                category.code(),
                format!("No ψ factors for category '{}'", category.description()),
            )
        })?;
        factors.validate(category.code())?;
        Ok(factors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_en1990_values() {
        let table = PsiTable::en1990();
        let office = table.psi(&ActionCategory::ImposedB).unwrap();
        assert_eq!((office.psi0, office.psi1, office.psi2), (0.7, 0.5, 0.3));
        assert_eq!(office.duration, LoadDurationClass::MediumTerm);

        let storage = table.psi(&ActionCategory::ImposedE).unwrap();
        assert_eq!(storage.psi0, 1.0);
        assert_eq!(storage.duration, LoadDurationClass::LongTerm);

        let wind = table.psi(&ActionCategory::Wind).unwrap();
        assert_eq!(wind.psi2, 0.0);
    }

    #[test]
    fn test_unknown_category_is_missing_coefficient() {
        let result = PsiTable::en1990().psi(&ActionCategory::Other("Crane".into()));
        assert!(matches!(result, Err(CalcError::MissingCoefficient { ref key, .. }) if key == "Crane"));
        assert!(PsiTable::en1990().psi(&ActionCategory::Accidental).is_err());
    }

    #[test]
    fn test_override_entry() {
        let table = PsiTable::en1990()
            .clone()
            .with_entry(ActionCategory::Wind, PsiFactors::new(0.6, 0.5, 0.0, LoadDurationClass::Instantaneous));
        assert_eq!(table.psi(&ActionCategory::Wind).unwrap().psi1, 0.5);
        assert_eq!(table.len(), PsiTable::en1990().len());
    }

    #[test]
    fn test_out_of_range_factor_rejected() {
        let table = PsiTable::new().with_entry(
            ActionCategory::ImposedA,
            PsiFactors::new(1.2, 0.5, 0.3, LoadDurationClass::MediumTerm),
        );
        assert!(matches!(
            table.psi(&ActionCategory::ImposedA),
            Err(CalcError::InvalidInput { .. })
        ));
    }
}
