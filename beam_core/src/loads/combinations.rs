//! EN 1990 Load Combinations
//!
//! Builds the ultimate (GZT) and serviceability (GZG) combinations of a set
//! of declared actions.
//!
//! ## Ultimate limit state (6.10)
//!
//! | Name       | Combination |
//! |------------|-------------|
//! | `GZT-1`    | γ_G·ΣG |
//! | `GZT-2/Q`  | γ_G·ΣG + γ_Q·Q (each variable action alone) |
//! | `GZT-3/Q`  | γ_G·ΣG + γ_Q·Q_lead + Σ ψ₀·γ_Q·Q_j (two or more variable actions) |
//!
//! ## Serviceability limit state (6.14 - 6.16)
//!
//! | Name        | Combination |
//! |-------------|-------------|
//! | `GZG-char/Q`| ΣG + Q_lead + Σ ψ₀·Q_j |
//! | `GZG-freq/Q`| ΣG + ψ₁·Q_lead + Σ ψ₂·Q_j |
//! | `GZG-qp/Q`  | ΣG + ψ₂·Q_lead + Σ ψ₂·Q_j |
//! | `GZG-G`     | ΣG (only when no variable action exists) |
//!
//! All full-length permanent actions collapse into one summed line load
//! `g_sum`; positioned permanent loads are kept as separate components.
//! The leading action is the one varied by pattern loading.

use log::debug;
use serde::{Deserialize, Serialize};

use super::actions::{ActionCase, ActionCategory, DesignLoad, LoadDurationClass};
use super::coefficients::{CoefficientSource, PsiFactors};
use crate::errors::{CalcError, CalcResult};

/// Limit state of a combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitState {
    /// GZT - ultimate limit state
    Ultimate,
    /// GZG - serviceability limit state
    Serviceability,
}

impl LimitState {
    /// Short code ("GZT" / "GZG")
    pub fn code(&self) -> &'static str {
        match self {
            LimitState::Ultimate => "GZT",
            LimitState::Serviceability => "GZG",
        }
    }
}

/// Combination family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombinationKind {
    /// Permanent actions only
    PermanentOnly,
    /// Permanent actions and one variable action
    SingleVariable,
    /// Leading variable action with accompanying ψ₀ values
    Fundamental,
    /// Characteristic (rare) serviceability combination
    Characteristic,
    /// Frequent serviceability combination
    Frequent,
    /// Quasi-permanent serviceability combination
    QuasiPermanent,
}

/// Partial safety factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyFactors {
    /// γ_G for unfavourable permanent actions
    pub gamma_g: f64,
    /// γ_Q for variable actions
    pub gamma_q: f64,
}

impl Default for SafetyFactors {
    fn default() -> Self {
        SafetyFactors {
            gamma_g: 1.35,
            gamma_q: 1.5,
        }
    }
}

impl SafetyFactors {
    /// Validate the factors
    pub fn validate(&self) -> CalcResult<()> {
        for (name, value) in [("gamma_g", self.gamma_g), ("gamma_q", self.gamma_q)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalcError::invalid_input(
                    name,
                    value.to_string(),
                    "Partial safety factors must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// One factored action within a combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadComponent {
    /// Action name
    pub action: String,
    /// Total factor applied to the characteristic value (γ·ψ)
    pub factor: f64,
    /// Factored load in beam coordinates
    pub load: DesignLoad,
}

/// A generated load combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    /// Identifier, e.g. "GZT-3/Snow"
    pub name: String,
    /// Report equation, e.g. "1.35·ΣG + 1.50·Snow + 1.05·Live"
    pub label: String,
    /// Limit state
    pub limit_state: LimitState,
    /// Family
    pub kind: CombinationKind,
    /// Name of the leading variable action
    pub leading: Option<String>,
    /// Shortest load-duration class of the contributing actions
    pub duration: LoadDurationClass,
    /// Summed factored full-length permanent line load (kN/m)
    pub g_sum: f64,
    /// Factored positioned permanent loads
    pub permanent: Vec<LoadComponent>,
    /// Factored leading action; only applied on loaded fields of a pattern
    pub leading_load: Option<LoadComponent>,
    /// Factored accompanying actions; applied everywhere
    pub accompanying: Vec<LoadComponent>,
}

impl Combination {
    /// Whether pattern loading changes the result of this combination
    pub fn is_pattern_dependent(&self) -> bool {
        self.leading_load.is_some()
    }

    /// Loads applied on every segment regardless of pattern, `g_sum` excluded
    pub fn fixed_loads(&self) -> impl Iterator<Item = &LoadComponent> {
        self.permanent.iter().chain(self.accompanying.iter())
    }
}

/// A variable action with its resolved coefficients
struct Variable<'a> {
    case: &'a ActionCase,
    psi: PsiFactors,
}

/// Generates EN 1990 combinations from declared actions
pub struct LoadCombinationGenerator<'a> {
    coefficients: &'a dyn CoefficientSource,
    factors: SafetyFactors,
    tributary_width: f64,
}

impl<'a> LoadCombinationGenerator<'a> {
    /// Create a generator
    pub fn new(coefficients: &'a dyn CoefficientSource, factors: SafetyFactors, tributary_width: f64) -> Self {
        LoadCombinationGenerator {
            coefficients,
            factors,
            tributary_width,
        }
    }

    /// Generate all combinations: ultimate first, then serviceability.
    ///
    /// # Errors
    ///
    /// * `Configuration` - no actions declared
    /// * `InvalidInput` - invalid factors, tributary width or duplicate variable names
    /// * `NotSupported` - accidental actions
    /// * `MissingCoefficient` - a variable category has no ψ entry
    pub fn generate(&self, actions: &[ActionCase]) -> CalcResult<Vec<Combination>> {
        self.factors.validate()?;
        if !(self.tributary_width.is_finite() && self.tributary_width > 0.0) {
            return Err(CalcError::invalid_input(
                "tributary_width",
                self.tributary_width.to_string(),
                "Tributary width must be positive",
            ));
        }
        if actions.is_empty() {
            return Err(CalcError::configuration("At least one action is required"));
        }
        if let Some(accidental) = actions.iter().find(|a| a.category == ActionCategory::Accidental) {
            return Err(CalcError::not_supported(format!(
                "accidental combination (action '{}')",
                accidental.name
            )));
        }

        let permanents: Vec<&ActionCase> = actions.iter().filter(|a| a.category.is_permanent()).collect();
        let variables = self.resolve_variables(actions)?;

        let mut combinations = self.ultimate(&permanents, &variables);
        combinations.extend(self.serviceability(&permanents, &variables));

        debug!(
            "generated {} combinations from {} permanent and {} variable actions",
            combinations.len(),
            permanents.len(),
            variables.len()
        );
        Ok(combinations)
    }

    fn resolve_variables<'b>(&self, actions: &'b [ActionCase]) -> CalcResult<Vec<Variable<'b>>> {
        let mut variables: Vec<Variable<'b>> = Vec::new();
        for case in actions.iter().filter(|a| a.category.is_variable()) {
            if variables.iter().any(|v| v.case.name == case.name) {
                return Err(CalcError::invalid_input(
                    "name",
                    case.name.clone(),
                    "Variable action names must be unique",
                ));
            }
            let psi = self.coefficients.psi(&case.category)?;
            variables.push(Variable { case, psi });
        }
        Ok(variables)
    }

    fn ultimate(&self, permanents: &[&ActionCase], variables: &[Variable]) -> Vec<Combination> {
        let gamma_g = self.factors.gamma_g;
        let gamma_q = self.factors.gamma_q;
        let mut combinations = Vec::new();

        if !permanents.is_empty() || variables.is_empty() {
            combinations.push(self.build(
                "GZT-1".to_string(),
                LimitState::Ultimate,
                CombinationKind::PermanentOnly,
                permanents,
                gamma_g,
                None,
                &[],
            ));
        }

        for lead in variables {
            combinations.push(self.build(
                format!("GZT-2/{}", lead.case.name),
                LimitState::Ultimate,
                CombinationKind::SingleVariable,
                permanents,
                gamma_g,
                Some((lead, gamma_q)),
                &[],
            ));
        }

        if variables.len() >= 2 {
            for (l, lead) in variables.iter().enumerate() {
                let others = accompanying_of(variables, l, |p| p.psi0 * gamma_q);
                combinations.push(self.build(
                    format!("GZT-3/{}", lead.case.name),
                    LimitState::Ultimate,
                    CombinationKind::Fundamental,
                    permanents,
                    gamma_g,
                    Some((lead, gamma_q)),
                    &others,
                ));
            }
        }

        combinations
    }

    fn serviceability(&self, permanents: &[&ActionCase], variables: &[Variable]) -> Vec<Combination> {
        if variables.is_empty() {
            return vec![self.build(
                "GZG-G".to_string(),
                LimitState::Serviceability,
                CombinationKind::PermanentOnly,
                permanents,
                1.0,
                None,
                &[],
            )];
        }

        let mut combinations = Vec::with_capacity(3 * variables.len());
        for (l, lead) in variables.iter().enumerate() {
            combinations.push(self.build(
                format!("GZG-char/{}", lead.case.name),
                LimitState::Serviceability,
                CombinationKind::Characteristic,
                permanents,
                1.0,
                Some((lead, 1.0)),
                &accompanying_of(variables, l, |p| p.psi0),
            ));
            combinations.push(self.build(
                format!("GZG-freq/{}", lead.case.name),
                LimitState::Serviceability,
                CombinationKind::Frequent,
                permanents,
                1.0,
                Some((lead, lead.psi.psi1)),
                &accompanying_of(variables, l, |p| p.psi2),
            ));
            combinations.push(self.build(
                format!("GZG-qp/{}", lead.case.name),
                LimitState::Serviceability,
                CombinationKind::QuasiPermanent,
                permanents,
                1.0,
                Some((lead, lead.psi.psi2)),
                &accompanying_of(variables, l, |p| p.psi2),
            ));
        }
        combinations
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        name: String,
        limit_state: LimitState,
        kind: CombinationKind,
        permanents: &[&ActionCase],
        gamma_g: f64,
        lead: Option<(&Variable, f64)>,
        accompanying: &[(&Variable, f64)],
    ) -> Combination {
        let mut g_sum = 0.0;
        let mut permanent = Vec::new();
        for case in permanents {
            let component = self.component(case, gamma_g);
            match component.load {
                DesignLoad::Uniform { w } if case.load.is_full_length() => g_sum += w,
                _ => permanent.push(component),
            }
        }

        let mut terms = Vec::new();
        let mut duration: Option<LoadDurationClass> = None;
        if !permanents.is_empty() {
            terms.push(format!("{:.2}·ΣG", gamma_g));
            duration = Some(LoadDurationClass::Permanent);
        }

        let leading_load = lead.filter(|(_, f)| *f > 0.0).map(|(v, factor)| {
            terms.push(format!("{:.2}·{}", factor, v.case.name));
            duration = duration.max(Some(v.psi.duration));
            self.component(v.case, factor)
        });

        let accompanying = accompanying
            .iter()
            .filter(|(_, f)| *f > 0.0)
            .map(|(v, factor)| {
                terms.push(format!("{:.2}·{}", factor, v.case.name));
                duration = duration.max(Some(v.psi.duration));
                self.component(v.case, *factor)
            })
            .collect();

        let label = if terms.is_empty() { "0".to_string() } else { terms.join(" + ") };

        Combination {
            name,
            label,
            limit_state,
            kind,
            leading: lead.map(|(v, _)| v.case.name.clone()),
            duration: duration.unwrap_or(LoadDurationClass::Permanent),
            g_sum,
            permanent,
            leading_load,
            accompanying,
        }
    }

    fn component(&self, case: &ActionCase, factor: f64) -> LoadComponent {
        LoadComponent {
            action: case.name.clone(),
            factor,
            load: case.load.to_design(factor, self.tributary_width),
        }
    }
}

/// Every variable action except the leading one, with its factor
fn accompanying_of<'v, 'c>(
    variables: &'v [Variable<'c>],
    lead: usize,
    factor: impl Fn(&PsiFactors) -> f64,
) -> Vec<(&'v Variable<'c>, f64)> {
    variables
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != lead)
        .map(|(_, v)| (v, factor(&v.psi)))
        .collect()
}

/// Generate combinations with the default safety factors
pub fn generate_combinations(
    actions: &[ActionCase],
    coefficients: &dyn CoefficientSource,
    tributary_width: f64,
) -> CalcResult<Vec<Combination>> {
    LoadCombinationGenerator::new(coefficients, SafetyFactors::default(), tributary_width).generate(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::actions::ActionLoad;
    use crate::loads::coefficients::PsiTable;
    use approx::assert_relative_eq;

    fn generator(width: f64) -> LoadCombinationGenerator<'static> {
        LoadCombinationGenerator::new(PsiTable::en1990(), SafetyFactors::default(), width)
    }

    fn find<'c>(combinations: &'c [Combination], name: &str) -> &'c Combination {
        combinations
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("missing combination {}", name))
    }

    #[test]
    fn test_two_permanent_actions_sum() {
        let actions = vec![
            ActionCase::permanent_line("Self-weight", 0.4),
            ActionCase::new("Floor build-up", ActionCategory::Permanent, ActionLoad::Area { q: 1.5 }),
        ];
        let combinations = generator(0.8).generate(&actions).unwrap();

        let gzt = find(&combinations, "GZT-1");
        assert_relative_eq!(gzt.g_sum, 1.35 * 0.4 + 1.35 * 1.5 * 0.8, epsilon = 1e-12);
        assert!(gzt.permanent.is_empty());

        let gzg = find(&combinations, "GZG-G");
        assert_relative_eq!(gzg.g_sum, 0.4 + 1.2, epsilon = 1e-12);
        assert_eq!(gzg.duration, LoadDurationClass::Permanent);
    }

    #[test]
    fn test_combination_count() {
        let actions = vec![
            ActionCase::permanent_line("G", 2.0),
            ActionCase::new("Live", ActionCategory::ImposedA, ActionLoad::Area { q: 2.0 }),
            ActionCase::new("Snow", ActionCategory::SnowLow, ActionLoad::Area { q: 1.0 }),
        ];
        let combinations = generator(1.0).generate(&actions).unwrap();
        let ultimate = combinations.iter().filter(|c| c.limit_state == LimitState::Ultimate).count();
        let service = combinations.len() - ultimate;
        // 1 + 2 + 2
        assert_eq!(ultimate, 5);
        // 3 families x 2 leading actions
        assert_eq!(service, 6);
        assert!(!combinations.iter().any(|c| c.name == "GZG-G"));
    }

    #[test]
    fn test_fundamental_accompanying_factor() {
        let actions = vec![
            ActionCase::permanent_line("G", 2.0),
            ActionCase::new("Live", ActionCategory::ImposedA, ActionLoad::Line { w: 3.0 }),
            ActionCase::new("Snow", ActionCategory::SnowLow, ActionLoad::Line { w: 1.0 }),
        ];
        let combinations = generator(1.0).generate(&actions).unwrap();

        let snow_leading = find(&combinations, "GZT-3/Snow");
        assert_eq!(snow_leading.leading.as_deref(), Some("Snow"));
        let lead = snow_leading.leading_load.as_ref().unwrap();
        assert_relative_eq!(lead.factor, 1.5);
        assert_eq!(snow_leading.accompanying.len(), 1);
        // ψ0 = 0.7 for category A
        assert_relative_eq!(snow_leading.accompanying[0].factor, 0.7 * 1.5, epsilon = 1e-12);
        assert_eq!(snow_leading.accompanying[0].load, DesignLoad::Uniform { w: 0.7 * 1.5 * 3.0 });
        assert_eq!(snow_leading.duration, LoadDurationClass::ShortTerm);
        assert_eq!(snow_leading.label, "1.35·ΣG + 1.50·Snow + 1.05·Live");

        let live_alone = find(&combinations, "GZT-2/Live");
        assert!(live_alone.accompanying.is_empty());
        assert_eq!(live_alone.duration, LoadDurationClass::MediumTerm);
    }

    #[test]
    fn test_serviceability_factors() {
        let actions = vec![
            ActionCase::permanent_line("G", 1.0),
            ActionCase::new("Live", ActionCategory::ImposedA, ActionLoad::Line { w: 2.0 }),
            ActionCase::new("Snow", ActionCategory::SnowLow, ActionLoad::Line { w: 1.0 }),
        ];
        let combinations = generator(1.0).generate(&actions).unwrap();

        let freq = find(&combinations, "GZG-freq/Live");
        assert_relative_eq!(freq.g_sum, 1.0);
        assert_relative_eq!(freq.leading_load.as_ref().unwrap().factor, 0.5);
        // ψ2 of snow below 1000 m is zero: not part of the combination
        assert!(freq.accompanying.is_empty());

        let qp = find(&combinations, "GZG-qp/Snow");
        assert!(qp.leading_load.is_none());
        assert_eq!(qp.leading.as_deref(), Some("Snow"));
        assert_relative_eq!(qp.accompanying[0].factor, 0.3);
        assert_eq!(qp.duration, LoadDurationClass::MediumTerm);
    }

    #[test]
    fn test_positioned_permanent_kept_separately() {
        let actions = vec![
            ActionCase::permanent_line("G", 1.0),
            ActionCase::new("Post", ActionCategory::Permanent, ActionLoad::Point { p: 10.0, position: 2.0 }),
        ];
        let combinations = generator(1.0).generate(&actions).unwrap();
        let gzt = find(&combinations, "GZT-1");
        assert_relative_eq!(gzt.g_sum, 1.35);
        assert_eq!(gzt.permanent.len(), 1);
        match gzt.permanent[0].load {
            DesignLoad::Point { p, position } => {
                assert_relative_eq!(p, 13.5, epsilon = 1e-12);
                assert_eq!(position, 2.0);
            }
            other => panic!("unexpected load {:?}", other),
        }
    }

    #[test]
    fn test_missing_coefficient() {
        let actions = vec![
            ActionCase::permanent_line("G", 1.0),
            ActionCase::new("Crane", ActionCategory::Other("Crane".into()), ActionLoad::Line { w: 1.0 }),
        ];
        let result = generator(1.0).generate(&actions);
        assert!(matches!(result, Err(CalcError::MissingCoefficient { .. })));
    }

    #[test]
    fn test_accidental_not_supported() {
        let actions = vec![ActionCase::new("Impact", ActionCategory::Accidental, ActionLoad::Point { p: 50.0, position: 1.0 })];
        let result = generator(1.0).generate(&actions);
        assert!(matches!(result, Err(CalcError::NotSupported { .. })));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(generator(1.0).generate(&[]), Err(CalcError::Configuration { .. })));
        let actions = vec![ActionCase::permanent_line("G", 1.0)];
        assert!(generator(0.0).generate(&actions).is_err());

        let duplicate = vec![
            ActionCase::new("Q", ActionCategory::ImposedA, ActionLoad::Line { w: 1.0 }),
            ActionCase::new("Q", ActionCategory::ImposedB, ActionLoad::Line { w: 1.0 }),
        ];
        assert!(matches!(generator(1.0).generate(&duplicate), Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_variables_without_permanent() {
        let actions = vec![ActionCase::new("Live", ActionCategory::ImposedB, ActionLoad::Line { w: 2.0 })];
        let combinations = generator(1.0).generate(&actions).unwrap();
        assert!(!combinations.iter().any(|c| c.kind == CombinationKind::PermanentOnly));
        assert_eq!(find(&combinations, "GZT-2/Live").label, "1.50·Live");
    }
}
