//! Solver-neutral integer program: bounded integer variables with objective
//! coefficients, linear constraints, and an optional warm start.

use std::fmt;

const FEASIBILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Binary,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LessOrEqual => "<=",
            Self::Equal => "=",
            Self::GreaterOrEqual => ">=",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub kind: VariableKind,
    pub lower: i64,
    pub upper: i64,
    pub objective: f64,
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub label: String,
    pub terms: Vec<(VarId, f64)>,
    pub comparison: Comparison,
    pub rhs: f64,
}

impl Constraint {
    fn lhs(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coefficient)| coefficient * values[var.index()])
            .sum()
    }

    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let lhs = self.lhs(values);
        match self.comparison {
            Comparison::LessOrEqual => lhs <= self.rhs + FEASIBILITY_TOLERANCE,
            Comparison::Equal => (lhs - self.rhs).abs() <= FEASIBILITY_TOLERANCE,
            Comparison::GreaterOrEqual => lhs >= self.rhs - FEASIBILITY_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntegerProgram {
    sense: Sense,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    warm_start: Option<Vec<f64>>,
}

impl Default for IntegerProgram {
    fn default() -> Self {
        Self::new(Sense::Minimize)
    }
}

impl IntegerProgram {
    pub fn new(sense: Sense) -> Self {
        Self {
            sense,
            variables: Vec::new(),
            constraints: Vec::new(),
            warm_start: None,
        }
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn add_binary(&mut self, upper: i64, objective: f64) -> VarId {
        self.push_variable(Variable {
            kind: VariableKind::Binary,
            lower: 0,
            upper: upper.clamp(0, 1),
            objective,
        })
    }

    pub fn add_integer(&mut self, lower: i64, upper: i64, objective: f64) -> VarId {
        self.push_variable(Variable {
            kind: VariableKind::Integer,
            lower,
            upper,
            objective,
        })
    }

    fn push_variable(&mut self, variable: Variable) -> VarId {
        self.variables.push(variable);
        VarId(self.variables.len() - 1)
    }

    pub fn add_constraint(
        &mut self,
        label: impl Into<String>,
        terms: Vec<(VarId, f64)>,
        comparison: Comparison,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            label: label.into(),
            terms,
            comparison,
            rhs,
        });
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Attach a known assignment the engine may fall back to.
    pub fn set_warm_start(&mut self, values: Vec<f64>) {
        self.warm_start = Some(values);
    }

    pub fn warm_start(&self) -> Option<&[f64]> {
        self.warm_start.as_deref()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(variable, value)| variable.objective * value)
            .sum()
    }

    /// Describe every bound, integrality, or constraint violation of `values`.
    /// An empty result means the assignment is feasible.
    pub fn violations(&self, values: &[f64]) -> Vec<String> {
        if values.len() != self.variables.len() {
            return vec![format!(
                "assignment has {} values for {} variables",
                values.len(),
                self.variables.len()
            )];
        }
        let mut out = Vec::new();
        for (index, (variable, &value)) in self.variables.iter().zip(values).enumerate() {
            if (value - value.round()).abs() > FEASIBILITY_TOLERANCE {
                out.push(format!("variable {index} = {value} is not integral"));
            }
            if value < variable.lower as f64 - FEASIBILITY_TOLERANCE
                || value > variable.upper as f64 + FEASIBILITY_TOLERANCE
            {
                out.push(format!(
                    "variable {index} = {value} outside [{}, {}]",
                    variable.lower, variable.upper
                ));
            }
        }
        for constraint in &self.constraints {
            if !constraint.is_satisfied(values) {
                out.push(format!(
                    "{}: {} {} {} violated",
                    constraint.label,
                    constraint.lhs(values),
                    constraint.comparison,
                    constraint.rhs
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_upper_bound_is_clamped() {
        let mut program = IntegerProgram::default();
        let open = program.add_binary(1, 1.0);
        let closed = program.add_binary(0, 1.0);
        let wide = program.add_binary(5, 1.0);
        assert_eq!(program.variables()[open.index()].upper, 1);
        assert_eq!(program.variables()[closed.index()].upper, 0);
        assert_eq!(program.variables()[wide.index()].upper, 1);
        assert_eq!(program.sense(), Sense::Minimize);
    }

    #[test]
    fn violations_report_bounds_and_constraints() {
        let mut program = IntegerProgram::default();
        let x = program.add_binary(1, 3.0);
        let y = program.add_binary(1, 2.0);
        let u = program.add_integer(0, 4, 0.0);
        program.add_constraint(
            "pick one",
            vec![(x, 1.0), (y, 1.0)],
            Comparison::Equal,
            1.0,
        );
        program.add_constraint("u cap", vec![(u, 1.0)], Comparison::LessOrEqual, 3.0);

        assert!(program.violations(&[1.0, 0.0, 2.0]).is_empty());
        assert_eq!(program.objective_value(&[1.0, 0.0, 2.0]), 3.0);

        let broken = program.violations(&[1.0, 1.0, 4.0]);
        assert_eq!(broken.len(), 2, "{broken:?}");
        assert!(broken[0].starts_with("pick one"));
        assert!(broken[1].starts_with("u cap"));

        let fractional = program.violations(&[0.5, 0.5, 7.0]);
        assert!(fractional.iter().any(|v| v.contains("not integral")));
        assert!(fractional.iter().any(|v| v.contains("outside [0, 4]")));

        assert_eq!(program.violations(&[1.0]).len(), 1);
    }
}
