use std::fmt;

/// Errors from curve evaluation with out-of-domain parameters
#[derive(Debug, Clone, PartialEq)]
pub enum CurveError {
    /// Curve coefficients must both be strictly positive
    InvalidParameters { a: f64, b: f64 },
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveError::InvalidParameters { a, b } => {
                write!(f, "invalid curve parameters (a={a}, b={b}): both must be > 0")
            }
        }
    }
}

impl std::error::Error for CurveError {}

/// Errors from a budget allocation solve
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// Malformed caller input, detected before any optimization attempt
    InvalidInput(String),
    /// The constraint set is provably empty: channel minimums exceed the budget
    Infeasible {
        total_min_spend: f64,
        total_budget: f64,
    },
    /// The iterative procedure did not reach a success state
    OptimizationFailed(String),
    /// The solver reported success but the independent validator rejected
    /// the result; indicates a tolerance or formulation bug
    SolutionInvalid(String),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            SolveError::Infeasible {
                total_min_spend,
                total_budget,
            } => {
                write!(
                    f,
                    "infeasible: channel minimums ({total_min_spend}) exceed budget ({total_budget})"
                )
            }
            SolveError::OptimizationFailed(msg) => write!(f, "optimization failed: {msg}"),
            SolveError::SolutionInvalid(msg) => write!(f, "solution invalid: {msg}"),
        }
    }
}

impl std::error::Error for SolveError {}

impl From<CurveError> for SolveError {
    fn from(err: CurveError) -> Self {
        SolveError::InvalidInput(err.to_string())
    }
}
