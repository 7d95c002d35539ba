use thiserror::Error;

#[derive(Debug, Error)]
pub enum RehomeError {
    #[error("Input was considered invalid due to error: {0}")]
    InvalidInput(#[from] ConfigurationError),
    #[error("Error identified during annual simulation: {0}")]
    FailureInCalculation(#[from] RehomeCoreError),
    #[error("Error while writing results: {0}")]
    ErrorInOutput(anyhow::Error),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct RehomeCoreError {
    error: anyhow::Error,
}

impl RehomeCoreError {
    pub(crate) fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}

/// Errors raised while building the simulation state from configuration records.
///
/// These are always fatal: they are surfaced before (or at the very start of) an annual
/// computation and stop it.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Unknown {kind} '{value}'")]
    UnknownCategory { kind: &'static str, value: String },
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("Weather series must contain {expected} hourly records, found {found}")]
    WeatherSeriesLength { expected: usize, found: usize },
    #[error("Scenario table has no entry for year {0}")]
    MissingScenarioYear(u32),
    #[error("Component name '{0}' is already used in this system")]
    DuplicateComponent(String),
    #[error("There is no component named '{0}' in this system")]
    UnknownComponent(String),
}

impl ConfigurationError {
    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// An error representing a player action that could not be carried out.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ActionError {
    #[error("Insufficient funds: {cost:.2} Euro needed, {available:.2} Euro available")]
    InsufficientFunds { cost: f64, available: f64 },
    #[error("Invalid action: {0}")]
    Invalid(#[from] ConfigurationError),
}
