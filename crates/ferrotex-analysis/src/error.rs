use thiserror::Error;

/// Precondition failures surfaced to the host.
///
/// Malformed input is never an error: it only leads to fewer references or
/// reports. These variants mean the answer would be wrong, not empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("the project index is still being built, try again later")]
    IndexNotReady,
    #[error("Main file not found")]
    MainFileMissing,
}
