use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Per-entry validation failure.
///
/// These never escape the validator as `Err`: they are attached to the
/// offending entry's `address_error` / `label_error` fields so the caller
/// can surface every problem at once. An entry set carrying any of these
/// blocks plan construction entirely.
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ValidationError {
    #[error("not a valid account address")]
    InvalidAddress,

    #[error("malformed name")]
    MalformedName,

    #[error("name does not belong under '{parent}'")]
    ParentMismatch { parent: String },

    #[error("no parent name selected")]
    MissingParent,

    #[error("duplicate of another entry")]
    Duplicate,
}

#[derive(Error, Debug)]
pub enum PlannerError {
    // Planning errors: surfaced before any step exists.
    #[error("root name is empty")]
    EmptyRootName,

    #[error("no valid entries to plan")]
    NoValidEntries,

    #[error("{0} entries carry validation errors")]
    ValidationBlocked(usize),

    #[error("network {0} is not supported by the chain adapter")]
    UnsupportedNetwork(crate::types::NetworkId),

    // Step execution errors.
    #[error("signer rejected the request: {0}")]
    SignerRejected(String),

    #[error("timed out waiting for wallet to switch to network {0}")]
    NetworkSwitchTimeout(crate::types::NetworkId),

    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    #[error("confirmation failed: {0}")]
    ConfirmationFailed(String),

    #[error("a plan for root '{0}' is already executing")]
    PlanAlreadyRunning(String),

    /// Plan halted at `index`. `partially_applied` is set when at least one
    /// earlier step already reached the chain; those effects are not rolled
    /// back and the caller must treat the plan as partially applied.
    #[error("step {index} failed: {source}")]
    StepFailed {
        index: usize,
        partially_applied: bool,
        #[source]
        source: Box<PlannerError>,
    },

    #[error("cannot encode step: {0}")]
    Encode(String),

    // Ambient conversions.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for PlannerError {
    fn from(s: String) -> Self {
        PlannerError::Other(s)
    }
}

impl From<&str> for PlannerError {
    fn from(s: &str) -> Self {
        PlannerError::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::ParentMismatch {
            parent: "example.eth".to_string(),
        };
        assert_eq!(err.to_string(), "name does not belong under 'example.eth'");
    }

    #[test]
    fn test_step_failed_carries_index() {
        let err = PlannerError::StepFailed {
            index: 3,
            partially_applied: true,
            source: Box::new(PlannerError::SubmissionFailed("reverted".into())),
        };
        assert!(err.to_string().contains("step 3"));
    }
}
