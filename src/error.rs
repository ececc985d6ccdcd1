use thiserror::Error;

/// Error taxonomy for the relay core.
///
/// `Upstream` and `MalformedResponse` are deliberately distinct: the first
/// means the evaluation service was unreachable or refused the call, the
/// second means it answered with a body that breaks the contract.
#[derive(Debug, Error)]
pub enum CvMatchError {
    #[error("Validation; {0}")]
    Validation(String),

    #[error("Evaluation service unavailable; {0}")]
    Upstream(String),

    #[error("Malformed evaluation service response; {0}")]
    MalformedResponse(String),

    #[error("Does not exist; {0}")]
    DoesNotExist(String),

    #[error("IO; {0}")]
    Io(#[from] std::io::Error),
}
