use crate::error::ChemvizError;

/// What happened to a controller operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The response was applied to the session state.
    Applied,
    /// The response arrived after a newer request for the same state and
    /// was dropped.
    Discarded,
    /// Nothing to apply, such as a report with no dataset loaded.
    Skipped,
    /// The operation failed; the status line has already been updated.
    Failed(ChemvizError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded)
    }

    pub fn error(&self) -> Option<&ChemvizError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}
