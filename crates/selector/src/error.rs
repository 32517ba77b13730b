use scene::SourceId;

/// Why a selection transaction was rejected. Nothing is mutated or notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The mode string is not one of `SET`, `ADD`, `REMOVE`.
    InvalidMode(String),
    /// SET or ADD named sources that are not visible.
    VisibilityViolation { hidden: Vec<SourceId> },
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionError::InvalidMode(mode) => {
                write!(f, "unhandled selection mode {mode:?}")
            }
            SelectionError::VisibilityViolation { hidden } => {
                write!(f, "attempt to select sources which are not visible:")?;
                for id in hidden {
                    write!(f, " {id}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SelectionError {}

#[cfg(test)]
mod tests {
    use super::SelectionError;
    use scene::SourceId;

    #[test]
    fn display_names_hidden_sources() {
        let err = SelectionError::VisibilityViolation {
            hidden: vec![SourceId(3), SourceId(7)],
        };
        assert_eq!(
            err.to_string(),
            "attempt to select sources which are not visible: source#3 source#7"
        );
        assert_eq!(
            SelectionError::InvalidMode("XOR".into()).to_string(),
            "unhandled selection mode \"XOR\""
        );
    }
}
