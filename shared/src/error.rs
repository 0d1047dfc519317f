use thiserror::Error;

/// Reasons a log line did not become a structured event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line does not carry the protocol prefix; expected and frequent.
    #[error("line does not belong to the event protocol")]
    NotThisProtocol,

    #[error("parser not implemented for command {command:?} version {version:?}")]
    ParserNotImplemented {
        command: String,
        version: Option<String>,
    },

    /// The line ended before every declared field was read.
    #[error("line for {command:?} version {version:?} ended before field {field:?}")]
    Truncated {
        command: String,
        version: String,
        field: &'static str,
    },
}

impl ParseError {
    /// True for lines that are simply someone else's log output.
    pub fn is_foreign(&self) -> bool {
        matches!(self, ParseError::NotThisProtocol)
    }
}

/// Failure to locate the entity lump inside a map file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("no \"hammerid\" entries found")]
    NoEntities,

    #[error("could not find entities {0} index")]
    LumpBoundary(&'static str),
}
