//! Domain error types.

/// A parse error with position information for function-call parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    /// Format the error with a caret pointing at the error position in the input.
    ///
    /// Only the line holding the position is echoed, since model replies are
    /// often several lines long.
    pub fn display_with_context(&self, input: &str) -> String {
        let pos = self.position.min(input.len());
        let line_start = input[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = input[pos..]
            .find('\n')
            .map(|i| pos + i)
            .unwrap_or(input.len());
        let caret = " ".repeat(input[line_start..pos].chars().count()) + "^";
        format!(
            "{line}\n{caret}\n{err}",
            line = &input[line_start..line_end],
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for fundchat.
#[derive(Debug, thiserror::Error)]
pub enum FundchatError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to load {path}: {reason}")]
    DataLoad { path: String, reason: String },

    #[error("{path} is missing required column {column}")]
    MissingColumn { path: String, column: String },

    #[error("model service at {url} is unreachable: {reason}")]
    ModelUnavailable { url: String, reason: String },

    #[error("model request timed out after {secs}s")]
    ModelTimeout { secs: u64 },

    #[error("unexpected model response: {reason}")]
    ModelResponse { reason: String },

    #[error("model returned an empty answer")]
    EmptyAnswer,

    #[error(transparent)]
    CallParse(#[from] ParseError),

    #[error("unknown function: {name}")]
    UnknownFunction { name: String },

    #[error("invalid parameter {parameter} for {function}: {reason}")]
    InvalidParameter {
        function: String,
        parameter: String,
        reason: String,
    },

    #[error("no fund named {fund}")]
    FundNotFound { fund: String },

    #[error("{function} returned no data")]
    NoData { function: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FundchatError {
    /// True for failures caused by a reply the router could not turn into a call.
    pub fn is_invalid_call(&self) -> bool {
        matches!(
            self,
            FundchatError::CallParse(_)
                | FundchatError::UnknownFunction { .. }
                | FundchatError::InvalidParameter { .. }
        )
    }
}

impl FundchatError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            FundchatError::Io(_) => 1,
            FundchatError::ConfigParse { .. } | FundchatError::ConfigInvalid { .. } => 2,
            FundchatError::DataLoad { .. } | FundchatError::MissingColumn { .. } => 3,
            FundchatError::ModelUnavailable { .. }
            | FundchatError::ModelTimeout { .. }
            | FundchatError::ModelResponse { .. }
            | FundchatError::EmptyAnswer => 4,
            FundchatError::CallParse(_)
            | FundchatError::UnknownFunction { .. }
            | FundchatError::InvalidParameter { .. } => 5,
            FundchatError::FundNotFound { .. } | FundchatError::NoData { .. } => 6,
        }
    }
}

impl From<&FundchatError> for std::process::ExitCode {
    fn from(err: &FundchatError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
