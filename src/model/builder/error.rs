//! Error types for model construction.

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::SourcePosition;
use crate::parser::{ErrorCode, located};

/// Errors raised while building model nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Assignment to something that is not a variable, access or list.
    #[error("{}", located(ErrorCode::E0401, &format!("Illegal attempt to assign to '{}'", .kind), .position.as_ref()))]
    IllegalAssignment {
        kind: &'static str,
        position: Option<SourcePosition>,
    },

    /// A named call whose functor is not a name.
    #[error("{}", located(ErrorCode::E0402, &format!("Expression of type {} is not a function name", .kind), .position.as_ref()))]
    NonNameFunctor {
        kind: &'static str,
        position: Option<SourcePosition>,
    },

    /// An argument list following something that cannot be called as a statement.
    #[error("{}", located(ErrorCode::E0403, &args_to_non_call(.name.as_deref()), .position.as_ref()))]
    ArgsToNonCall {
        name: Option<SmolStr>,
        position: Option<SourcePosition>,
    },

    /// A construct the model no longer supports.
    #[error("{}", located(ErrorCode::E0404, &format!("The '{}' construct is not supported", .what), .position.as_ref()))]
    Unsupported {
        what: SmolStr,
        position: Option<SourcePosition>,
    },

    /// A token or raw value that has no expression form.
    #[error("{}", located(ErrorCode::E0405, &format!("{} cannot be used as an expression", .what), .position.as_ref()))]
    NotAnExpression {
        what: String,
        position: Option<SourcePosition>,
    },

    /// Number text the lexer accepted but that does not convert.
    #[error("{}", located(.code, &format!("{}: '{}'", .code.default_message(), .text), .position.as_ref()))]
    Number {
        code: ErrorCode,
        text: SmolStr,
        position: Option<SourcePosition>,
    },
}

fn args_to_non_call(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("'{name}' is not a statement call; it cannot take an argument list"),
        None => "An argument list must follow the name of a statement call".to_string(),
    }
}

impl BuildError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::IllegalAssignment { .. } => ErrorCode::E0401,
            Self::NonNameFunctor { .. } => ErrorCode::E0402,
            Self::ArgsToNonCall { .. } => ErrorCode::E0403,
            Self::Unsupported { .. } => ErrorCode::E0404,
            Self::NotAnExpression { .. } => ErrorCode::E0405,
            Self::Number { code, .. } => *code,
        }
    }

    /// Where the offending node was, if it had a position
    pub fn position(&self) -> Option<&SourcePosition> {
        match self {
            Self::IllegalAssignment { position, .. }
            | Self::NonNameFunctor { position, .. }
            | Self::ArgsToNonCall { position, .. }
            | Self::Unsupported { position, .. }
            | Self::NotAnExpression { position, .. }
            | Self::Number { position, .. } => position.as_ref(),
        }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
