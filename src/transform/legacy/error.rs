//! Errors raised while converting to the legacy tree.

use std::fmt;

use thiserror::Error;

use crate::base::SourcePosition;
use crate::parser::{ErrorCode, located};

/// A model construct the legacy tree cannot express.
///
/// Every rule reports the variant it rejected; the transformer wraps the
/// first error it sees in [`TransformError::At`] with the position of the
/// innermost positioned node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Resource expressions, defaults, overrides and bodies
    UnsupportedResource { kind: &'static str },
    NoLegacyForm { kind: &'static str },
    IllegalQuery { kind: &'static str },
    IllegalHostname { kind: &'static str },
    IllegalHashKey { kind: &'static str },
    IllegalAssignment { kind: &'static str },
    UnlessWithElse,
    /// A function, method or type name that is not a plain name
    UnacceptableName { role: &'static str, kind: &'static str },
    At {
        position: SourcePosition,
        error: Box<TransformError>,
    },
}

impl TransformError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedResource { .. } => ErrorCode::E0501,
            Self::NoLegacyForm { .. } => ErrorCode::E0502,
            Self::IllegalQuery { .. } => ErrorCode::E0503,
            Self::IllegalHostname { .. } => ErrorCode::E0504,
            Self::IllegalHashKey { .. } => ErrorCode::E0505,
            Self::IllegalAssignment { .. } => ErrorCode::E0506,
            Self::UnlessWithElse => ErrorCode::E0507,
            Self::UnacceptableName { .. } => ErrorCode::E0508,
            Self::At { error, .. } => error.code(),
        }
    }

    /// The message without code or position
    pub fn message(&self) -> String {
        let base = self.code().default_message();
        match self {
            Self::UnsupportedResource { kind }
            | Self::NoLegacyForm { kind }
            | Self::IllegalQuery { kind }
            | Self::IllegalHostname { kind }
            | Self::IllegalHashKey { kind }
            | Self::IllegalAssignment { kind } => format!("{base}: {kind}"),
            Self::UnlessWithElse => base.to_string(),
            Self::UnacceptableName { role, kind } => format!("{base} for {role}: {kind}"),
            Self::At { error, .. } => error.message(),
        }
    }

    pub fn position(&self) -> Option<&SourcePosition> {
        match self {
            Self::At { position, .. } => Some(position),
            _ => None,
        }
    }

    /// The error without its position wrapper
    pub fn inner(&self) -> &TransformError {
        match self {
            Self::At { error, .. } => error.inner(),
            other => other,
        }
    }
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&located(self.code(), &self.message(), self.position()))
    }
}

pub type TransformResult<T> = Result<T, TransformError>;
