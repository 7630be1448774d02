//! Crate-level error type.

use thiserror::Error;

use crate::model::builder::BuildError;
use crate::parser::SyntaxError;
use crate::transform::{SexpError, TransformError};

/// Any failure raised by the front end
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Sexp(#[from] SexpError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
