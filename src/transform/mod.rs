//! Conversions out of the structural model.
//!
//! ```text
//!                ┌─► legacy::to_legacy  ──► LegacyNode  (older evaluator)
//! Program/Expr ──┤
//!                └─► sexp::dump         ──► Sexp ──► text ──► sexp::parse_sexp
//! ```

pub mod legacy;
pub mod sexp;

pub use legacy::{LegacyNode, LegacyTransformer, TransformError, to_legacy};
pub use sexp::{Sexp, SexpError, dump, dump_program, parse_sexp};
