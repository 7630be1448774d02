//! S-expression text: a debugging and round-trip form of the model.
//!
//! ```text
//! Expr ──► dump ──► Sexp ──► Display ──► "(= $a (+ 2 2))"
//!                    ▲
//! text ──► SexpLexer (logos) ──► parse_sexp
//! ```
//!
//! Grammar read by [`parse_sexp`]:
//!
//! ```text
//! value := nil | true | false | int | float | string | symbol | :keyword
//!        | '[' value* ']' | '{' (:key value)* '}' | '(' symbol value* ')'
//! ```
//!
//! Strings are double quoted with `\\ \" \n \t \r \oNNN` escapes. `;` starts
//! a comment running to the end of the line.

mod dump;
mod lexer;
mod parse;
mod value;

pub use dump::{dump, dump_program};
pub use parse::{SexpError, parse_sexp};
pub use value::Sexp;
