//! Declarative command line arguments parser.
//!
//! Positional arguments, named options and raw flags are declared up front,
//! then any number of token lists can be parsed into typed [`Options`]:
//!
//! ```
//! use argdecl::{Argument, Opt, Parser, Type};
//!
//! let parser = Parser::build(|p| {
//!     p.usage("greet [NAME]")
//!         .argument(Argument::new("name").default("world"))
//!         .option(Opt::new("loud").ty(Type::Boolean).alias("-l"));
//! })
//! .unwrap();
//!
//! let options = parser.parse(["-l", "ferris"]).unwrap();
//! assert_eq!(options.get("name").and_then(|it| it.as_str()), Some("ferris"));
//! assert!(options.is_truthy("loud"));
//! ```
use thiserror::Error;

mod flag;
mod help;
mod options;
mod param;
mod parser;
pub mod rt;
mod value;

pub use crate::{
    flag::Flag,
    help::{Help, HelpConfig},
    options::{Options, UNUSED_ARGUMENTS},
    param::{Argument, Opt, Param, Parameter},
    parser::{Parser, ParserBuilder, Strategy},
    rt::TokenizeError,
    value::{BoxError, Coercion, Type, Value},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A token could not be converted to the declared type.
    #[error("`{label}` received an invalid value")]
    Coercion {
        label: String,
        #[source]
        source: BoxError,
    },
    /// A required parameter has no value after parsing.
    #[error("`{label}` is a required parameter")]
    Validation { label: String },
    /// The tokenizer rejected the input.
    #[error("{0}")]
    Parse(#[from] TokenizeError),
    #[error("unknown parameter: `{0}`")]
    UnknownParameter(String),
    #[error("key not found: `{0}`")]
    KeyNotFound(String),
    /// `--help` was requested, carries the rendered help.
    #[error("{0}")]
    Help(String),
    /// `--version` was requested.
    #[error("{0}")]
    Version(String),
}

impl Error {
    pub fn is_help(&self) -> bool {
        matches!(self, Error::Help(_))
    }

    pub fn is_version(&self) -> bool {
        matches!(self, Error::Version(_))
    }
}

/// A mistake in the declarations themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid type: `{0}`")]
    UnknownType(String),
    #[error("parameter declared more than once: `{0}`")]
    DuplicateName(String),
    #[error("parameter name is reserved: `{0}`")]
    ReservedName(String),
    #[error("flag declared more than once: `{0}`")]
    DuplicateFlag(String),
    #[error("invalid flag spelling: `{0}`")]
    InvalidSpelling(String),
}

/// Declares a parser and parses `argv` with it in one go.
///
/// # Panics
///
/// Panics if the declarations are invalid, see [`ConfigError`].
pub fn parse<I, S, F>(argv: I, configure: F) -> Result<Options>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: FnOnce(&mut ParserBuilder),
{
    let parser = match Parser::build(configure) {
        Ok(it) => it,
        Err(err) => panic!("invalid parser declaration: {err}"),
    };
    parser.parse(argv)
}
