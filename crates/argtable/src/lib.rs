//! Table-driven command-line argument parsing.
//!
//! Declare arguments once as an ordered `[ArgDef]` and get:
//! - parsing of long, short, combined, attached-value and positional forms
//! - typed values, counts, multi-value options and defaults
//! - required/duplicate/validator checks with precise diagnostics
//! - usage and help text from the same table
//! - recursive subcommand dispatch through [`Command`]
//!
//! ```
//! use argtable::{ArgDef, ArgTable, Parser, ValueType};
//!
//! let table = ArgTable::new(vec![
//!     ArgDef::flag("verbose").short('v').long("verbose"),
//!     ArgDef::option("jobs").short('j').long("jobs").value_type(ValueType::Int).default(1),
//!     ArgDef::positional("input", 0).required(true),
//! ])
//! .expect("valid table");
//!
//! let argv = ["prog", "-v", "--jobs=8", "in.txt"];
//! let mut parser = Parser::new(&table).expect("no form collisions");
//! let args = parser.parse(&argv).expect("valid argv");
//! assert!(args.flag("verbose"));
//! assert_eq!(args.get_int("jobs"), Some(8));
//! assert_eq!(args.get_str("input"), Some("in.txt"));
//! ```

mod command;
mod error;
mod format;
mod help;
mod index;
mod parser;
mod store;
mod table;
mod validate;

pub use command::{Command, Dispatch, Invocation};
pub use error::{ArgLabel, ErrorContext, ErrorKind, ParseError, TableError};
pub use format::{
    ColorChoice, SUGGESTION_THRESHOLD, levenshtein, render_error, suggest, suggest_from,
    write_error,
};
pub use help::{HelpConfig, render_command_help, render_help, usage_line};
pub use index::LookupIndex;
pub use parser::{Parser, is_negative_number};
pub use store::ParsedArgs;
pub use table::{ArgDef, ArgKind, Validator, Value, ValueType};
pub use validate::{ArgTable, validate_table};
