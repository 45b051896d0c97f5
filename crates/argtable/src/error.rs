//! Error types for parsing, dispatch and table validation.

use thiserror::Error;

use crate::table::ArgDef;

/// What went wrong during a parse or dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownArgument,
    MissingValue,
    MissingRequired,
    InvalidValue,
    DuplicateArgument,
    UnknownCommand,
    /// Not a failure: `--help`/`-h` was seen and help should be rendered.
    ShowHelp,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownArgument => "unknown argument",
            Self::MissingValue => "missing value",
            Self::MissingRequired => "missing required argument",
            Self::InvalidValue => "invalid value",
            Self::DuplicateArgument => "duplicate argument",
            Self::UnknownCommand => "unknown command",
            Self::ShowHelp => "help requested",
        }
    }
}

/// The definition an error refers to, detached from the table's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgLabel {
    pub name: String,
    /// Preferred form, e.g. `--output`, `-o` or `<file>`.
    pub display: String,
}

impl From<&ArgDef> for ArgLabel {
    fn from(def: &ArgDef) -> Self {
        Self {
            name: def.name.clone(),
            display: def.display_name(),
        }
    }
}

/// Everything the formatter needs to describe one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub kind: ErrorKind,
    /// Raw offending token, e.g. `--ouput`.
    pub token: Option<String>,
    /// Matched definition, absent when nothing was resolved.
    pub arg: Option<ArgLabel>,
    /// Raw offending value.
    pub value: Option<String>,
    /// Why a value was rejected.
    pub reason: Option<String>,
    /// Closest known name for unknown arguments and commands.
    pub suggestion: Option<String>,
    /// Display path of the command node that failed (set by dispatch).
    pub command: Option<String>,
}

impl ErrorContext {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            token: None,
            arg: None,
            value: None,
            reason: None,
            suggestion: None,
            command: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_arg(mut self, def: &ArgDef) -> Self {
        self.arg = Some(ArgLabel::from(def));
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }
}

/// Terminal outcome of a failed `parse` or `run`.
///
/// `Display` renders the uncolored message; see [`crate::render_error`] for
/// the `error: ...` form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{context}")]
pub struct ParseError {
    context: Box<ErrorContext>,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        self.context.kind
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    pub fn into_context(self) -> ErrorContext {
        *self.context
    }

    pub fn is_help(&self) -> bool {
        self.kind() == ErrorKind::ShowHelp
    }

    /// Attach the dispatch path, keeping the innermost one if already set.
    pub fn with_command(mut self, path: &str) -> Self {
        if self.context.command.is_none() {
            self.context.command = Some(path.to_string());
        }
        self
    }
}

impl From<ErrorContext> for ParseError {
    fn from(context: ErrorContext) -> Self {
        Self {
            context: Box::new(context),
        }
    }
}

impl From<ErrorKind> for ParseError {
    fn from(kind: ErrorKind) -> Self {
        ErrorContext::new(kind).into()
    }
}

/// Structural problems found in an argument table before any parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("argument #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("positional '{name}' must not declare short or long forms")]
    PositionalWithForms { name: String },
    #[error("argument '{name}' must declare a short or long form")]
    MissingForms { name: String },
    #[error("argument name '{name}' is declared more than once")]
    DuplicateName { name: String },
    #[error("short form '-{short}' is used by both '{first}' and '{second}'")]
    DuplicateShort {
        short: char,
        first: String,
        second: String,
    },
    #[error("long form '--{long}' is used by both '{first}' and '{second}'")]
    DuplicateLong {
        long: String,
        first: String,
        second: String,
    },
    #[error("argument '{name}' declares '{form}', which is reserved for help")]
    ReservedHelp { name: String, form: String },
    #[error("position {position} is used by both '{first}' and '{second}'")]
    DuplicatePosition {
        position: usize,
        first: String,
        second: String,
    },
    #[error("command '{command}': alias '{alias}' collides with sibling '{other}'")]
    CommandAlias {
        command: String,
        alias: String,
        other: String,
    },
    #[error("command '{command}': {source}")]
    InCommand {
        command: String,
        #[source]
        source: Box<TableError>,
    },
}
