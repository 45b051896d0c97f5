//! Argument definitions.
//!
//! A table is an ordered `[ArgDef]`. Tables are built once by the caller,
//! checked with [`crate::validate_table`] (or [`crate::ArgTable::new`]) and
//! then shared read-only by the parser and the help generator.

use std::fmt;
use std::sync::Arc;

/// How an argument is written on the command line and what it records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// `--verbose`, records presence.
    Flag,
    /// `--output FILE`, records a value.
    Option,
    /// Bare token identified by position.
    Positional,
    /// `-vvv`, tallies occurrences.
    Count,
}

impl ArgKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Option => "option",
            Self::Positional => "positional",
            Self::Count => "count",
        }
    }
}

/// Type an option value is converted to at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    Bool,
    #[default]
    String,
    Int,
    Float,
}

impl ValueType {
    /// Placeholder used in help output when no `value_name` is set.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::String => "STRING",
            Self::Int => "INT",
            Self::Float => "FLOAT",
        }
    }

    /// Convert a raw token. The error is a short reason suitable for
    /// `invalid value 'x' for '--n': <reason>`.
    pub fn convert(self, raw: &str) -> Result<Value, String> {
        match self {
            Self::String => Ok(Value::Str(raw.to_string())),
            Self::Int => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| "expected an integer".to_string()),
            Self::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| "expected a number".to_string()),
            Self::Bool => parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| "expected one of: true, false, yes, no, 1, 0".to_string()),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// A converted value, either parsed from argv or declared as a default.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

type ValidatorFn = dyn Fn(&str) -> Result<(), String> + Send + Sync;

/// Custom check run against a raw value after type conversion.
///
/// The `Err` string becomes the reason in the `InvalidValue` message.
#[derive(Clone)]
pub struct Validator(Arc<ValidatorFn>);

impl Validator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Accept only the listed values.
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = values.into_iter().map(Into::into).collect();
        Self::new(move |raw| {
            if allowed.iter().any(|v| v == raw) {
                Ok(())
            } else {
                Err(format!("possible values: {}", allowed.join(", ")))
            }
        })
    }

    pub fn check(&self, raw: &str) -> Result<(), String> {
        (self.0)(raw)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// One declared command-line argument.
#[derive(Debug, Clone)]
pub struct ArgDef {
    pub name: String,
    pub kind: ArgKind,
    pub short: Option<char>,
    pub short_aliases: Vec<char>,
    pub long: Option<String>,
    pub aliases: Vec<String>,
    pub value_type: ValueType,
    pub multiple: bool,
    pub default: Option<Value>,
    pub required: bool,
    pub position: Option<usize>,
    pub validator: Option<Validator>,
    pub help: String,
    pub value_name: Option<String>,
    pub hidden: bool,
}

impl ArgDef {
    fn with_kind(name: impl Into<String>, kind: ArgKind) -> Self {
        Self {
            name: name.into(),
            kind,
            short: None,
            short_aliases: Vec::new(),
            long: None,
            aliases: Vec::new(),
            value_type: ValueType::String,
            multiple: false,
            default: None,
            required: false,
            position: None,
            validator: None,
            help: String::new(),
            value_name: None,
            hidden: false,
        }
    }

    /// Boolean switch recording presence.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::with_kind(name, ArgKind::Flag)
    }

    /// Argument taking one value, `String` typed until
    /// [`ArgDef::value_type`] says otherwise.
    pub fn option(name: impl Into<String>) -> Self {
        Self::with_kind(name, ArgKind::Option)
    }

    /// Switch that tallies how often it was given.
    pub fn count(name: impl Into<String>) -> Self {
        Self::with_kind(name, ArgKind::Count)
    }

    /// Bare token bound to the zero-based `position`.
    pub fn positional(name: impl Into<String>, position: usize) -> Self {
        Self::with_kind(name, ArgKind::Positional).position(position)
    }

    /// Primary short form, `-c`.
    pub fn short(mut self, c: char) -> Self {
        self.short = Some(c);
        self
    }

    /// Extra short form resolving to this definition.
    pub fn short_alias(mut self, c: char) -> Self {
        self.short_aliases.push(c);
        self
    }

    /// Primary long form, without the leading `--`.
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    /// Extra long form resolving to this definition.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn value_type(mut self, ty: ValueType) -> Self {
        self.value_type = ty;
        self
    }

    /// Let an option repeat, collecting every value.
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Value the accessors report when the argument is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Extra check run on the raw value after conversion.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Placeholder shown in help instead of the type name.
    pub fn value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }

    /// Leave the argument out of help. Parsing is unaffected.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn is_positional(&self) -> bool {
        self.kind == ArgKind::Positional
    }

    /// Whether any short, long, or alias form is declared.
    pub fn has_forms(&self) -> bool {
        self.short.is_some()
            || self.long.is_some()
            || !self.short_aliases.is_empty()
            || !self.aliases.is_empty()
    }

    /// Every short character, primary first.
    pub fn shorts(&self) -> impl Iterator<Item = char> + '_ {
        self.short.into_iter().chain(self.short_aliases.iter().copied())
    }

    /// Every long name, primary first.
    pub fn longs(&self) -> impl Iterator<Item = &str> + '_ {
        self.long
            .as_deref()
            .into_iter()
            .chain(self.aliases.iter().map(String::as_str))
    }

    /// Label used in diagnostics: `--long`, else `-s`, else `<name>` for
    /// positionals, else the bare name.
    pub fn display_name(&self) -> String {
        if let Some(long) = self.longs().next() {
            return format!("--{long}");
        }
        if let Some(short) = self.shorts().next() {
            return format!("-{short}");
        }
        if self.is_positional() {
            return format!("<{}>", self.value_label());
        }
        self.name.clone()
    }

    /// Label for values and positionals: `value_name`, else the type
    /// placeholder for options, else the name.
    pub fn value_label(&self) -> String {
        match (&self.value_name, self.kind) {
            (Some(v), _) => v.clone(),
            (None, ArgKind::Positional) => self.name.clone(),
            (None, _) => self.value_type.placeholder().to_string(),
        }
    }
}

/// Position of each positional definition: the declared `position`, or its
/// ordinal among the table's positionals when none is declared.
pub(crate) fn effective_position(table: &[ArgDef], idx: usize) -> Option<usize> {
    let def = table.get(idx)?;
    if !def.is_positional() {
        return None;
    }
    if let Some(p) = def.position {
        return Some(p);
    }
    Some(table[..idx].iter().filter(|d| d.is_positional()).count())
}
