//! Error rendering and "did you mean" suggestions.

use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::str::FromStr;

use console::Style;

use crate::error::{ErrorContext, ErrorKind, ParseError};
use crate::table::ArgDef;

/// Largest edit distance still offered as a suggestion.
pub const SUGGESTION_THRESHOLD: usize = 3;

/// When to emit ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    Never,
    #[default]
    Auto,
    Always,
}

impl ColorChoice {
    /// `Auto` follows `is_terminal`.
    pub fn resolve(self, is_terminal: bool) -> bool {
        match self {
            Self::Never => false,
            Self::Auto => is_terminal,
            Self::Always => true,
        }
    }

    pub fn resolve_for<T: IsTerminal>(self, stream: &T) -> bool {
        self.resolve(stream.is_terminal())
    }
}

impl FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(Self::Never),
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            other => Err(format!("unknown color choice '{other}' (expected never, auto or always)")),
        }
    }
}

/// Styles for diagnostics; every style is a no-op when disabled.
#[derive(Debug, Clone)]
pub(crate) struct Palette {
    enabled: bool,
}

impl Palette {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.enabled {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub(crate) fn error(&self, text: &str) -> String {
        self.paint(Style::new().red().bold(), text)
    }

    pub(crate) fn literal(&self, text: &str) -> String {
        self.paint(Style::new().yellow(), text)
    }

    pub(crate) fn good(&self, text: &str) -> String {
        self.paint(Style::new().green(), text)
    }

    pub(crate) fn header(&self, text: &str) -> String {
        self.paint(Style::new().bold().underlined(), text)
    }
}

fn message(ctx: &ErrorContext, p: &Palette) -> String {
    let quoted = |s: &str| format!("'{}'", p.literal(s));
    let token = ctx.token.as_deref().unwrap_or("");
    let arg = ctx
        .arg
        .as_ref()
        .map(|a| a.display.as_str())
        .unwrap_or(token);
    let value = ctx.value.as_deref().unwrap_or("");

    match ctx.kind {
        ErrorKind::UnknownArgument => match &ctx.reason {
            Some(reason) => format!("unknown argument {} ({reason})", quoted(token)),
            None => format!("unknown argument {}", quoted(token)),
        },
        ErrorKind::MissingValue => {
            format!("a value is required for {} but none was supplied", quoted(arg))
        }
        ErrorKind::MissingRequired => {
            format!("the required argument {} was not provided", quoted(arg))
        }
        ErrorKind::InvalidValue => match &ctx.reason {
            Some(reason) => format!("invalid value {} for {}: {reason}", quoted(value), quoted(arg)),
            None => format!("invalid value {} for {}", quoted(value), quoted(arg)),
        },
        ErrorKind::DuplicateArgument => match &ctx.reason {
            // table collision found while binding
            Some(reason) => format!("{} is {reason}", quoted(token)),
            None => format!("the argument {} cannot be used multiple times", quoted(arg)),
        },
        ErrorKind::UnknownCommand => format!("unrecognized subcommand {}", quoted(token)),
        ErrorKind::ShowHelp => "help requested".to_string(),
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&message(self, &Palette::new(false)))
    }
}

/// Render `error: <message>`, plus a suggestion line when one exists.
pub fn render_error(err: &ParseError, color: bool) -> String {
    let p = Palette::new(color);
    let ctx = err.context();
    let mut out = format!("{} {}\n", p.error("error:"), message(ctx, &p));
    if let Some(suggestion) = &ctx.suggestion {
        let what = match ctx.kind {
            ErrorKind::UnknownCommand => "subcommand",
            _ => "argument",
        };
        out.push_str(&format!(
            "\n  {} a similar {what} exists: '{}'\n",
            p.good("tip:"),
            p.good(suggestion)
        ));
    }
    out
}

/// Write [`render_error`] output to `sink`, resolving `color` against `is_terminal`.
pub fn write_error<W: Write>(
    sink: &mut W,
    err: &ParseError,
    color: ColorChoice,
    is_terminal: bool,
) -> io::Result<()> {
    sink.write_all(render_error(err, color.resolve(is_terminal)).as_bytes())
}

/// Closest long name (or alias) of `table` to `token`, within
/// [`SUGGESTION_THRESHOLD`] edits. Ties go to the earlier definition.
pub fn suggest<'t>(token: &str, table: &'t [ArgDef]) -> Option<&'t str> {
    suggest_from(token, table.iter().flat_map(|def| def.longs()))
}

/// [`suggest`] over an arbitrary candidate list.
pub fn suggest_from<'c, I>(token: &str, candidates: I) -> Option<&'c str>
where
    I: IntoIterator<Item = &'c str>,
{
    let mut best: Option<(usize, &'c str)> = None;
    for candidate in candidates {
        let distance = levenshtein(token, candidate);
        if distance > SUGGESTION_THRESHOLD {
            continue;
        }
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, c)| c)
}

/// Edit distance over chars (insert, delete, substitute).
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}
