//! The parsing engine.
//!
//! Tokens are classified left to right:
//! - `--help` / `-h` anywhere short-circuits to [`ErrorKind::ShowHelp`]
//! - `--` ends option parsing; everything after it is positional
//! - `--name`, `--name value`, `--name=value`
//! - `-x`, `-x value`, `-xvalue`, `-xyz`
//! - anything else, including negative numbers like `-12` or `-0.5`, is positional
//!
//! Parsing is fail-fast: the first error aborts and becomes the parser's
//! [`Parser::last_error`].

use crate::error::{ErrorContext, ErrorKind, ParseError};
use crate::format::suggest;
use crate::index::LookupIndex;
use crate::store::ParsedArgs;
use crate::table::{ArgDef, ArgKind, effective_position};

/// A table bound to its lookup index.
#[derive(Debug, Clone)]
pub struct Parser<'t> {
    table: &'t [ArgDef],
    index: LookupIndex,
    last_error: Option<ErrorContext>,
}

impl<'t> Parser<'t> {
    /// Bind a table. Fails with `DuplicateArgument` if two definitions share
    /// a short or long form.
    pub fn new(table: &'t [ArgDef]) -> Result<Self, ParseError> {
        Ok(Self {
            table,
            index: LookupIndex::build(table)?,
            last_error: None,
        })
    }

    pub fn table(&self) -> &'t [ArgDef] {
        self.table
    }

    /// Context of the most recent failed `parse`, cleared by the next call.
    pub fn last_error(&self) -> Option<&ErrorContext> {
        self.last_error.as_ref()
    }

    /// Parse `argv`. `argv[0]` is the program name and is skipped.
    ///
    /// Every call starts from an empty result, so reusing a parser never
    /// leaks values from an earlier vector.
    pub fn parse<'a, S: AsRef<str>>(&mut self, argv: &'a [S]) -> Result<ParsedArgs<'a>, ParseError> {
        self.last_error = None;
        let result = Session::new(self.table, &self.index, argv).run();
        if let Err(err) = &result {
            tracing::debug!(kind = err.kind().as_str(), "parse failed: {err}");
            self.last_error = Some(err.context().clone());
        }
        result
    }
}

/// Whether `token` is `-` followed by a digit, then digits with at most one `.`.
pub fn is_negative_number(token: &str) -> bool {
    let Some(rest) = token.strip_prefix('-') else {
        return false;
    };
    let mut chars = rest.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }
    let mut seen_dot = false;
    for c in chars {
        match c {
            '.' if !seen_dot => seen_dot = true,
            c if c.is_ascii_digit() => {}
            _ => return false,
        }
    }
    true
}

pub(crate) fn is_help_token(token: &str) -> bool {
    token == "--help" || token == "-h"
}

struct Session<'p, 'a, S> {
    table: &'p [ArgDef],
    index: &'p LookupIndex,
    argv: &'a [S],
    pos: usize,
    stop_parsing: bool,
    out: ParsedArgs<'a>,
}

impl<'p, 'a, S: AsRef<str>> Session<'p, 'a, S> {
    fn new(table: &'p [ArgDef], index: &'p LookupIndex, argv: &'a [S]) -> Self {
        Self {
            table,
            index,
            argv,
            pos: 1,
            stop_parsing: false,
            out: ParsedArgs::default(),
        }
    }

    fn run(mut self) -> Result<ParsedArgs<'a>, ParseError> {
        if self.argv.iter().skip(1).any(|t| is_help_token(t.as_ref())) {
            return Err(ErrorKind::ShowHelp.into());
        }

        while let Some(token) = self.next_token() {
            if token == "--" {
                self.stop_parsing = true;
                continue;
            }
            if self.stop_parsing {
                tracing::trace!(token, "positional after terminator");
                self.out.push_positional(token);
            } else if let Some(body) = token.strip_prefix("--") {
                tracing::trace!(token, "long option");
                self.long(token, body)?;
            } else if token.len() > 1 && token.starts_with('-') && !is_negative_number(token) {
                tracing::trace!(token, "short option");
                self.short(token)?;
            } else {
                tracing::trace!(token, "positional");
                self.out.push_positional(token);
            }
        }

        self.finish()?;
        Ok(self.out)
    }

    fn next_token(&mut self) -> Option<&'a str> {
        let argv = self.argv;
        let token = argv.get(self.pos)?.as_ref();
        self.pos += 1;
        Some(token)
    }

    fn long(&mut self, token: &'a str, body: &'a str) -> Result<(), ParseError> {
        let (name, attached) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let Some(idx) = self.index.long(name) else {
            return Err(self.unknown(&format!("--{name}")));
        };
        let table = self.table;
        let def = &table[idx];
        match (def.kind, attached) {
            (ArgKind::Flag, _) => self.out.set_flag(&def.name),
            (ArgKind::Count, _) => self.out.bump_count(&def.name),
            (ArgKind::Option, Some(value)) => self.record_value(def, token, value)?,
            (ArgKind::Option, None) => {
                let value = self.next_value(def, token)?;
                self.record_value(def, token, value)?;
            }
            (ArgKind::Positional, _) => return Err(self.unknown(&format!("--{name}"))),
        }
        Ok(())
    }

    fn short(&mut self, token: &'a str) -> Result<(), ParseError> {
        let body = &token[1..];
        let Some(first) = body.chars().next() else {
            return Err(self.unknown(token));
        };
        let rest = &body[first.len_utf8()..];
        let Some(idx) = self.index.short(first) else {
            return Err(self.unknown(&format!("-{first}")));
        };
        let table = self.table;
        let def = &table[idx];

        if rest.is_empty() {
            match def.kind {
                ArgKind::Flag => self.out.set_flag(&def.name),
                ArgKind::Count => self.out.bump_count(&def.name),
                ArgKind::Option => {
                    let value = self.next_value(def, token)?;
                    self.record_value(def, token, value)?;
                }
                ArgKind::Positional => return Err(self.unknown(token)),
            }
            return Ok(());
        }

        // -ofile
        if def.kind == ArgKind::Option {
            return self.record_value(def, token, rest);
        }

        // -vqf
        for c in body.chars() {
            let form = format!("-{c}");
            let Some(idx) = self.index.short(c) else {
                return Err(self.unknown(&form));
            };
            let def = &table[idx];
            match def.kind {
                ArgKind::Flag => self.out.set_flag(&def.name),
                ArgKind::Count => self.out.bump_count(&def.name),
                ArgKind::Option | ArgKind::Positional => {
                    return Err(ErrorContext::new(ErrorKind::UnknownArgument)
                        .with_token(form)
                        .with_reason(format!("'{token}' may only combine flags"))
                        .into());
                }
            }
        }
        Ok(())
    }

    fn next_value(&mut self, def: &ArgDef, token: &str) -> Result<&'a str, ParseError> {
        self.next_token().ok_or_else(|| {
            ErrorContext::new(ErrorKind::MissingValue)
                .with_token(token)
                .with_arg(def)
                .into()
        })
    }

    /// Convert, cache, validate, then store.
    fn record_value(&mut self, def: &ArgDef, token: &str, raw: &'a str) -> Result<(), ParseError> {
        let typed = def
            .value_type
            .convert(raw)
            .map_err(|reason| invalid_value(def, raw, reason))?;
        self.out.cache_typed(&def.name, typed);

        if let Some(validator) = &def.validator {
            validator
                .check(raw)
                .map_err(|reason| invalid_value(def, raw, reason))?;
        }

        if !def.multiple && self.out.has_value(&def.name) {
            return Err(ErrorContext::new(ErrorKind::DuplicateArgument)
                .with_token(token)
                .with_arg(def)
                .with_value(raw)
                .into());
        }

        self.out.record(&def.name, raw, def.multiple);
        Ok(())
    }

    fn unknown(&self, token: &str) -> ParseError {
        let suggestion = token
            .strip_prefix("--")
            .and_then(|name| suggest(name, self.table))
            .map(|name| format!("--{name}"));
        ErrorContext::new(ErrorKind::UnknownArgument)
            .with_token(token)
            .with_suggestion(suggestion)
            .into()
    }

    fn finish(&mut self) -> Result<(), ParseError> {
        let table = self.table;

        for (idx, def) in table.iter().enumerate() {
            let position = effective_position(table, idx);
            if let Some(p) = position {
                self.out.bind_positional(&def.name, p);
            }
            let supplied = position.is_some_and(|p| self.out.positional(p).is_some());
            if let (Some(default), false) = (&def.default, supplied) {
                self.out.set_default(&def.name, default.clone());
            }
        }

        for (idx, def) in table.iter().enumerate() {
            if !def.required {
                continue;
            }
            let satisfied = match def.kind {
                ArgKind::Flag => self.out.flag(&def.name),
                ArgKind::Count => self.out.count(&def.name) > 0,
                ArgKind::Option => self.out.has_value(&def.name) || def.default.is_some(),
                ArgKind::Positional => effective_position(table, idx)
                    .is_some_and(|p| p < self.out.positionals().len()),
            };
            if !satisfied {
                return Err(ErrorContext::new(ErrorKind::MissingRequired)
                    .with_arg(def)
                    .into());
            }
        }

        // Bound positionals go through the same conversion and validation
        // as option values.
        for (idx, def) in table.iter().enumerate() {
            let Some(raw) = effective_position(table, idx).and_then(|p| self.out.positional(p))
            else {
                continue;
            };
            let typed = def
                .value_type
                .convert(raw)
                .map_err(|reason| invalid_value(def, raw, reason))?;
            self.out.cache_typed(&def.name, typed);
            if let Some(validator) = &def.validator {
                validator
                    .check(raw)
                    .map_err(|reason| invalid_value(def, raw, reason))?;
            }
        }

        Ok(())
    }
}

fn invalid_value(def: &ArgDef, raw: &str, reason: String) -> ParseError {
    ErrorContext::new(ErrorKind::InvalidValue)
        .with_arg(def)
        .with_value(raw)
        .with_reason(reason)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Validator, ValueType};

    fn argv(tokens: &[&str]) -> Vec<String> {
        std::iter::once("prog")
            .chain(tokens.iter().copied())
            .map(String::from)
            .collect()
    }

    fn table() -> Vec<ArgDef> {
        vec![
            ArgDef::flag("verbose").short('v').long("verbose"),
            ArgDef::flag("quiet").short('q').long("quiet"),
            ArgDef::flag("force").short('f').long("force"),
            ArgDef::count("debug").short('d').long("debug"),
            ArgDef::option("count")
                .short('c')
                .long("count")
                .value_type(ValueType::Int),
            ArgDef::option("output").short('o').long("output").alias("out"),
            ArgDef::option("include")
                .short('I')
                .long("include")
                .multiple(true),
        ]
    }

    #[test]
    fn flag_is_false_until_given() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();

        let given = argv(&["--verbose"]);
        assert!(parser.parse(&given).unwrap().flag("verbose"));

        let absent = argv(&[]);
        assert!(!parser.parse(&absent).unwrap().flag("verbose"));
    }

    #[test]
    fn separate_and_attached_long_values_match() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();

        let a = argv(&["--count", "42"]);
        let b = argv(&["--count=42"]);
        let first = parser.parse(&a).unwrap();
        let second = parser.parse(&b).unwrap();
        assert_eq!(first.get_int("count"), Some(42));
        assert_eq!(first.get_str("count"), second.get_str("count"));
        assert_eq!(first.typed("count"), second.typed("count"));
    }

    #[test]
    fn combined_short_flags() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();

        let ok = argv(&["-vqf"]);
        let m = parser.parse(&ok).unwrap();
        assert!(m.flag("verbose") && m.flag("quiet") && m.flag("force"));

        let bad = argv(&["-vxf"]);
        let err = parser.parse(&bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(err.context().token.as_deref(), Some("-x"));
    }

    #[test]
    fn option_inside_combination_is_unknown() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();
        let tokens = argv(&["-vo"]);
        let err = parser.parse(&tokens).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(err.context().token.as_deref(), Some("-o"));
    }

    #[test]
    fn short_option_forms() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();

        let attached = argv(&["-oout.txt"]);
        assert_eq!(parser.parse(&attached).unwrap().get_str("output"), Some("out.txt"));

        let separate = argv(&["-o", "out.txt"]);
        assert_eq!(parser.parse(&separate).unwrap().get_str("output"), Some("out.txt"));

        // the value is taken verbatim, even if it looks like flags
        let tricky = argv(&["-ovq"]);
        let m = parser.parse(&tricky).unwrap();
        assert_eq!(m.get_str("output"), Some("vq"));
        assert!(!m.flag("verbose"));
    }

    #[test]
    fn counts_tally_across_forms() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();
        let tokens = argv(&["-dd", "--debug", "-vd"]);
        let m = parser.parse(&tokens).unwrap();
        assert_eq!(m.count("debug"), 4);
        assert!(m.flag("verbose"));
    }

    #[test]
    fn terminator_makes_everything_positional() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();
        let tokens = argv(&["-v", "--", "-notanoption", "--verbose"]);
        let m = parser.parse(&tokens).unwrap();
        assert_eq!(m.positionals(), &["-notanoption", "--verbose"]);
    }

    #[test]
    fn negative_numbers_are_positionals() {
        let empty: Vec<ArgDef> = Vec::new();
        let mut parser = Parser::new(&empty).unwrap();
        let tokens = argv(&["-123", "-0.5", "-"]);
        let m = parser.parse(&tokens).unwrap();
        assert_eq!(m.positionals(), &["-123", "-0.5", "-"]);

        let not_a_number = argv(&["-1.2.3"]);
        let err = parser.parse(&not_a_number).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn negative_number_literal_shape() {
        assert!(is_negative_number("-1"));
        assert!(is_negative_number("-10.25"));
        assert!(!is_negative_number("-x1"));
        assert!(!is_negative_number("-.5"));
        assert!(!is_negative_number("-1.2.3"));
        assert!(!is_negative_number("12"));
    }

    #[test]
    fn help_wins_over_everything() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();
        let tokens = argv(&["--nope", "--count", "abc", "-h"]);
        let err = parser.parse(&tokens).unwrap_err();
        assert!(err.is_help());
    }

    #[test]
    fn missing_value_for_trailing_option() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();
        let tokens = argv(&["--output"]);
        let err = parser.parse(&tokens).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingValue);
        assert_eq!(
            err.context().arg.as_ref().map(|a| a.display.as_str()),
            Some("--output")
        );
    }

    #[test]
    fn invalid_integer_reports_value() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();
        let tokens = argv(&["--count", "4x"]);
        let err = parser.parse(&tokens).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(err.context().value.as_deref(), Some("4x"));
        assert_eq!(err.context().reason.as_deref(), Some("expected an integer"));
    }

    #[test]
    fn repeated_single_option_is_duplicate_but_multiple_appends() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();

        let dup = argv(&["--out", "a", "-o", "b"]);
        let err = parser.parse(&dup).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateArgument);
        assert_eq!(err.context().value.as_deref(), Some("b"));

        let multi = argv(&["-I", "a", "--include=b", "-Ic"]);
        let m = parser.parse(&multi).unwrap();
        assert_eq!(m.values_of("include"), &["a", "b", "c"]);
        assert_eq!(m.get_str("include"), Some("c"));
    }

    #[test]
    fn unknown_long_option_carries_suggestion() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();
        let tokens = argv(&["--ouput=x"]);
        let err = parser.parse(&tokens).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(err.context().token.as_deref(), Some("--ouput"));
        assert_eq!(err.context().suggestion.as_deref(), Some("--output"));
        assert_eq!(parser.last_error().map(|c| c.kind), Some(ErrorKind::UnknownArgument));
    }

    #[test]
    fn required_option_satisfied_by_default() {
        let strict = vec![ArgDef::option("name").long("name").required(true)];
        let mut parser = Parser::new(&strict).unwrap();
        let tokens = argv(&[]);
        let err = parser.parse(&tokens).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequired);

        let lenient = vec![
            ArgDef::option("name")
                .long("name")
                .required(true)
                .default("anon"),
        ];
        let mut parser = Parser::new(&lenient).unwrap();
        let m = parser.parse(&tokens).unwrap();
        assert_eq!(m.get_str("name"), Some("anon"));
    }

    #[test]
    fn required_flags_counts_and_positionals() {
        let table = vec![
            ArgDef::flag("yes").long("yes").required(true),
            ArgDef::count("level").short('l').required(true),
            ArgDef::positional("src", 0).required(true),
            ArgDef::positional("dst", 1).required(true),
        ];
        let mut parser = Parser::new(&table).unwrap();

        let cases: [(&[&str], &str); 4] = [
            (&["-l", "a", "b"], "yes"),
            (&["--yes", "a", "b"], "level"),
            (&["--yes", "-l", "a"], "dst"),
            (&["--yes", "-l"], "src"),
        ];
        for (tokens, missing) in cases {
            let tokens = argv(tokens);
            let err = parser.parse(&tokens).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingRequired);
            assert_eq!(err.context().arg.as_ref().map(|a| a.name.as_str()), Some(missing));
        }

        let ok = argv(&["--yes", "-l", "a", "b"]);
        let m = parser.parse(&ok).unwrap();
        assert_eq!(m.get_str("src"), Some("a"));
        assert_eq!(m.get_str("dst"), Some("b"));
    }

    #[test]
    fn positional_cannot_be_named() {
        let table = vec![ArgDef::positional("file", 0)];
        let mut parser = Parser::new(&table).unwrap();
        let tokens = argv(&["--file=x"]);
        let err = parser.parse(&tokens).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn validators_run_for_options_and_positionals() {
        let table = vec![
            ArgDef::option("format")
                .long("format")
                .validator(Validator::one_of(["json", "plain"])),
            ArgDef::positional("mode", 0).validator(Validator::new(|raw| {
                if raw.starts_with('r') {
                    Ok(())
                } else {
                    Err("must start with 'r'".to_string())
                }
            })),
        ];
        let mut parser = Parser::new(&table).unwrap();

        let bad_option = argv(&["--format", "xml", "read"]);
        let err = parser.parse(&bad_option).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(err.context().value.as_deref(), Some("xml"));

        let bad_positional = argv(&["--format", "json", "write"]);
        let err = parser.parse(&bad_positional).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(
            err.context().arg.as_ref().map(|a| a.display.as_str()),
            Some("<mode>")
        );

        let ok = argv(&["--format", "json", "read"]);
        assert!(parser.parse(&ok).is_ok());
    }

    #[test]
    fn positionals_convert_like_options() {
        let table = vec![
            ArgDef::option("opt").long("opt").value_type(ValueType::Bool),
            ArgDef::positional("enabled", 0).value_type(ValueType::Bool),
            ArgDef::positional("retries", 1).value_type(ValueType::Int),
        ];
        let mut parser = Parser::new(&table).unwrap();

        let ok = argv(&["--opt", "yes", "yes", "-2"]);
        let m = parser.parse(&ok).unwrap();
        assert_eq!(m.get_bool("opt"), Some(true));
        assert_eq!(m.get_bool("enabled"), Some(true));
        assert_eq!(m.get_int("retries"), Some(-2));
        assert_eq!(m.get_str("enabled"), Some("yes"));

        let bad = argv(&["no", "abc"]);
        let err = parser.parse(&bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(err.context().value.as_deref(), Some("abc"));
        assert_eq!(err.context().reason.as_deref(), Some("expected an integer"));
        assert_eq!(
            err.context().arg.as_ref().map(|a| a.display.as_str()),
            Some("<retries>")
        );
    }

    #[test]
    fn attached_value_on_flag_or_count_is_ignored() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();
        let tokens = argv(&["--verbose=x", "--debug=3"]);
        let m = parser.parse(&tokens).unwrap();
        assert!(m.flag("verbose"));
        assert_eq!(m.count("debug"), 1);
        assert!(m.positionals().is_empty());
        assert_eq!(m.get_str("verbose"), None);
    }

    #[test]
    fn reparsing_does_not_leak_state() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();

        let first = argv(&["-v", "-o", "a", "-dd", "-I", "x", "pos"]);
        let m = parser.parse(&first).unwrap();
        assert!(m.flag("verbose"));

        let second = argv(&["-q"]);
        let m = parser.parse(&second).unwrap();
        assert!(m.flag("quiet"));
        assert!(!m.flag("verbose"));
        assert_eq!(m.count("debug"), 0);
        assert_eq!(m.get_str("output"), None);
        assert!(m.values_of("include").is_empty());
        assert!(m.positionals().is_empty());
    }

    #[test]
    fn last_error_is_cleared_by_successful_parse() {
        let table = table();
        let mut parser = Parser::new(&table).unwrap();
        let bad = argv(&["--nope"]);
        assert!(parser.parse(&bad).is_err());
        assert!(parser.last_error().is_some());
        let good = argv(&["-v"]);
        assert!(parser.parse(&good).is_ok());
        assert!(parser.last_error().is_none());
    }

    #[test]
    fn binding_a_colliding_table_fails() {
        let table = vec![
            ArgDef::flag("a").short('x'),
            ArgDef::flag("b").short('x'),
        ];
        let err = Parser::new(&table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateArgument);
    }
}
