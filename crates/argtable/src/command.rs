//! Command trees and subcommand dispatch.
//!
//! Each node owns one argument table. `run` walks down the tree following
//! the first non-option token at each level and parses the remaining slice
//! against the node it stops at.

use std::collections::HashMap;
use std::fmt;

use crate::error::{ErrorContext, ErrorKind, ParseError, TableError};
use crate::format::suggest_from;
use crate::help::{HelpConfig, render_command_help};
use crate::parser::{Parser, is_help_token, is_negative_number};
use crate::store::ParsedArgs;
use crate::table::ArgDef;
use crate::validate::validate_table;

/// What a handler receives.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'r, 'a> {
    /// Space-separated dispatch path, e.g. `git remote add`.
    pub path: &'r str,
    pub args: &'r ParsedArgs<'a>,
}

type Handler = Box<dyn Fn(&Invocation<'_, '_>)>;

/// Result of a successful `run`.
#[derive(Debug, Clone)]
pub struct Dispatch<'a> {
    pub path: String,
    pub args: ParsedArgs<'a>,
    /// Whether the reached node had a handler (which has already run).
    pub handled: bool,
}

/// One node of a command tree.
pub struct Command {
    name: String,
    about: String,
    description: String,
    aliases: Vec<String>,
    args: Vec<ArgDef>,
    children: Vec<Command>,
    handler: Option<Handler>,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("args", &self.args)
            .field("children", &self.children)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

enum Scan<'c> {
    Help,
    Child(usize, &'c Command),
    Unknown(usize),
    Local,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: String::new(),
            description: String::new(),
            aliases: Vec::new(),
            args: Vec::new(),
            children: Vec::new(),
            handler: None,
        }
    }

    /// One-line summary, shown in the parent's `Subcommands:` section.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn arg(mut self, def: ArgDef) -> Self {
        self.args.push(def);
        self
    }

    pub fn args(mut self, defs: impl IntoIterator<Item = ArgDef>) -> Self {
        self.args.extend(defs);
        self
    }

    pub fn subcommand(mut self, child: Command) -> Self {
        self.children.push(child);
        self
    }

    pub fn handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&Invocation<'_, '_>) + 'static,
    {
        self.handler = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn about_text(&self) -> &str {
        &self.about
    }

    pub fn description_text(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn table(&self) -> &[ArgDef] {
        &self.args
    }

    pub fn children(&self) -> &[Command] {
        &self.children
    }

    /// Child matching `token` by name, then by alias.
    pub fn find_child(&self, token: &str) -> Option<&Command> {
        self.children
            .iter()
            .find(|c| c.name == token)
            .or_else(|| {
                self.children
                    .iter()
                    .find(|c| c.aliases.iter().any(|a| a == token))
            })
    }

    /// Validate every table in the tree, and reject sibling names or aliases
    /// that collide.
    pub fn validate(&self) -> Result<(), TableError> {
        validate_table(&self.args).map_err(|source| TableError::InCommand {
            command: self.name.clone(),
            source: Box::new(source),
        })?;

        // A child may repeat its own name among its aliases.
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (idx, child) in self.children.iter().enumerate() {
            for key in std::iter::once(&child.name).chain(&child.aliases) {
                if let Some(prev) = seen.insert(key.as_str(), idx) {
                    if prev != idx {
                        return Err(TableError::CommandAlias {
                            command: self.name.clone(),
                            alias: key.clone(),
                            other: self.children[prev].name.clone(),
                        });
                    }
                }
            }
        }

        self.children.iter().try_for_each(Command::validate)
    }

    /// Dispatch `argv` (`argv[0]` is this command's name) down the tree,
    /// parse at the node reached and invoke its handler.
    pub fn run<'a, S: AsRef<str>>(&self, argv: &'a [S]) -> Result<Dispatch<'a>, ParseError> {
        self.run_at(argv, self.name.clone())
    }

    fn run_at<'a, S: AsRef<str>>(
        &self,
        argv: &'a [S],
        path: String,
    ) -> Result<Dispatch<'a>, ParseError> {
        match self.scan(argv) {
            Scan::Help => Err(ParseError::from(ErrorKind::ShowHelp).with_command(&path)),
            Scan::Child(i, child) => {
                let path = format!("{path} {}", child.name);
                tracing::debug!(%path, "descending into subcommand");
                child.run_at(&argv[i..], path)
            }
            Scan::Unknown(i) => {
                let token = argv[i].as_ref();
                let candidates = self
                    .children
                    .iter()
                    .flat_map(|c| std::iter::once(c.name.as_str()).chain(c.aliases.iter().map(String::as_str)));
                let suggestion = suggest_from(token, candidates).map(str::to_string);
                tracing::debug!(%path, token, "no subcommand matches");
                Err(ParseError::from(
                    ErrorContext::new(ErrorKind::UnknownCommand)
                        .with_token(token)
                        .with_suggestion(suggestion),
                )
                .with_command(&path))
            }
            Scan::Local => {
                let mut parser = Parser::new(&self.args).map_err(|e| e.with_command(&path))?;
                let args = parser.parse(argv).map_err(|e| e.with_command(&path))?;
                if let Some(handler) = &self.handler {
                    tracing::debug!(%path, "invoking handler");
                    handler(&Invocation {
                        path: &path,
                        args: &args,
                    });
                }
                Ok(Dispatch {
                    path,
                    args,
                    handled: self.handler.is_some(),
                })
            }
        }
    }

    /// Help for the node `argv` would dispatch to.
    pub fn help_for<S: AsRef<str>>(&self, argv: &[S], config: &HelpConfig) -> String {
        let mut node = self;
        let mut argv = argv;
        let mut path = config
            .program_name
            .clone()
            .unwrap_or_else(|| self.name.clone());
        while let Scan::Child(i, child) = node.scan(argv) {
            path = format!("{path} {}", child.name);
            node = child;
            argv = &argv[i..];
        }
        render_command_help(node, &path, config)
    }

    /// Find the first non-option token and decide what it means here.
    fn scan<S: AsRef<str>>(&self, argv: &[S]) -> Scan<'_> {
        for (i, token) in argv.iter().enumerate().skip(1) {
            let token = token.as_ref();
            if is_help_token(token) {
                return Scan::Help;
            }
            if token == "--" {
                return Scan::Local;
            }
            if token.len() > 1 && token.starts_with('-') && !is_negative_number(token) {
                continue;
            }
            if let Some(child) = self.find_child(token) {
                return Scan::Child(i, child);
            }
            if !self.children.is_empty() && !self.args.iter().any(ArgDef::is_positional) {
                return Scan::Unknown(i);
            }
            return Scan::Local;
        }
        Scan::Local
    }
}
