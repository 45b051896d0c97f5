//! Usage and help text, rendered from the same table the parser uses.

use std::io::IsTerminal;

use crate::command::Command;
use crate::format::{ColorChoice, Palette};
use crate::table::{ArgDef, ArgKind, effective_position};

/// Display settings for help output.
#[derive(Debug, Clone)]
pub struct HelpConfig {
    /// Name shown after `Usage:`; commands use their dispatch path instead.
    pub program_name: Option<String>,
    pub description: Option<String>,
    /// Width the left column (forms and placeholders) is padded to.
    pub column_width: usize,
    /// Render `<TYPE>` placeholders after option forms.
    pub value_placeholders: bool,
    /// Rendering never inspects a stream, so `Auto` renders plain. Resolve it
    /// for the destination with [`HelpConfig::for_stream`].
    pub color: ColorChoice,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            program_name: None,
            description: None,
            column_width: 24,
            value_placeholders: true,
            color: ColorChoice::Auto,
        }
    }
}

impl HelpConfig {
    /// Turn `Auto` into `Always` or `Never` according to `is_terminal`.
    pub fn resolve_color(mut self, is_terminal: bool) -> Self {
        if self.color == ColorChoice::Auto {
            self.color = if is_terminal {
                ColorChoice::Always
            } else {
                ColorChoice::Never
            };
        }
        self
    }

    /// [`HelpConfig::resolve_color`] against the stream the help will be
    /// written to.
    pub fn for_stream<T: IsTerminal>(self, stream: &T) -> Self {
        self.resolve_color(stream.is_terminal())
    }

    fn colored(&self) -> bool {
        self.color.resolve(false)
    }
}

/// Help for a flat table.
pub fn render_help(table: &[ArgDef], config: &HelpConfig) -> String {
    let name = config.program_name.as_deref().unwrap_or("program");
    HelpPage {
        path: name,
        about: "",
        description: config.description.as_deref().unwrap_or(""),
        table,
        subcommands: Vec::new(),
    }
    .render(config)
}

/// Help for one node of a command tree, titled with its dispatch path.
pub fn render_command_help(cmd: &Command, path: &str, config: &HelpConfig) -> String {
    let subcommands = cmd
        .children()
        .iter()
        .map(|child| {
            let mut help = child.about_text().trim().to_string();
            if !child.aliases().is_empty() {
                if !help.is_empty() {
                    help.push(' ');
                }
                help.push_str(&format!("[aliases: {}]", child.aliases().join(", ")));
            }
            (child.name().to_string(), help)
        })
        .collect();

    HelpPage {
        path,
        about: cmd.about_text(),
        description: config
            .description
            .as_deref()
            .unwrap_or_else(|| cmd.description_text()),
        table: cmd.table(),
        subcommands,
    }
    .render(config)
}

/// `Usage: <path> [OPTIONS] [<subcommand>] <positional> ...`, without the
/// trailing newline.
pub fn usage_line(table: &[ArgDef], path: &str, has_subcommands: bool) -> String {
    let mut out = format!("Usage: {path} [OPTIONS]");
    if has_subcommands {
        out.push_str(" [<subcommand>]");
    }
    for (_, def) in visible_positionals(table) {
        let label = def.value_label();
        let ellipsis = if def.multiple { "..." } else { "" };
        if def.required {
            out.push_str(&format!(" <{label}>{ellipsis}"));
        } else {
            out.push_str(&format!(" [{label}]{ellipsis}"));
        }
    }
    out
}

/// Visible positionals ordered by position; ties keep table order.
fn visible_positionals(table: &[ArgDef]) -> Vec<(usize, &ArgDef)> {
    let mut out: Vec<(usize, &ArgDef)> = table
        .iter()
        .enumerate()
        .filter(|(_, d)| !d.hidden)
        .filter_map(|(idx, d)| effective_position(table, idx).map(|p| (p, d)))
        .collect();
    out.sort_by_key(|(p, _)| *p);
    out
}

struct HelpPage<'a> {
    path: &'a str,
    about: &'a str,
    description: &'a str,
    table: &'a [ArgDef],
    subcommands: Vec<(String, String)>,
}

impl HelpPage<'_> {
    fn render(&self, config: &HelpConfig) -> String {
        let p = Palette::new(config.colored());
        let mut out = String::new();

        if !self.about.trim().is_empty() {
            out.push_str(self.about.trim());
            out.push_str("\n\n");
        }
        let usage = usage_line(self.table, self.path, !self.subcommands.is_empty());
        let usage = usage.replacen("Usage:", &p.header("Usage:"), 1);
        out.push_str(&usage);
        out.push('\n');

        if !self.description.trim().is_empty() {
            out.push('\n');
            out.push_str(self.description.trim_end());
            out.push('\n');
        }

        let mut flags: Vec<(String, String)> = Vec::new();
        let mut options: Vec<(String, String)> = Vec::new();
        for def in self.table.iter().filter(|d| !d.hidden) {
            match def.kind {
                ArgKind::Flag | ArgKind::Count => flags.push(row(def, config)),
                ArgKind::Option => options.push(row(def, config)),
                ArgKind::Positional => {}
            }
        }
        flags.push(("-h, --help".to_string(), "Print help".to_string()));

        let positionals: Vec<(String, String)> = visible_positionals(self.table)
            .into_iter()
            .map(|(_, def)| row(def, config))
            .collect();

        section(&mut out, &p, "Flags:", &flags, config.column_width);
        section(&mut out, &p, "Options:", &options, config.column_width);
        section(&mut out, &p, "Positionals:", &positionals, config.column_width);
        section(&mut out, &p, "Subcommands:", &self.subcommands, config.column_width);
        out
    }
}

fn section(out: &mut String, p: &Palette, title: &str, rows: &[(String, String)], width: usize) {
    if rows.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(&p.header(title));
    out.push('\n');
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {}\n", p.literal(left)));
        } else {
            let padded = format!("{left:<width$}");
            out.push_str(&format!("  {}  {help}\n", p.literal(&padded)));
        }
    }
}

fn row(def: &ArgDef, config: &HelpConfig) -> (String, String) {
    (left_column(def, config), right_column(def))
}

fn left_column(def: &ArgDef, config: &HelpConfig) -> String {
    if def.is_positional() {
        let label = def.value_label();
        return if def.required {
            format!("<{label}>")
        } else {
            format!("[{label}]")
        };
    }

    let forms: Vec<String> = def
        .shorts()
        .map(|c| format!("-{c}"))
        .chain(def.longs().map(|l| format!("--{l}")))
        .collect();
    let mut out = forms.join(", ");
    if def.kind == ArgKind::Option && config.value_placeholders {
        out.push_str(&format!(" <{}>", def.value_label()));
        if def.multiple {
            out.push_str("...");
        }
    }
    out
}

fn right_column(def: &ArgDef) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !def.help.trim().is_empty() {
        parts.push(def.help.trim().to_string());
    }
    if def.required {
        parts.push("(required)".to_string());
    }
    if let Some(default) = &def.default {
        parts.push(format!("[default: {default}]"));
    }
    parts.join(" ")
}
