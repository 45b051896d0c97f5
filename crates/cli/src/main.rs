mod report;
mod schema;

use anyhow::{Context, Result, bail};
use argtable::{ColorChoice, Command, HelpConfig, ParseError, render_error, usage_line};
use clap::{Parser, Subcommand, ValueEnum};
use std::{
    fs,
    io::Write,
    path::PathBuf,
    process::ExitCode,
};
use tracing_subscriber::{EnvFilter, fmt};

use crate::report::ParseReport;
use crate::schema::{CommandSchema, DEFAULT_SCHEMA_NAME};

/// Exit code for argv that the schema rejects.
const USAGE_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "argtable")]
#[command(version, about = "Check, document and dry-run argument schemas", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorArg::Auto, global = true)]
    color: ColorArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorArg {
    Never,
    Auto,
    Always,
}

impl From<ColorArg> for ColorChoice {
    fn from(c: ColorArg) -> Self {
        match c {
            ColorArg::Never => ColorChoice::Never,
            ColorArg::Auto => ColorChoice::Auto,
            ColorArg::Always => ColorChoice::Always,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter schema
    Init(InitArgs),

    /// Validate a schema's command tree and argument tables
    Check(CheckArgs),

    /// Print help for the command ARGS would dispatch to
    Help(RunArgs),

    /// Parse ARGS against a schema and print the result as JSON
    Parse(RunArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Schema file to create
    #[arg(value_name = "FILE", default_value = DEFAULT_SCHEMA_NAME)]
    path: PathBuf,

    /// Root command name
    #[arg(short, long, default_value = "example")]
    name: String,
}

#[derive(Parser)]
struct CheckArgs {
    /// Schema file
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,
}

#[derive(Parser)]
struct RunArgs {
    /// Schema file
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,

    /// Arguments to dispatch, without the program name (use `--` before them)
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let color = ColorChoice::from(cli.color);

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Check(args) => check(args),
        Commands::Help(args) => help(args, color),
        Commands::Parse(args) => parse(args, color),
    }
}

fn init(args: InitArgs) -> Result<ExitCode> {
    if args.path.exists() {
        bail!("{} already exists", args.path.display());
    }

    let schema = schema::starter(&args.name);
    let json_content = serde_json::to_string_pretty(&schema)?;
    fs::write(&args.path, json_content + "\n")
        .with_context(|| format!("failed to write {}", args.path.display()))?;

    eprintln!("Created: {}", args.path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {} to describe your command line", args.path.display());
    eprintln!("  2. Run: argtable check {}", args.path.display());
    eprintln!("  3. Run: argtable parse {} -- greet world", args.path.display());

    Ok(ExitCode::SUCCESS)
}

fn check(args: CheckArgs) -> Result<ExitCode> {
    let schema = CommandSchema::from_file(&args.schema)?;
    let (commands, arguments) = schema.size();
    load_tree(schema)?;
    println!("ok: {commands} command(s), {arguments} argument(s)");
    Ok(ExitCode::SUCCESS)
}

fn help(args: RunArgs, color: ColorChoice) -> Result<ExitCode> {
    let tree = load_tree(CommandSchema::from_file(&args.schema)?)?;
    let argv = argv_for(&tree, args.args);
    print!("{}", tree.help_for(&argv, &help_config(color)));
    Ok(ExitCode::SUCCESS)
}

fn parse(args: RunArgs, color: ColorChoice) -> Result<ExitCode> {
    let tree = load_tree(CommandSchema::from_file(&args.schema)?)?;
    let argv = argv_for(&tree, args.args);
    tracing::debug!(?argv, "dispatching");

    match tree.run(&argv) {
        Ok(dispatch) => {
            let report = ParseReport::new(&dispatch);
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_help() => {
            print!("{}", tree.help_for(&argv, &help_config(color)));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_error(&tree, &err, color)?;
            Ok(ExitCode::from(USAGE_ERROR))
        }
    }
}

fn load_tree(schema: CommandSchema) -> Result<Command> {
    let tree = schema.into_command()?;
    tree.validate().context("invalid schema")?;
    Ok(tree)
}

/// The root command's name stands in for argv[0].
fn argv_for(tree: &Command, args: Vec<String>) -> Vec<String> {
    std::iter::once(tree.name().to_string()).chain(args).collect()
}

/// Help always goes to stdout.
fn help_config(color: ColorChoice) -> HelpConfig {
    HelpConfig {
        color,
        ..Default::default()
    }
    .for_stream(&std::io::stdout())
}

fn report_error(tree: &Command, err: &ParseError, color: ColorChoice) -> Result<()> {
    let path = err.context().command.as_deref().unwrap_or(tree.name());
    let node = node_at(tree, path);
    let colored = color.resolve_for(&std::io::stderr());

    let mut stderr = std::io::stderr().lock();
    stderr.write_all(render_error(err, colored).as_bytes())?;
    writeln!(
        stderr,
        "\n{}\n\nFor more information, try '--help'.",
        usage_line(node.table(), path, !node.children().is_empty())
    )?;
    Ok(())
}

/// Walk a display path like `git remote add` back down the tree.
fn node_at<'c>(tree: &'c Command, path: &str) -> &'c Command {
    let mut node = tree;
    for name in path.split_whitespace().skip(1) {
        match node.find_child(name) {
            Some(child) => node = child,
            None => break,
        }
    }
    node
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
