use std::cell::Cell;
use std::rc::Rc;

use argtable::{
    ArgDef, ArgTable, ColorChoice, Command, ErrorKind, HelpConfig, Parser, Validator, ValueType,
    render_error, suggest,
};

fn argv(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|s| s.to_string()).collect()
}

fn convert_table() -> ArgTable {
    ArgTable::new(vec![
        ArgDef::count("verbose")
            .short('v')
            .long("verbose")
            .help("More output"),
        ArgDef::flag("dry-run").short('n').long("dry-run"),
        ArgDef::option("format")
            .short('f')
            .long("format")
            .validator(Validator::one_of(["png", "jpeg"]))
            .default("png"),
        ArgDef::option("scale")
            .long("scale")
            .value_type(ValueType::Float)
            .default(1.0),
        ArgDef::option("tag")
            .short('t')
            .long("tag")
            .multiple(true),
        ArgDef::positional("input", 0).required(true),
        ArgDef::positional("offset", 1).value_type(ValueType::Int),
    ])
    .expect("table is well formed")
}

#[test]
fn parses_a_realistic_command_line() {
    let table = convert_table();
    let mut parser = Parser::new(&table).unwrap();
    let tokens = argv(&[
        "convert", "-vvn", "--format=jpeg", "-t", "a", "--tag", "b", "photo.raw", "-15",
    ]);
    let args = parser.parse(&tokens).unwrap();

    assert_eq!(args.count("verbose"), 2);
    assert!(args.flag("dry-run"));
    assert_eq!(args.get_str("format"), Some("jpeg"));
    assert_eq!(args.get_float("scale"), Some(1.0));
    assert_eq!(args.values_of("tag"), &["a", "b"]);
    assert_eq!(args.get_str("input"), Some("photo.raw"));
    assert_eq!(args.get_int("offset"), Some(-15));
}

#[test]
fn defaults_fill_in_when_absent() {
    let table = convert_table();
    let mut parser = Parser::new(&table).unwrap();
    let tokens = argv(&["convert", "in.raw"]);
    let args = parser.parse(&tokens).unwrap();
    assert_eq!(args.get_str("format"), Some("png"));
    assert!(!args.is_present("format"));
    assert_eq!(args.count("verbose"), 0);
    assert_eq!(args.get_int("offset"), None);
}

#[test]
fn failures_render_readable_errors() {
    let table = convert_table();
    let mut parser = Parser::new(&table).unwrap();

    let tokens = argv(&["convert", "--fromat", "png", "x"]);
    let err = parser.parse(&tokens).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    assert_eq!(
        render_error(&err, false),
        "error: unknown argument '--fromat'\n\n  tip: a similar argument exists: '--format'\n"
    );

    let tokens = argv(&["convert", "-f", "gif", "x"]);
    let err = parser.parse(&tokens).unwrap_err();
    assert_eq!(
        render_error(&err, false),
        "error: invalid value 'gif' for '--format': possible values: png, jpeg\n"
    );

    let tokens = argv(&["convert", "-v"]);
    let err = parser.parse(&tokens).unwrap_err();
    assert_eq!(
        render_error(&err, false),
        "error: the required argument '<input>' was not provided\n"
    );
    assert_eq!(
        parser.last_error().map(|c| c.kind),
        Some(ErrorKind::MissingRequired)
    );
}

#[test]
fn suggestions_respect_the_threshold() {
    let table = vec![ArgDef::option("output").long("output")];
    assert_eq!(suggest("ouput", &table), Some("output"));
    assert_eq!(suggest("completely-different", &table), None);
}

#[test]
fn nested_dispatch_runs_only_the_reached_handler() {
    let add_calls = Rc::new(Cell::new(0));
    let remote_calls = Rc::new(Cell::new(0));
    let add = Rc::clone(&add_calls);
    let remote = Rc::clone(&remote_calls);

    let tree = Command::new("git")
        .subcommand(
            Command::new("remote")
                .handler(move |_| remote.set(remote.get() + 1))
                .subcommand(Command::new("add").handler(move |inv| {
                    assert_eq!(inv.path, "git remote add");
                    add.set(add.get() + 1);
                })),
        );
    tree.validate().unwrap();

    let tokens = argv(&["git", "remote", "add"]);
    let dispatch = tree.run(&tokens).unwrap();
    assert_eq!(dispatch.path, "git remote add");
    assert_eq!(add_calls.get(), 1);
    assert_eq!(remote_calls.get(), 0);

    let tokens = argv(&["git", "remote"]);
    tree.run(&tokens).unwrap();
    assert_eq!(remote_calls.get(), 1);
}

#[test]
fn help_and_errors_agree_on_argument_names() {
    let table = convert_table();
    let config = HelpConfig {
        program_name: Some("convert".to_string()),
        color: ColorChoice::Never,
        ..Default::default()
    };
    let help = argtable::render_help(&table, &config);
    assert!(help.starts_with("Usage: convert [OPTIONS] <input> [offset]\n"));
    assert!(help.contains("-f, --format <STRING>"));
    assert!(help.contains("[default: png]"));
    assert!(help.contains("-t, --tag <STRING>..."));
}
