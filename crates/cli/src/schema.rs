use anyhow::{Context, Result, bail};
use argtable::{ArgDef, ArgKind, Command, Validator, Value, ValueType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_SCHEMA_NAME: &str = "argtable.json";

/// One command node as written in a schema file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub about: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandSchema>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindSchema {
    #[default]
    Flag,
    Option,
    Positional,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeSchema {
    Bool,
    #[default]
    String,
    Int,
    Float,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgSchema {
    pub name: String,
    #[serde(default)]
    pub kind: KindSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_aliases: Vec<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub value_type: TypeSchema,
    #[serde(default)]
    pub multiple: bool,
    /// Scalar default, converted with `valueType`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible_values: Vec<String>,
}

impl From<KindSchema> for ArgKind {
    fn from(kind: KindSchema) -> Self {
        match kind {
            KindSchema::Flag => ArgKind::Flag,
            KindSchema::Option => ArgKind::Option,
            KindSchema::Positional => ArgKind::Positional,
            KindSchema::Count => ArgKind::Count,
        }
    }
}

impl From<TypeSchema> for ValueType {
    fn from(ty: TypeSchema) -> Self {
        match ty {
            TypeSchema::Bool => ValueType::Bool,
            TypeSchema::String => ValueType::String,
            TypeSchema::Int => ValueType::Int,
            TypeSchema::Float => ValueType::Float,
        }
    }
}

impl CommandSchema {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema: {}", path.display()))?;
        let schema: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse schema: {}", path.display()))?;
        tracing::debug!(path = %path.display(), root = %schema.name, "loaded schema");
        Ok(schema)
    }

    /// Build the command tree. Structural validation is left to
    /// [`Command::validate`].
    pub fn into_command(self) -> Result<Command> {
        if self.name.trim().is_empty() {
            bail!("command name must not be empty");
        }
        let mut cmd = Command::new(&self.name)
            .about(self.about)
            .description(self.description);
        for alias in self.aliases {
            cmd = cmd.alias(alias);
        }
        for arg in self.args {
            let def = arg
                .into_def()
                .with_context(|| format!("in command '{}'", self.name))?;
            cmd = cmd.arg(def);
        }
        for child in self.commands {
            cmd = cmd.subcommand(child.into_command()?);
        }
        Ok(cmd)
    }

    /// Number of command nodes and argument definitions in the tree.
    pub fn size(&self) -> (usize, usize) {
        self.commands
            .iter()
            .map(CommandSchema::size)
            .fold((1, self.args.len()), |(c, a), (cc, ca)| (c + cc, a + ca))
    }
}

impl ArgSchema {
    pub fn into_def(self) -> Result<ArgDef> {
        let value_type = ValueType::from(self.value_type);
        let default = match &self.default {
            None => None,
            Some(raw) => Some(convert_default(&self.name, value_type, raw)?),
        };
        let validator = if self.possible_values.is_empty() {
            None
        } else {
            Some(Validator::one_of(self.possible_values))
        };

        Ok(ArgDef {
            name: self.name,
            kind: self.kind.into(),
            short: self.short,
            short_aliases: self.short_aliases,
            long: self.long,
            aliases: self.aliases,
            value_type,
            multiple: self.multiple,
            default,
            required: self.required,
            position: self.position,
            validator,
            help: self.help,
            value_name: self.value_name,
            hidden: self.hidden,
        })
    }
}

fn convert_default(name: &str, ty: ValueType, raw: &serde_json::Value) -> Result<Value> {
    let text = match raw {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => bail!("default for '{name}' must be a scalar, got {other}"),
    };
    match ty.convert(&text) {
        Ok(value) => Ok(value),
        Err(reason) => bail!("invalid default '{text}' for '{name}': {reason}"),
    }
}

/// Starter schema written by `argtable init`.
pub fn starter(name: &str) -> CommandSchema {
    CommandSchema {
        name: name.to_string(),
        about: "Example command line".to_string(),
        args: vec![ArgSchema {
            name: "verbose".to_string(),
            kind: KindSchema::Count,
            short: Some('v'),
            long: Some("verbose".to_string()),
            help: "Increase output verbosity".to_string(),
            ..Default::default()
        }],
        commands: vec![CommandSchema {
            name: "greet".to_string(),
            about: "Print a greeting".to_string(),
            args: vec![
                ArgSchema {
                    name: "greeting".to_string(),
                    kind: KindSchema::Option,
                    short: Some('g'),
                    long: Some("greeting".to_string()),
                    default: Some(serde_json::Value::String("Hello".to_string())),
                    help: "Greeting to use".to_string(),
                    ..Default::default()
                },
                ArgSchema {
                    name: "name".to_string(),
                    kind: KindSchema::Positional,
                    position: Some(0),
                    required: true,
                    help: "Who to greet".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }],
        ..Default::default()
    }
}
