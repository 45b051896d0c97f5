//! Structural checks for argument tables.
//!
//! Run once at startup, before any argv is parsed. Everything the lookup
//! index would reject at bind time is rejected here first.

use std::collections::HashMap;
use std::ops::Deref;

use crate::error::TableError;
use crate::table::{ArgDef, effective_position};

/// Reject malformed tables: empty names, positionals with option forms,
/// options without forms, declared `-h`/`--help` forms, and any duplicated
/// name, short, long or position.
///
/// Positions are compared after implicit ones are assigned, so an
/// undeclared positional cannot share a slot with a declared one.
pub fn validate_table(table: &[ArgDef]) -> Result<(), TableError> {
    let mut names: HashMap<&str, usize> = HashMap::new();
    let mut shorts: HashMap<char, usize> = HashMap::new();
    let mut longs: HashMap<&str, usize> = HashMap::new();
    let mut positions: HashMap<usize, usize> = HashMap::new();

    for (idx, def) in table.iter().enumerate() {
        if def.name.trim().is_empty() {
            return Err(TableError::EmptyName { index: idx });
        }
        if def.is_positional() && def.has_forms() {
            return Err(TableError::PositionalWithForms {
                name: def.name.clone(),
            });
        }
        if !def.is_positional() && !def.has_forms() {
            return Err(TableError::MissingForms {
                name: def.name.clone(),
            });
        }
        if names.insert(def.name.as_str(), idx).is_some() {
            return Err(TableError::DuplicateName {
                name: def.name.clone(),
            });
        }

        if let Some(form) = reserved_form(def) {
            return Err(TableError::ReservedHelp {
                name: def.name.clone(),
                form,
            });
        }

        for short in def.shorts() {
            if let Some(prev) = shorts.insert(short, idx) {
                if prev != idx {
                    return Err(TableError::DuplicateShort {
                        short,
                        first: table[prev].name.clone(),
                        second: def.name.clone(),
                    });
                }
            }
        }
        for long in def.longs() {
            if let Some(prev) = longs.insert(long, idx) {
                if prev != idx {
                    return Err(TableError::DuplicateLong {
                        long: long.to_string(),
                        first: table[prev].name.clone(),
                        second: def.name.clone(),
                    });
                }
            }
        }

        if let Some(position) = effective_position(table, idx) {
            if let Some(prev) = positions.insert(position, idx) {
                return Err(TableError::DuplicatePosition {
                    position,
                    first: table[prev].name.clone(),
                    second: def.name.clone(),
                });
            }
        }
    }

    Ok(())
}

/// `-h` and `--help` belong to the help prescan and can never reach a
/// definition.
fn reserved_form(def: &ArgDef) -> Option<String> {
    if def.shorts().any(|c| c == 'h') {
        return Some("-h".to_string());
    }
    if def.longs().any(|l| l == "help") {
        return Some("--help".to_string());
    }
    None
}

/// An argument table that passed [`validate_table`].
#[derive(Debug, Clone, Default)]
pub struct ArgTable {
    defs: Vec<ArgDef>,
}

impl ArgTable {
    pub fn new(defs: Vec<ArgDef>) -> Result<Self, TableError> {
        validate_table(&defs)?;
        Ok(Self { defs })
    }

    pub fn into_inner(self) -> Vec<ArgDef> {
        self.defs
    }
}

impl Deref for ArgTable {
    type Target = [ArgDef];

    fn deref(&self) -> &[ArgDef] {
        &self.defs
    }
}

impl AsRef<[ArgDef]> for ArgTable {
    fn as_ref(&self) -> &[ArgDef] {
        &self.defs
    }
}
