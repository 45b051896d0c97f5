//! Form lookup for a bound table.
//!
//! Maps every short character and long name (aliases included) to the index
//! of its definition, so the parser resolves a token in one hash lookup.

use std::collections::HashMap;

use crate::error::{ErrorContext, ErrorKind, ParseError};
use crate::table::ArgDef;

/// Short-character and long-name maps into a table, built once per parser.
#[derive(Debug, Clone, Default)]
pub struct LookupIndex {
    short: HashMap<char, usize>,
    long: HashMap<String, usize>,
}

impl LookupIndex {
    /// Index every short form, short alias, long form and alias.
    ///
    /// A form that already maps to a different definition fails with
    /// `DuplicateArgument`. This also covers tables that never went through
    /// [`crate::validate_table`].
    pub fn build(table: &[ArgDef]) -> Result<Self, ParseError> {
        let mut index = Self::default();
        for (idx, def) in table.iter().enumerate() {
            for c in def.shorts() {
                if let Some(prev) = index.short.insert(c, idx) {
                    if prev != idx {
                        return Err(collision(format!("-{c}"), def, &table[prev]));
                    }
                }
            }
            for long in def.longs() {
                if let Some(prev) = index.long.insert(long.to_string(), idx) {
                    if prev != idx {
                        return Err(collision(format!("--{long}"), def, &table[prev]));
                    }
                }
            }
        }
        tracing::debug!(
            shorts = index.short.len(),
            longs = index.long.len(),
            "built lookup index"
        );
        Ok(index)
    }

    pub fn short(&self, c: char) -> Option<usize> {
        self.short.get(&c).copied()
    }

    pub fn long(&self, name: &str) -> Option<usize> {
        self.long.get(name).copied()
    }
}

fn collision(form: String, def: &ArgDef, prev: &ArgDef) -> ParseError {
    tracing::debug!(%form, first = %prev.name, second = %def.name, "argument form collision");
    ErrorContext::new(ErrorKind::DuplicateArgument)
        .with_token(form)
        .with_arg(def)
        .with_reason(format!("used by both '{}' and '{}'", prev.name, def.name))
        .into()
}
