//! Parsed results.

use indexmap::{IndexMap, IndexSet};

use crate::table::Value;

/// Values collected by one parse.
///
/// Raw strings borrow from the argument vector; keys, lists and the typed
/// cache are owned here and dropped together.
#[derive(Debug, Clone, Default)]
pub struct ParsedArgs<'a> {
    flags: IndexSet<String>,
    counts: IndexMap<String, u32>,
    options: IndexMap<String, &'a str>,
    multi: IndexMap<String, Vec<&'a str>>,
    positionals: Vec<&'a str>,
    typed: IndexMap<String, Value>,
    defaults: IndexMap<String, Value>,
    positional_names: IndexMap<String, usize>,
}

impl<'a> ParsedArgs<'a> {
    /// Whether a flag was given. Undeclared and absent flags are `false`.
    pub fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Occurrences of a count argument.
    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Most recent raw value of an option, the positional bound to `name`,
    /// or a string default.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        if let Some(v) = self.options.get(name) {
            return Some(*v);
        }
        if let Some(v) = self.positional_by_name(name) {
            return Some(v);
        }
        self.defaults.get(name).and_then(Value::as_str)
    }

    /// Converted value of an option or bound positional, falling back to its
    /// default.
    pub fn typed(&self, name: &str) -> Option<&Value> {
        self.typed.get(name).or_else(|| self.defaults.get(name))
    }

    /// Integer value of an option or positional declared `Int`, or its
    /// default.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.typed(name)?.as_int()
    }

    /// Float value; integer values and defaults widen.
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.typed(name)?.as_float()
    }

    /// Boolean value of an argument declared `Bool`, or its default.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.typed(name)?.as_bool()
    }

    /// Every value recorded for an option, in encounter order.
    pub fn values_of(&self, name: &str) -> &[&'a str] {
        if let Some(values) = self.multi.get(name) {
            return values.as_slice();
        }
        match self.options.get(name) {
            Some(v) => std::slice::from_ref(v),
            None => &[],
        }
    }

    /// Whether an argument was supplied on the command line (defaults don't count).
    pub fn is_present(&self, name: &str) -> bool {
        self.flags.contains(name)
            || self.count(name) > 0
            || self.options.contains_key(name)
            || self.positional_by_name(name).is_some()
    }

    /// All positionals in encounter order, including ones no definition claims.
    pub fn positionals(&self) -> &[&'a str] {
        &self.positionals
    }

    /// Raw positional at `index` in encounter order.
    pub fn positional(&self, index: usize) -> Option<&'a str> {
        self.positionals.get(index).copied()
    }

    /// Names of the flags that were given.
    pub fn flags(&self) -> impl Iterator<Item = &str> + '_ {
        self.flags.iter().map(String::as_str)
    }

    /// Tallies of the count arguments that were given.
    pub fn counts(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Single-valued view of every option (most recent value wins).
    pub fn options(&self) -> impl Iterator<Item = (&str, &'a str)> + '_ {
        self.options.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Options declared `multiple`, with all their values.
    pub fn multi_values(&self) -> impl Iterator<Item = (&str, &[&'a str])> + '_ {
        self.multi.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Drop everything recorded so far.
    pub fn reset(&mut self) {
        self.flags.clear();
        self.counts.clear();
        self.options.clear();
        self.multi.clear();
        self.positionals.clear();
        self.typed.clear();
        self.defaults.clear();
        self.positional_names.clear();
    }

    fn positional_by_name(&self, name: &str) -> Option<&'a str> {
        let position = *self.positional_names.get(name)?;
        self.positional(position)
    }
}

impl<'a> ParsedArgs<'a> {
    pub(crate) fn set_flag(&mut self, name: &str) {
        self.flags.insert(name.to_string());
    }

    pub(crate) fn bump_count(&mut self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }

    pub(crate) fn has_value(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub(crate) fn cache_typed(&mut self, name: &str, value: Value) {
        self.typed.insert(name.to_string(), value);
    }

    /// Store an option value. Multi-valued options append and mirror the
    /// latest value into the single slot.
    pub(crate) fn record(&mut self, name: &str, raw: &'a str, multiple: bool) {
        if multiple {
            self.multi.entry(name.to_string()).or_default().push(raw);
        }
        self.options.insert(name.to_string(), raw);
    }

    pub(crate) fn push_positional(&mut self, raw: &'a str) {
        self.positionals.push(raw);
    }

    pub(crate) fn set_default(&mut self, name: &str, value: Value) {
        self.defaults.insert(name.to_string(), value);
    }

    pub(crate) fn bind_positional(&mut self, name: &str, position: usize) {
        self.positional_names.insert(name.to_string(), position);
    }
}
