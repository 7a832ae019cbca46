//! Recently used arguments per plugin command.

use std::collections::{HashMap, VecDeque};

use crate::command::domain::CommandArgs;

/// Capped most-recently-used argument lists keyed by plugin and command.
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    capacity: usize,
    entries: HashMap<(String, String), VecDeque<CommandArgs>>,
}

impl PreferenceStore {
    /// Creates a store remembering `capacity` argument lists per command.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
        }
    }

    /// Records an argument list as the most recent for the command.
    ///
    /// Empty lists are ignored, and a repeated list moves to the front
    /// instead of being stored twice. Returns `true` when recorded.
    pub fn record(&mut self, plugin: &str, command: &str, args: CommandArgs) -> bool {
        if args.is_empty() || self.capacity == 0 {
            return false;
        }
        let recent = self
            .entries
            .entry((plugin.to_owned(), command.to_owned()))
            .or_default();
        recent.retain(|existing| *existing != args);
        recent.push_front(args);
        recent.truncate(self.capacity);
        true
    }

    /// Argument lists for the command, most recent first.
    #[must_use]
    pub fn recent(&self, plugin: &str, command: &str) -> Vec<CommandArgs> {
        self.entries
            .get(&(plugin.to_owned(), command.to_owned()))
            .map(|recent| recent.iter().cloned().collect())
            .unwrap_or_default()
    }
}
