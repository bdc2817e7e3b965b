use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::gate::context::{FocusTarget, Screen, SelectionKind};
use crate::gate::guard::{Guard, GuardError, Predicate};
use crate::modes::Mode;

/// Overlay id of the keybinding help screen.
pub const HELP_SCREEN: &str = "help";
/// Overlay id of yes/no confirmation dialogs.
pub const CONFIRM_SCREEN: &str = "confirm";
/// Overlay id of the new/edit connection form.
pub const CONNECTION_FORM_SCREEN: &str = "connection_form";

/// One registered action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionEntry {
    #[serde(rename = "action")]
    pub name: String,
    #[serde(rename = "guard")]
    pub predicate: Predicate,
    pub description: String,
}

/// Error while assembling the registry from user-supplied entries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("action name must not be empty")]
    EmptyActionName,
    #[error("invalid guard for action '{action}': {source}")]
    InvalidGuard {
        action: String,
        #[source]
        source: GuardError,
    },
}

/// Static table of action name → guard predicate.
///
/// Assembled at startup, then handed to [`ActionGate`](crate::gate::ActionGate),
/// which only ever reads it.
#[derive(Debug, Default, Clone)]
pub struct ActionPredicateRegistry {
    entries: HashMap<String, ActionEntry>,
}

impl ActionPredicateRegistry {
    /// An empty registry: every action denies.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in action table.
    pub fn builtin() -> Self {
        let any = Predicate::any;
        let base_normal = || any().mode(Mode::Normal).base();
        let tree = || any().focus(FocusTarget::Tree);
        let editor = || any().focus(FocusTarget::QueryEditor);
        let results = || any().focus(FocusTarget::ResultsTable);
        // Ids below are constants accepted by `Screen::is_valid_overlay_id`.
        let overlay = |id: &str| any().with(Guard::Screen(Screen::Overlay(id.to_string())));

        let table: Vec<(&str, Predicate, &str)> = vec![
            // Global
            ("quit", base_normal(), "Quit the application"),
            ("show_help", base_normal(), "Show keybinding help"),
            ("close_help", overlay(HELP_SCREEN), "Close keybinding help"),
            ("command_mode", base_normal(), "Open the command line"),
            (
                "command_submit",
                any().mode(Mode::Command),
                "Run the typed command",
            ),
            (
                "command_cancel",
                any().mode(Mode::Command),
                "Leave the command line",
            ),
            ("focus_explorer", base_normal(), "Focus the explorer"),
            ("focus_query", base_normal(), "Focus the query editor"),
            ("focus_results", base_normal(), "Focus the results table"),
            (
                "show_history",
                base_normal().has_config(true),
                "Show query history",
            ),
            // Leader menu
            ("leader_key", base_normal(), "Open the leader menu"),
            (
                "leader_quit",
                any().mode(Mode::LeaderPending).base(),
                "Quit from the leader menu",
            ),
            (
                "leader_toggle_explorer",
                any().mode(Mode::LeaderPending).base(),
                "Show or hide the explorer",
            ),
            (
                "leader_cancel",
                any().mode(Mode::LeaderPending),
                "Close the leader menu",
            ),
            // Explorer
            (
                "new_connection",
                tree().mode(Mode::Normal).base(),
                "Add a connection",
            ),
            (
                "edit_connection",
                tree().selection(SelectionKind::Connection).base(),
                "Edit the selected connection",
            ),
            (
                "delete_connection",
                tree().selection(SelectionKind::Connection).base(),
                "Delete the selected connection",
            ),
            (
                "connect_selected",
                tree().selection(SelectionKind::Connection).base(),
                "Connect to the selected connection",
            ),
            (
                "disconnect",
                base_normal().has_connection(true),
                "Close the current connection",
            ),
            (
                "refresh_tree",
                tree().has_connection(true).base(),
                "Reload explorer objects",
            ),
            (
                "select_table",
                tree()
                    .selection(SelectionKind::Table)
                    .has_connection(true)
                    .base(),
                "Preview the selected table",
            ),
            // Query editor
            (
                "enter_insert_mode",
                editor().mode(Mode::Normal).base(),
                "Start editing the query",
            ),
            (
                "exit_insert_mode",
                editor().mode(Mode::Insert),
                "Stop editing the query",
            ),
            (
                "enter_visual_mode",
                editor().mode(Mode::Normal).base(),
                "Start a visual selection",
            ),
            (
                "yank",
                editor().mode(Mode::Visual),
                "Copy the visual selection",
            ),
            (
                "execute_query",
                editor().mode(Mode::Normal).has_connection(true).base(),
                "Run the query",
            ),
            (
                "execute_query_insert",
                editor().mode(Mode::Insert).has_connection(true).base(),
                "Run the query without leaving insert mode",
            ),
            (
                "clear_query",
                editor().mode(Mode::Normal).base(),
                "Clear the query editor",
            ),
            // Results
            ("view_cell", results().base(), "View the full cell value"),
            ("copy_cell", results().base(), "Copy the cell value"),
            ("copy_row", results().base(), "Copy the row"),
            (
                "delete_row",
                results().mode(Mode::Normal).has_connection(true).base(),
                "Delete the selected row",
            ),
            // Overlays
            (
                "confirm_dialog",
                overlay(CONFIRM_SCREEN),
                "Accept the dialog",
            ),
            (
                "cancel_dialog",
                overlay(CONFIRM_SCREEN),
                "Dismiss the dialog",
            ),
            (
                "save_connection",
                overlay(CONNECTION_FORM_SCREEN),
                "Save the connection form",
            ),
            (
                "cancel_connection_form",
                overlay(CONNECTION_FORM_SCREEN),
                "Discard the connection form",
            ),
        ];

        let mut registry = Self::new();
        for (name, predicate, description) in table {
            registry.register(name, predicate, description);
        }
        registry
    }

    /// Add or replace an entry.
    pub fn register(&mut self, name: &str, predicate: Predicate, description: &str) {
        self.entries.insert(
            name.to_string(),
            ActionEntry {
                name: name.to_string(),
                predicate,
                description: description.to_string(),
            },
        );
    }

    /// Drop an entry; the action then always denies.
    pub fn remove(&mut self, name: &str) -> Option<ActionEntry> {
        self.entries.remove(name)
    }

    /// Apply user-supplied guard expressions and removals.
    ///
    /// Overrides keep the built-in description when one exists. Nothing is
    /// changed if any expression fails to parse.
    pub fn apply_overrides<'a, I, D>(
        &mut self,
        overrides: I,
        disabled: D,
    ) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
        D: IntoIterator<Item = &'a str>,
    {
        let mut parsed = Vec::new();
        for (name, expr) in overrides {
            let name = name.trim();
            if name.is_empty() {
                return Err(RegistryError::EmptyActionName);
            }
            let predicate = Predicate::parse(expr).map_err(|source| RegistryError::InvalidGuard {
                action: name.to_string(),
                source,
            })?;
            parsed.push((name, predicate));
        }

        for (name, predicate) in parsed {
            let description = match self.entries.get(name) {
                Some(entry) => {
                    log::info!("overriding guard for '{name}': {predicate}");
                    entry.description.clone()
                }
                None => {
                    log::info!("registering custom action '{name}': {predicate}");
                    String::from("Custom action")
                }
            };
            self.register(name, predicate, &description);
        }

        for name in disabled {
            if self.remove(name.trim()).is_none() {
                log::warn!("cannot disable unknown action '{name}'");
            }
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Predicate> {
        self.entries.get(name).map(|entry| &entry.predicate)
    }

    pub fn entry(&self, name: &str) -> Option<&ActionEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, sorted by action name.
    pub fn entries(&self) -> Vec<&ActionEntry> {
        let mut entries: Vec<&ActionEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_edit_connection() {
        let registry = ActionPredicateRegistry::builtin();
        let predicate = registry.lookup("edit_connection").unwrap();
        assert_eq!(
            predicate.guards(),
            &[
                Guard::Focus(FocusTarget::Tree),
                Guard::Selection(SelectionKind::Connection),
                Guard::Screen(Screen::Base),
            ]
        );
    }

    #[test]
    fn test_builtin_overlay_ids_are_expressible() {
        for id in [HELP_SCREEN, CONFIRM_SCREEN, CONNECTION_FORM_SCREEN] {
            assert!(Screen::is_valid_overlay_id(id), "{id}");
        }
    }

    #[test]
    fn test_entry_serializes() {
        let registry = ActionPredicateRegistry::builtin();
        let entry = registry.entry("close_help").unwrap();
        assert_eq!(
            serde_json::to_value(entry).unwrap(),
            serde_json::json!({
                "action": "close_help",
                "guard": "screen=help",
                "description": "Close keybinding help",
            })
        );
    }

    #[test]
    fn test_unknown_has_no_entry() {
        let registry = ActionPredicateRegistry::builtin();
        assert!(registry.lookup("frobnicate").is_none());
        assert!(!registry.contains(""));
    }

    #[test]
    fn test_entries_sorted() {
        let registry = ActionPredicateRegistry::builtin();
        let names: Vec<&str> = registry.entries().iter().map(|e| e.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), registry.len());
    }

    #[test]
    fn test_every_builtin_guard_parses_back() {
        let registry = ActionPredicateRegistry::builtin();
        for entry in registry.entries() {
            let text = entry.predicate.to_string();
            assert_eq!(
                Predicate::parse(&text).as_ref(),
                Ok(&entry.predicate),
                "{}",
                entry.name
            );
        }
    }

    #[test]
    fn test_apply_overrides() {
        let mut registry = ActionPredicateRegistry::builtin();
        registry
            .apply_overrides(
                [
                    ("quit", "screen=base"),
                    ("export_csv", "focus=results_table & has_connection=true"),
                ],
                ["delete_row"],
            )
            .unwrap();

        let quit = registry.entry("quit").unwrap();
        assert_eq!(quit.predicate.to_string(), "screen=base");
        assert_eq!(quit.description, "Quit the application");
        assert!(registry.contains("export_csv"));
        assert!(!registry.contains("delete_row"));
    }

    #[test]
    fn test_bad_override_changes_nothing() {
        let mut registry = ActionPredicateRegistry::builtin();
        let before = registry.entry("quit").cloned();
        let err = registry
            .apply_overrides([("quit", "screen=base"), ("yank", "mode=replace")], [])
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidGuard { ref action, .. } if action == "yank"));
        assert_eq!(registry.entry("quit").cloned(), before);
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = ActionPredicateRegistry::new();
        assert_eq!(
            registry.apply_overrides([("  ", "*")], []),
            Err(RegistryError::EmptyActionName)
        );
    }
}
