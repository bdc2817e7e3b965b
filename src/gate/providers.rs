//! Read-only views the host exposes to the gate.
//!
//! Each trait observes one piece of live state. None of them may mutate
//! anything; the gate samples them once per check through
//! [`ActionContext::capture`](crate::gate::context::ActionContext::capture).

use crate::gate::context::{FocusTarget, Screen, SelectionDescriptor, SessionFlags};
use crate::modes::Mode;

/// Observes the modal editing state.
pub trait ModeTracker {
    fn current_mode(&self) -> Mode;
}

/// Observes which surface owns keyboard input.
///
/// Hosts are expected to report at most one focused surface.
pub trait FocusRegistry {
    fn focused_target(&self) -> FocusTarget;
}

/// Observes the entity under the explorer cursor.
///
/// Implementations must return `kind = none` unless the tree is focused.
pub trait SelectionSource {
    fn current_selection(&self) -> SelectionDescriptor;
}

/// Observes the modal overlay stack.
pub trait ScreenStack {
    fn top_screen(&self) -> Screen;
}

/// Ambient session facts owned by the connection subsystem.
pub trait SessionInfo {
    fn has_current_connection(&self) -> bool;
    fn has_current_config(&self) -> bool;

    fn session_flags(&self) -> SessionFlags {
        SessionFlags {
            has_current_connection: self.has_current_connection(),
            has_current_config: self.has_current_config(),
        }
    }
}

/// Everything [`ActionGate::check_action`](crate::gate::ActionGate::check_action) samples.
pub trait LiveState: ModeTracker + FocusRegistry + SelectionSource + ScreenStack + SessionInfo {}

impl<T> LiveState for T where
    T: ModeTracker + FocusRegistry + SelectionSource + ScreenStack + SessionInfo + ?Sized
{
}

/// Resolve per-surface focus flags into a single target.
///
/// Flags are checked in the order tree, query editor, results table; the
/// order only matters when the host breaks the one-focus rule.
pub fn focus_from_flags(tree: bool, query_editor: bool, results_table: bool) -> FocusTarget {
    if tree {
        FocusTarget::Tree
    } else if query_editor {
        FocusTarget::QueryEditor
    } else if results_table {
        FocusTarget::ResultsTable
    } else {
        FocusTarget::None
    }
}

/// A plain-data live state, as a host would hand it over on each call.
///
/// Useful for callers that keep their UI state elsewhere (and for the CLI):
/// fill the fields, then pass it to the gate.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HostSnapshot {
    pub mode: Mode,
    pub tree_focused: bool,
    pub query_focused: bool,
    pub results_focused: bool,
    /// Raw cursor-node data of the explorer: `(kind, payload)`.
    pub tree_cursor: Option<(String, Option<String>)>,
    /// Overlay ids, most recently pushed last.
    pub screen_stack: Vec<String>,
    pub has_current_connection: bool,
    pub has_current_config: bool,
}

impl ModeTracker for HostSnapshot {
    fn current_mode(&self) -> Mode {
        self.mode
    }
}

impl FocusRegistry for HostSnapshot {
    fn focused_target(&self) -> FocusTarget {
        focus_from_flags(self.tree_focused, self.query_focused, self.results_focused)
    }
}

impl SelectionSource for HostSnapshot {
    fn current_selection(&self) -> SelectionDescriptor {
        if self.focused_target() != FocusTarget::Tree {
            return SelectionDescriptor::none();
        }
        SelectionDescriptor::from_node_data(
            self.tree_cursor
                .as_ref()
                .map(|(kind, payload)| (kind.as_str(), payload.as_deref())),
        )
    }
}

impl ScreenStack for HostSnapshot {
    fn top_screen(&self) -> Screen {
        Screen::top_of(&self.screen_stack)
    }
}

impl SessionInfo for HostSnapshot {
    fn has_current_connection(&self) -> bool {
        self.has_current_connection
    }

    fn has_current_config(&self) -> bool {
        self.has_current_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::context::SelectionKind;

    #[test]
    fn test_focus_from_flags() {
        assert_eq!(focus_from_flags(false, false, false), FocusTarget::None);
        assert_eq!(
            focus_from_flags(false, true, false),
            FocusTarget::QueryEditor
        );
        assert_eq!(
            focus_from_flags(false, false, true),
            FocusTarget::ResultsTable
        );
        assert_eq!(focus_from_flags(true, false, false), FocusTarget::Tree);
    }

    #[test]
    fn test_stale_cursor_ignored_without_tree_focus() {
        let snapshot = HostSnapshot {
            query_focused: true,
            tree_cursor: Some(("connection".into(), Some("prod".into()))),
            ..Default::default()
        };
        assert_eq!(snapshot.current_selection(), SelectionDescriptor::none());
    }

    #[test]
    fn test_tree_cursor_normalized() {
        let snapshot = HostSnapshot {
            tree_focused: true,
            tree_cursor: Some(("connection".into(), Some("prod".into()))),
            ..Default::default()
        };
        let sel = snapshot.current_selection();
        assert_eq!(sel.kind, SelectionKind::Connection);
        assert_eq!(sel.payload.as_deref(), Some("prod"));
    }

    #[test]
    fn test_tree_focused_without_cursor() {
        let snapshot = HostSnapshot {
            tree_focused: true,
            ..Default::default()
        };
        assert_eq!(snapshot.current_selection().kind, SelectionKind::None);
    }

    #[test]
    fn test_top_screen() {
        let mut snapshot = HostSnapshot::default();
        assert_eq!(snapshot.top_screen(), Screen::Base);
        snapshot.screen_stack = vec!["help".into(), "confirm".into()];
        assert_eq!(snapshot.top_screen(), Screen::Overlay("confirm".into()));
    }
}
