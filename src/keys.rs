use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::gate::context::{ActionContext, FocusTarget, Screen, SelectionKind};
use crate::gate::registry::{CONFIRM_SCREEN, CONNECTION_FORM_SCREEN, HELP_SCREEN};
use crate::modes::Mode;

/// Map a key event to the name of the action it requests.
///
/// Resolution looks at the context only to pick between actions sharing a
/// key; whether the action may actually fire is the gate's decision. Keys
/// that request nothing (plain typing, cursor movement) resolve to `None`.
pub fn resolve_action(ctx: &ActionContext, event: KeyEvent) -> Option<&'static str> {
    if let Screen::Overlay(id) = ctx.screen() {
        if let Some(action) = resolve_overlay(id, event) {
            return Some(action);
        }
    }

    match ctx.mode() {
        Mode::Normal => resolve_normal(ctx, event),
        Mode::Insert => resolve_insert(event),
        Mode::Visual => resolve_visual(event),
        Mode::LeaderPending => Some(resolve_leader(event)),
        Mode::Command => resolve_command(event),
    }
}

fn resolve_overlay(id: &str, event: KeyEvent) -> Option<&'static str> {
    match (id, event.code) {
        (HELP_SCREEN, KeyCode::Esc | KeyCode::Char('q' | '?')) => Some("close_help"),
        (CONFIRM_SCREEN, KeyCode::Enter | KeyCode::Char('y')) => Some("confirm_dialog"),
        (CONFIRM_SCREEN, KeyCode::Esc | KeyCode::Char('n')) => Some("cancel_dialog"),
        (CONNECTION_FORM_SCREEN, KeyCode::Char('s')) if is_ctrl(event) => Some("save_connection"),
        (CONNECTION_FORM_SCREEN, KeyCode::Esc) => Some("cancel_connection_form"),
        _ => None,
    }
}

fn resolve_normal(ctx: &ActionContext, event: KeyEvent) -> Option<&'static str> {
    let ctrl = is_ctrl(event);

    // Global
    let global = match event.code {
        KeyCode::Char('c') if ctrl => Some("quit"),
        KeyCode::Char('q') if !ctrl => Some("quit"),
        KeyCode::Char('?') => Some("show_help"),
        KeyCode::Char(' ') => Some("leader_key"),
        KeyCode::Char(':') => Some("command_mode"),
        KeyCode::Char('E') => Some("focus_explorer"),
        KeyCode::Char('Q') => Some("focus_query"),
        KeyCode::Char('R') => Some("focus_results"),
        KeyCode::Char('H') => Some("show_history"),
        KeyCode::Char('D') => Some("disconnect"),
        _ => None,
    };
    if global.is_some() {
        return global;
    }

    match ctx.focus() {
        FocusTarget::Tree => match event.code {
            KeyCode::Char('n') => Some("new_connection"),
            KeyCode::Char('e') => Some("edit_connection"),
            KeyCode::Char('d') => Some("delete_connection"),
            KeyCode::Char('f') => Some("refresh_tree"),
            KeyCode::Enter => match ctx.selection_kind() {
                SelectionKind::Table => Some("select_table"),
                _ => Some("connect_selected"),
            },
            _ => None,
        },
        FocusTarget::QueryEditor => match event.code {
            KeyCode::Char('i') => Some("enter_insert_mode"),
            KeyCode::Char('v') => Some("enter_visual_mode"),
            KeyCode::Char('c') => Some("clear_query"),
            KeyCode::Enter | KeyCode::F(5) => Some("execute_query"),
            _ => None,
        },
        FocusTarget::ResultsTable => match event.code {
            KeyCode::Char('v') | KeyCode::Enter => Some("view_cell"),
            KeyCode::Char('y') => Some("copy_cell"),
            KeyCode::Char('Y') => Some("copy_row"),
            KeyCode::Char('d') => Some("delete_row"),
            _ => None,
        },
        FocusTarget::None => None,
    }
}

fn resolve_insert(event: KeyEvent) -> Option<&'static str> {
    match event.code {
        KeyCode::Esc => Some("exit_insert_mode"),
        KeyCode::F(5) => Some("execute_query_insert"),
        KeyCode::Enter if is_ctrl(event) => Some("execute_query_insert"),
        _ => None,
    }
}

fn resolve_visual(event: KeyEvent) -> Option<&'static str> {
    match event.code {
        KeyCode::Char('y') => Some("yank"),
        _ => None,
    }
}

/// Any key other than the leader bindings closes the leader menu.
fn resolve_leader(event: KeyEvent) -> &'static str {
    match event.code {
        KeyCode::Char('q') => "leader_quit",
        KeyCode::Char('e') => "leader_toggle_explorer",
        _ => "leader_cancel",
    }
}

fn resolve_command(event: KeyEvent) -> Option<&'static str> {
    match event.code {
        KeyCode::Enter => Some("command_submit"),
        KeyCode::Esc => Some("command_cancel"),
        _ => None,
    }
}

fn is_ctrl(event: KeyEvent) -> bool {
    event.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn focused(focus: FocusTarget) -> ActionContext {
        ActionContext::builder().focus(focus).build()
    }

    #[test]
    fn test_same_key_depends_on_focus() {
        let tree = focused(FocusTarget::Tree);
        let results = focused(FocusTarget::ResultsTable);
        assert_eq!(
            resolve_action(&tree, key(KeyCode::Char('d'))),
            Some("delete_connection")
        );
        assert_eq!(
            resolve_action(&results, key(KeyCode::Char('d'))),
            Some("delete_row")
        );
        assert_eq!(
            resolve_action(&focused(FocusTarget::None), key(KeyCode::Char('d'))),
            None
        );
    }

    #[test]
    fn test_enter_in_tree_depends_on_selection() {
        let on_table = ActionContext::builder()
            .focus(FocusTarget::Tree)
            .selection_kind(SelectionKind::Table)
            .build();
        assert_eq!(
            resolve_action(&on_table, key(KeyCode::Enter)),
            Some("select_table")
        );
        let on_conn = ActionContext::builder()
            .focus(FocusTarget::Tree)
            .selection_kind(SelectionKind::Connection)
            .build();
        assert_eq!(
            resolve_action(&on_conn, key(KeyCode::Enter)),
            Some("connect_selected")
        );
    }

    #[test]
    fn test_insert_mode_typing_is_unbound() {
        let ctx = ActionContext::builder()
            .mode(Mode::Insert)
            .focus(FocusTarget::QueryEditor)
            .build();
        assert_eq!(resolve_action(&ctx, key(KeyCode::Char('q'))), None);
        assert_eq!(
            resolve_action(&ctx, key(KeyCode::Esc)),
            Some("exit_insert_mode")
        );
    }

    #[test]
    fn test_leader_fallback_cancels() {
        let ctx = ActionContext::builder().mode(Mode::LeaderPending).build();
        assert_eq!(
            resolve_action(&ctx, key(KeyCode::Char('q'))),
            Some("leader_quit")
        );
        assert_eq!(
            resolve_action(&ctx, key(KeyCode::Char('z'))),
            Some("leader_cancel")
        );
    }

    #[test]
    fn test_overlay_keys_take_precedence() {
        let ctx = ActionContext::builder().overlay(CONFIRM_SCREEN).build();
        assert_eq!(
            resolve_action(&ctx, key(KeyCode::Char('y'))),
            Some("confirm_dialog")
        );
        assert_eq!(
            resolve_action(&ctx, key(KeyCode::Esc)),
            Some("cancel_dialog")
        );
        // Falls through to the mode keymap; the gate will deny it.
        assert_eq!(resolve_action(&ctx, key(KeyCode::Char('q'))), Some("quit"));

        let ctx = ActionContext::builder().overlay(CONNECTION_FORM_SCREEN).build();
        assert_eq!(resolve_action(&ctx, ctrl('s')), Some("save_connection"));
    }

    #[test]
    fn test_ctrl_c_quits() {
        assert_eq!(
            resolve_action(&ActionContext::default(), ctrl('c')),
            Some("quit")
        );
    }
}
