use crossterm::event::{Event, KeyEvent, KeyEventKind};

use crate::config::AppConfig;
use crate::connections::{ConnectionConfig, Session};
use crate::gate::context::{ActionContext, FocusTarget, Screen, SelectionDescriptor};
use crate::gate::providers::{
    focus_from_flags, FocusRegistry, ModeTracker, ScreenStack, SelectionSource, SessionInfo,
};
use crate::gate::{ActionGate, GuardError, GuardField, RegistryError};
use crate::keys::resolve_action;
use crate::modes::Mode;
use crate::tree::ExplorerTree;

/// What the host should do with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The key requests this action and the gate allows it.
    Allowed(&'static str),
    /// The key requests this action but it is not legal right now.
    Denied(&'static str),
    /// The key requests no action.
    Unbound,
}

/// Host-side UI state the gate observes.
///
/// The input dispatcher owns transitions: it changes `mode`, focus and the
/// screen stack. The gate only reads this state through the provider traits.
pub struct App {
    /// Current modal state
    pub mode: Mode,
    /// Object explorer
    pub tree: ExplorerTree,
    /// Query editor has focus
    pub query_focused: bool,
    /// Results table has focus
    pub results_focused: bool,
    /// Overlay ids, most recently pushed last
    pub screen_stack: Vec<String>,
    /// Bound connection and config
    pub session: Session,
    /// Saved connections
    pub connections: Vec<ConnectionConfig>,
    /// Status message (temporary)
    pub status_message: Option<String>,
    gate: ActionGate,
}

impl App {
    /// Build the host state and its gate from `config`.
    pub fn new(config: &AppConfig) -> Result<Self, RegistryError> {
        let gate = config.build_gate()?;
        Ok(Self::with_gate(gate, config.connections.clone()))
    }

    pub fn with_gate(gate: ActionGate, connections: Vec<ConnectionConfig>) -> Self {
        Self {
            mode: Mode::Normal,
            tree: ExplorerTree::from_connections(&connections),
            query_focused: false,
            results_focused: false,
            screen_stack: Vec::new(),
            session: Session::new(),
            connections,
            status_message: None,
            gate,
        }
    }

    pub fn gate(&self) -> &ActionGate {
        &self.gate
    }

    /// Snapshot of the current state.
    pub fn context(&self) -> ActionContext {
        ActionContext::capture(self)
    }

    /// Whether `action` may fire right now.
    pub fn can(&self, action: &str) -> bool {
        self.gate.check_action(self, action)
    }

    /// Give `target` keyboard focus; every other surface loses it.
    pub fn set_focus(&mut self, target: FocusTarget) {
        self.tree.set_focus(target == FocusTarget::Tree);
        self.query_focused = target == FocusTarget::QueryEditor;
        self.results_focused = target == FocusTarget::ResultsTable;
    }

    /// Push an overlay. Ids that no guard could name (including the reserved
    /// `base`) are rejected and the stack is left unchanged.
    pub fn push_screen(&mut self, id: &str) -> Result<(), GuardError> {
        if !Screen::is_valid_overlay_id(id) {
            return Err(GuardError::InvalidValue {
                field: GuardField::Screen.name(),
                value: id.to_string(),
            });
        }
        self.screen_stack.push(id.to_string());
        Ok(())
    }

    pub fn pop_screen(&mut self) -> Option<String> {
        self.screen_stack.pop()
    }

    /// Resolve a terminal event and gate the requested action.
    pub fn handle_event(&mut self, event: Event) -> Dispatch {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            _ => Dispatch::Unbound,
        }
    }

    /// Resolve a key and gate the requested action. The action itself is
    /// not run; on denial a status message is set.
    pub fn handle_key(&mut self, key: KeyEvent) -> Dispatch {
        let ctx = self.context();
        let Some(action) = resolve_action(&ctx, key) else {
            return Dispatch::Unbound;
        };

        if self.gate.check(&ctx, action) {
            self.status_message = None;
            Dispatch::Allowed(action)
        } else {
            self.status_message = Some(format!("'{action}' is not available here"));
            Dispatch::Denied(action)
        }
    }
}

impl ModeTracker for App {
    fn current_mode(&self) -> Mode {
        self.mode
    }
}

impl FocusRegistry for App {
    fn focused_target(&self) -> FocusTarget {
        focus_from_flags(self.tree.has_focus(), self.query_focused, self.results_focused)
    }
}

impl SelectionSource for App {
    fn current_selection(&self) -> SelectionDescriptor {
        if self.focused_target() != FocusTarget::Tree {
            return SelectionDescriptor::none();
        }
        SelectionDescriptor::from_node_data(self.tree.cursor_data())
    }
}

impl ScreenStack for App {
    fn top_screen(&self) -> Screen {
        Screen::top_of(&self.screen_stack)
    }
}

impl SessionInfo for App {
    fn has_current_connection(&self) -> bool {
        self.session.has_current_connection()
    }

    fn has_current_config(&self) -> bool {
        self.session.has_current_config()
    }
}
