use std::fmt;

use serde::Serialize;

use crate::gate::providers::LiveState;
use crate::modes::Mode;
use crate::normalize_name;

/// The UI surface that currently owns keyboard input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusTarget {
    /// Object explorer (connections, schemas, tables, ...)
    Tree,
    /// SQL query editor
    QueryEditor,
    /// Results grid
    ResultsTable,
    #[default]
    None,
}

impl FocusTarget {
    pub const ALL: [FocusTarget; 4] = [
        FocusTarget::Tree,
        FocusTarget::QueryEditor,
        FocusTarget::ResultsTable,
        FocusTarget::None,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::QueryEditor => "query_editor",
            Self::ResultsTable => "results_table",
            Self::None => "none",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match normalize_name(s).as_str() {
            "tree" | "explorer" => Some(Self::Tree),
            "queryeditor" | "query" | "editor" => Some(Self::QueryEditor),
            "resultstable" | "results" => Some(Self::ResultsTable),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

impl fmt::Display for FocusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of entity under the explorer cursor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    Connection,
    Schema,
    Table,
    Column,
    Query,
    #[default]
    None,
}

impl SelectionKind {
    pub const ALL: [SelectionKind; 6] = [
        SelectionKind::Connection,
        SelectionKind::Schema,
        SelectionKind::Table,
        SelectionKind::Column,
        SelectionKind::Query,
        SelectionKind::None,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Schema => "schema",
            Self::Table => "table",
            Self::Column => "column",
            Self::Query => "query",
            Self::None => "none",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match normalize_name(s).as_str() {
            "connection" => Some(Self::Connection),
            "schema" => Some(Self::Schema),
            "table" => Some(Self::Table),
            "column" => Some(Self::Column),
            "query" => Some(Self::Query),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized description of the node under the explorer cursor.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SelectionDescriptor {
    pub kind: SelectionKind,
    /// Associated data, usually the node's name.
    pub payload: Option<String>,
}

impl SelectionDescriptor {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(kind: SelectionKind, payload: Option<String>) -> Self {
        Self { kind, payload }
    }

    /// Normalize raw cursor-node data.
    ///
    /// `None` (absent cursor, root node or a node without data) and
    /// unrecognized kind strings both become `kind = none`.
    pub fn from_node_data(data: Option<(&str, Option<&str>)>) -> Self {
        let Some((kind, payload)) = data else {
            return Self::none();
        };
        match SelectionKind::from_str_name(kind) {
            Some(SelectionKind::None) | None => Self::none(),
            Some(kind) => Self::new(kind, payload.map(str::to_string)),
        }
    }
}

/// Name of the empty-stack screen; reserved, never an overlay id.
pub const BASE_SCREEN: &str = "base";

/// The screen on top of the overlay stack.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum Screen {
    /// No modal overlay is active.
    #[default]
    Base,
    /// The most recently pushed overlay.
    Overlay(String),
}

impl Screen {
    /// Top of an ordered stack of overlay ids (pushed most-recent-last).
    pub fn top_of<S: AsRef<str>>(stack: &[S]) -> Self {
        match stack.last() {
            Some(id) => Self::Overlay(id.as_ref().to_string()),
            None => Self::Base,
        }
    }

    /// Parse a screen name. `base` (any case) is the sentinel for an empty
    /// stack; anything else must be a valid overlay id.
    pub fn from_str_name(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(BASE_SCREEN) {
            Some(Self::Base)
        } else if Self::is_valid_overlay_id(s) {
            Some(Self::Overlay(s.to_string()))
        } else {
            None
        }
    }

    /// Whether `id` can name an overlay in a guard expression: non-empty,
    /// no whitespace, `&` or `=`, and not the reserved `base`.
    pub fn is_valid_overlay_id(id: &str) -> bool {
        !id.is_empty()
            && !id.eq_ignore_ascii_case(BASE_SCREEN)
            && !id.chars().any(|c| c.is_whitespace() || c == '&' || c == '=')
    }

    pub fn is_base(&self) -> bool {
        matches!(self, Self::Base)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str(BASE_SCREEN),
            Self::Overlay(id) => f.write_str(id),
        }
    }
}

impl Serialize for Screen {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Ambient session booleans supplied by the connection subsystem.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionFlags {
    pub has_current_connection: bool,
    pub has_current_config: bool,
}

/// Immutable snapshot of everything a guard may look at.
///
/// Built fresh for every check; the invariant `selection.kind == none` unless
/// `focus == tree` holds for every value produced by [`ActionContext::capture`]
/// and [`ActionContextBuilder::build`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ActionContext {
    mode: Mode,
    focus: FocusTarget,
    selection: SelectionDescriptor,
    screen: Screen,
    session: SessionFlags,
}

impl ActionContext {
    /// Sample every provider of `live` into a new context.
    pub fn capture<L: LiveState + ?Sized>(live: &L) -> Self {
        let focus = live.focused_target();
        ActionContext::builder()
            .mode(live.current_mode())
            .focus(focus)
            .selection(live.current_selection())
            .screen(live.top_screen())
            .session(live.session_flags())
            .build()
    }

    pub fn builder() -> ActionContextBuilder {
        ActionContextBuilder::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn selection(&self) -> &SelectionDescriptor {
        &self.selection
    }

    pub fn selection_kind(&self) -> SelectionKind {
        self.selection.kind
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn session(&self) -> SessionFlags {
        self.session
    }
}

/// Assembles an [`ActionContext`]; unset fields take their defaults
/// (normal mode, no focus, no selection, base screen, flags false).
#[derive(Debug, Default, Clone)]
pub struct ActionContextBuilder {
    mode: Mode,
    focus: FocusTarget,
    selection: SelectionDescriptor,
    screen: Screen,
    session: SessionFlags,
}

impl ActionContextBuilder {
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn focus(mut self, focus: FocusTarget) -> Self {
        self.focus = focus;
        self
    }

    pub fn selection(mut self, selection: SelectionDescriptor) -> Self {
        self.selection = selection;
        self
    }

    pub fn selection_kind(mut self, kind: SelectionKind) -> Self {
        self.selection = SelectionDescriptor::new(kind, None);
        self
    }

    pub fn screen(mut self, screen: Screen) -> Self {
        self.screen = screen;
        self
    }

    pub fn overlay(self, id: impl Into<String>) -> Self {
        self.screen(Screen::Overlay(id.into()))
    }

    pub fn session(mut self, session: SessionFlags) -> Self {
        self.session = session;
        self
    }

    pub fn has_connection(mut self, value: bool) -> Self {
        self.session.has_current_connection = value;
        self
    }

    pub fn has_config(mut self, value: bool) -> Self {
        self.session.has_current_config = value;
        self
    }

    pub fn build(self) -> ActionContext {
        // Stale cursor data never leaks out of the explorer, and a `none`
        // selection carries no payload.
        let keep = self.focus == FocusTarget::Tree && self.selection.kind != SelectionKind::None;
        let selection = if keep {
            self.selection
        } else {
            SelectionDescriptor::none()
        };
        ActionContext {
            mode: self.mode,
            focus: self.focus,
            selection,
            screen: self.screen,
            session: self.session,
        }
    }
}
