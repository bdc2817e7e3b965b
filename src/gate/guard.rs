use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::gate::context::{ActionContext, FocusTarget, Screen, SelectionKind};
use crate::modes::Mode;
use crate::normalize_name;

/// Field of [`ActionContext`] a guard atom constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardField {
    Focus,
    Mode,
    Selection,
    Screen,
    HasConnection,
    HasConfig,
}

impl GuardField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Mode => "mode",
            Self::Selection => "selection",
            Self::Screen => "screen",
            Self::HasConnection => "has_connection",
            Self::HasConfig => "has_config",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match normalize_name(s).as_str() {
            "focus" => Some(Self::Focus),
            "mode" => Some(Self::Mode),
            "selection" | "selectionkind" => Some(Self::Selection),
            "screen" => Some(Self::Screen),
            "hasconnection" | "connection" => Some(Self::HasConnection),
            "hasconfig" | "config" => Some(Self::HasConfig),
            _ => None,
        }
    }
}

/// A single equality test over one context field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Guard {
    Focus(FocusTarget),
    Mode(Mode),
    Selection(SelectionKind),
    Screen(Screen),
    HasConnection(bool),
    HasConfig(bool),
}

impl Guard {
    pub fn field(&self) -> GuardField {
        match self {
            Self::Focus(_) => GuardField::Focus,
            Self::Mode(_) => GuardField::Mode,
            Self::Selection(_) => GuardField::Selection,
            Self::Screen(_) => GuardField::Screen,
            Self::HasConnection(_) => GuardField::HasConnection,
            Self::HasConfig(_) => GuardField::HasConfig,
        }
    }

    /// Whether the atom holds for `ctx`.
    pub fn holds(&self, ctx: &ActionContext) -> bool {
        match self {
            Self::Focus(focus) => ctx.focus() == *focus,
            Self::Mode(mode) => ctx.mode() == *mode,
            Self::Selection(kind) => ctx.selection_kind() == *kind,
            Self::Screen(screen) => ctx.screen() == screen,
            Self::HasConnection(value) => ctx.session().has_current_connection == *value,
            Self::HasConfig(value) => ctx.session().has_current_config == *value,
        }
    }

    fn parse_atom(field: GuardField, value: &str) -> Option<Self> {
        match field {
            GuardField::Focus => FocusTarget::from_str_name(value).map(Self::Focus),
            GuardField::Mode => Mode::from_str_name(value).map(Self::Mode),
            GuardField::Selection => SelectionKind::from_str_name(value).map(Self::Selection),
            GuardField::Screen => Screen::from_str_name(value).map(Self::Screen),
            GuardField::HasConnection => parse_bool(value).map(Self::HasConnection),
            GuardField::HasConfig => parse_bool(value).map(Self::HasConfig),
        }
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field().name();
        match self {
            Self::Focus(v) => write!(f, "{field}={v}"),
            Self::Mode(v) => write!(f, "{field}={v}"),
            Self::Selection(v) => write!(f, "{field}={v}"),
            Self::Screen(v) => write!(f, "{field}={v}"),
            Self::HasConnection(v) | Self::HasConfig(v) => write!(f, "{field}={v}"),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Error from parsing a guard expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("empty guard at position {index}")]
    EmptyAtom { index: usize },
    #[error("guard '{atom}' is missing '='")]
    MissingEquals { atom: String },
    #[error("unknown guard field '{field}'")]
    UnknownField { field: String },
    #[error("invalid value '{value}' for guard field '{field}'")]
    InvalidValue { field: &'static str, value: String },
    #[error("guard field '{field}' appears more than once")]
    DuplicateField { field: &'static str },
}

/// Conjunction of guard atoms. Fields without an atom are "don't care";
/// the empty predicate always holds.
///
/// Equality ignores atom order.
#[derive(Debug, Default, Clone)]
pub struct Predicate {
    guards: Vec<Guard>,
}

impl Predicate {
    /// The always-true predicate.
    pub fn any() -> Self {
        Self::default()
    }

    /// Add an atom, replacing any existing atom on the same field.
    pub fn with(mut self, guard: Guard) -> Self {
        self.guards.retain(|g| g.field() != guard.field());
        self.guards.push(guard);
        self
    }

    pub fn focus(self, focus: FocusTarget) -> Self {
        self.with(Guard::Focus(focus))
    }

    pub fn mode(self, mode: Mode) -> Self {
        self.with(Guard::Mode(mode))
    }

    pub fn selection(self, kind: SelectionKind) -> Self {
        self.with(Guard::Selection(kind))
    }

    /// Only on the base (non-modal) screen.
    pub fn base(self) -> Self {
        self.with(Guard::Screen(Screen::Base))
    }

    /// Only while `id` is the top overlay. Fails for ids the guard language
    /// cannot express, see [`Screen::is_valid_overlay_id`].
    pub fn overlay(self, id: &str) -> Result<Self, GuardError> {
        if !Screen::is_valid_overlay_id(id) {
            return Err(GuardError::InvalidValue {
                field: GuardField::Screen.name(),
                value: id.to_string(),
            });
        }
        Ok(self.with(Guard::Screen(Screen::Overlay(id.to_string()))))
    }

    pub fn has_connection(self, value: bool) -> Self {
        self.with(Guard::HasConnection(value))
    }

    pub fn has_config(self, value: bool) -> Self {
        self.with(Guard::HasConfig(value))
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    /// Evaluate against a context. Total: every context yields a boolean.
    pub fn evaluate(&self, ctx: &ActionContext) -> bool {
        self.guards.iter().all(|g| g.holds(ctx))
    }

    /// Atoms that do not hold for `ctx`, in declaration order.
    pub fn failing<'a>(&'a self, ctx: &ActionContext) -> Vec<&'a Guard> {
        self.guards.iter().filter(|g| !g.holds(ctx)).collect()
    }

    /// Parse `field=value & field=value ...`. An empty expression or `*` is
    /// the always-true predicate.
    pub fn parse(expr: &str) -> Result<Self, GuardError> {
        let expr = expr.trim();
        if expr.is_empty() || expr == "*" {
            return Ok(Self::any());
        }

        let mut predicate = Self::any();
        for (index, atom) in expr.split('&').enumerate() {
            let atom = atom.trim();
            if atom.is_empty() {
                return Err(GuardError::EmptyAtom { index });
            }
            let (field, value) = atom
                .split_once('=')
                .ok_or_else(|| GuardError::MissingEquals {
                    atom: atom.to_string(),
                })?;
            let (field, value) = (field.trim(), value.trim());

            let field = GuardField::from_str_name(field).ok_or_else(|| {
                GuardError::UnknownField {
                    field: field.to_string(),
                }
            })?;
            if predicate.guards.iter().any(|g| g.field() == field) {
                return Err(GuardError::DuplicateField {
                    field: field.name(),
                });
            }
            let guard = if value.is_empty() {
                None
            } else {
                Guard::parse_atom(field, value)
            };
            let guard = guard.ok_or_else(|| GuardError::InvalidValue {
                field: field.name(),
                value: value.to_string(),
            })?;
            predicate.guards.push(guard);
        }
        Ok(predicate)
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        // At most one atom per field, so same length + containment is set equality.
        self.guards.len() == other.guards.len()
            && self.guards.iter().all(|g| other.guards.contains(g))
    }
}

impl Eq for Predicate {}

impl FromStr for Predicate {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.guards.is_empty() {
            return f.write_str("*");
        }
        for (i, guard) in self.guards.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            write!(f, "{guard}")?;
        }
        Ok(())
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
