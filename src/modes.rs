use std::fmt;

use serde::Serialize;

/// Modal editing state — exactly one is active at any instant.
///
/// Transitions are owned by the input dispatcher; the gate only observes the
/// mode at check time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Default: navigation and single-key commands
    #[default]
    Normal,
    /// Typing into the query editor
    Insert,
    /// Selecting a range in the query editor
    Visual,
    /// Leader key pressed, waiting for the follow-up key
    LeaderPending,
    /// Typing a `:` command
    Command,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Normal,
        Mode::Insert,
        Mode::Visual,
        Mode::LeaderPending,
        Mode::Command,
    ];

    /// Human-readable label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Visual => "VISUAL",
            Self::LeaderPending => "LEADER",
            Self::Command => "COMMAND",
        }
    }

    /// Name used in guard expressions and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Insert => "insert",
            Self::Visual => "visual",
            Self::LeaderPending => "leader_pending",
            Self::Command => "command",
        }
    }

    /// Parse a mode name. Accepts `leader_pending`, `leader-pending`, `leaderpending`
    /// and the bare `leader`.
    pub fn from_str_name(s: &str) -> Option<Self> {
        match crate::normalize_name(s).as_str() {
            "normal" => Some(Self::Normal),
            "insert" => Some(Self::Insert),
            "visual" => Some(Self::Visual),
            "leaderpending" | "leader" => Some(Self::LeaderPending),
            "command" => Some(Self::Command),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn test_name_round_trips() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_str_name(mode.name()), Some(mode));
        }
    }

    #[test]
    fn test_parse_spellings() {
        assert_eq!(
            Mode::from_str_name("Leader-Pending"),
            Some(Mode::LeaderPending)
        );
        assert_eq!(Mode::from_str_name("leader"), Some(Mode::LeaderPending));
        assert_eq!(Mode::from_str_name("INSERT"), Some(Mode::Insert));
        assert_eq!(Mode::from_str_name("replace"), None);
    }
}
