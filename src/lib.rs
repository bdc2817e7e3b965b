//! actiongate — decides, for every user-invoked command of a modal terminal
//! SQL client, whether the command is legal right now.
//!
//! The core lives in [`gate`]; the remaining modules are the host-side pieces
//! that feed it (modes, key resolution, explorer tree, connection session) and
//! the configuration that shapes its action table.

pub mod app;
pub mod config;
pub mod connections;
pub mod gate;
pub mod keys;
pub mod modes;
pub mod tree;

pub use gate::{ActionContext, ActionGate, ActionPredicateRegistry};

/// Lowercase a name and drop `_`, `-` and spaces, so `Query-Editor`,
/// `query_editor` and `queryeditor` compare equal.
pub(crate) fn normalize_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::normalize_name;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name(" Query-Editor "), "queryeditor");
        assert_eq!(normalize_name("LEADER_PENDING"), "leaderpending");
    }
}
