use crate::connections::ConnectionConfig;
use crate::gate::providers::SessionInfo;

/// The connection currently bound to the UI.
///
/// Opening the actual driver connection happens elsewhere; the session only
/// records the outcome so the gate can see it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Session {
    current_config: Option<ConnectionConfig>,
    /// Target string of the open connection.
    current_connection: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `config` current. Drops any open connection to a different config.
    pub fn select_config(&mut self, config: ConnectionConfig) {
        if self.current_config.as_ref() != Some(&config) {
            self.current_connection = None;
        }
        log::debug!("selected connection config '{}'", config.name);
        self.current_config = Some(config);
    }

    /// Record that the driver connected to `target` for the current config.
    /// Ignored when no config is selected.
    pub fn mark_connected(&mut self, target: impl Into<String>) {
        match &self.current_config {
            Some(config) => {
                let target = target.into();
                log::debug!("connected '{}' to {target}", config.name);
                self.current_connection = Some(target);
            }
            None => log::warn!("connection reported without a selected config"),
        }
    }

    pub fn disconnect(&mut self) {
        self.current_connection = None;
    }

    /// Forget both the connection and the config.
    pub fn clear(&mut self) {
        self.current_connection = None;
        self.current_config = None;
    }

    pub fn current_config(&self) -> Option<&ConnectionConfig> {
        self.current_config.as_ref()
    }

    pub fn current_connection(&self) -> Option<&str> {
        self.current_connection.as_deref()
    }
}

impl SessionInfo for Session {
    fn has_current_connection(&self) -> bool {
        self.current_connection.is_some()
    }

    fn has_current_config(&self) -> bool {
        self.current_config.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_follow_lifecycle() {
        let mut session = Session::new();
        assert!(!session.has_current_config());
        assert!(!session.has_current_connection());

        session.mark_connected("md:");
        assert!(!session.has_current_connection());

        session.select_config(ConnectionConfig::new("cloud", "motherduck"));
        assert!(session.has_current_config());
        session.mark_connected("md:");
        assert!(session.has_current_connection());
        assert_eq!(session.current_connection(), Some("md:"));

        session.disconnect();
        assert!(!session.has_current_connection());
        assert!(session.has_current_config());

        session.clear();
        assert!(!session.has_current_config());
    }

    #[test]
    fn test_switching_config_drops_connection() {
        let mut session = Session::new();
        session.select_config(ConnectionConfig::new("a", "duckdb"));
        session.mark_connected(":memory:");

        session.select_config(ConnectionConfig::new("a", "duckdb"));
        assert!(session.has_current_connection());

        session.select_config(ConnectionConfig::new("b", "duckdb"));
        assert!(!session.has_current_connection());
    }
}
