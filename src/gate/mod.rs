//! The action gate: decides whether a named action may fire right now.
//!
//! The host calls [`ActionGate::check_action`] for every key that resolves to an
//! action, before dispatching the action's effect. The gate samples the live
//! state into an immutable [`ActionContext`], looks the action up in the
//! [`ActionPredicateRegistry`] and evaluates its predicate. Unknown actions are
//! denied. Nothing is ever written back to the host.

pub mod context;
pub mod guard;
pub mod providers;
pub mod registry;

pub use context::{
    ActionContext, ActionContextBuilder, FocusTarget, Screen, SelectionDescriptor, SelectionKind,
    SessionFlags,
};
pub use guard::{Guard, GuardError, GuardField, Predicate};
pub use providers::LiveState;
pub use registry::{ActionEntry, ActionPredicateRegistry, RegistryError};

/// Outcome of a check, with enough detail for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<'a> {
    Allowed,
    /// The action is registered but these atoms do not hold.
    Denied(Vec<&'a Guard>),
    /// No registry entry for the action.
    Unknown,
}

impl Verdict<'_> {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Advisory authorization engine. Cheap enough to call on every keystroke.
#[derive(Debug, Clone)]
pub struct ActionGate {
    registry: ActionPredicateRegistry,
    log_denials: bool,
}

impl ActionGate {
    pub fn new(registry: ActionPredicateRegistry) -> Self {
        Self {
            registry,
            log_denials: false,
        }
    }

    /// Log denials at `info` instead of `debug`.
    pub fn with_denial_logging(mut self, enabled: bool) -> Self {
        self.log_denials = enabled;
        self
    }

    pub fn registry(&self) -> &ActionPredicateRegistry {
        &self.registry
    }

    /// Sample `live` and decide whether `action` may fire.
    pub fn check_action<L: LiveState + ?Sized>(&self, live: &L, action: &str) -> bool {
        let ctx = ActionContext::capture(live);
        self.check(&ctx, action)
    }

    /// Decide against an already captured context.
    pub fn check(&self, ctx: &ActionContext, action: &str) -> bool {
        self.verdict(ctx, action).is_allowed()
    }

    /// Like [`check`](Self::check), but reports why an action was denied.
    pub fn verdict<'a>(&'a self, ctx: &ActionContext, action: &str) -> Verdict<'a> {
        let Some(predicate) = self.registry.lookup(action) else {
            if self.log_denials {
                log::info!("unknown action '{action}' denied");
            } else {
                log::debug!("unknown action '{action}' denied");
            }
            return Verdict::Unknown;
        };

        let failing = predicate.failing(ctx);
        log::trace!(
            "check '{action}' [{predicate}] mode={} focus={} selection={} screen={} -> {}",
            ctx.mode(),
            ctx.focus(),
            ctx.selection_kind(),
            ctx.screen(),
            failing.is_empty()
        );
        if failing.is_empty() {
            return Verdict::Allowed;
        }

        if self.log_denials {
            log::info!("action '{action}' denied: {}", join_guards(&failing));
        } else {
            log::debug!("action '{action}' denied: {}", join_guards(&failing));
        }
        Verdict::Denied(failing)
    }

    /// Names of every registered action allowed in `ctx`, sorted.
    pub fn allowed_actions(&self, ctx: &ActionContext) -> Vec<&str> {
        self.registry
            .entries()
            .into_iter()
            .filter(|entry| entry.predicate.evaluate(ctx))
            .map(|entry| entry.name.as_str())
            .collect()
    }
}

impl Default for ActionGate {
    fn default() -> Self {
        Self::new(ActionPredicateRegistry::builtin())
    }
}

pub(crate) fn join_guards(guards: &[&Guard]) -> String {
    guards
        .iter()
        .map(|g| g.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::modes::Mode;

    #[test]
    fn test_unknown_action_is_unknown() {
        let gate = ActionGate::default();
        assert_eq!(
            gate.verdict(&ActionContext::default(), "frobnicate"),
            Verdict::Unknown
        );
        assert!(!gate.check(&ActionContext::default(), "frobnicate"));
    }

    struct CaptureLogger(Mutex<Vec<(log::Level, String)>>);

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            let mut records = self.0.lock().unwrap();
            records.push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    static CAPTURE: CaptureLogger = CaptureLogger(Mutex::new(Vec::new()));

    #[test]
    fn test_unknown_action_denied_with_denial_logging() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);

        let action = "frobnicate_loudly";
        let gate = ActionGate::default().with_denial_logging(true);
        assert_eq!(gate.verdict(&ActionContext::default(), action), Verdict::Unknown);

        let records = CAPTURE.0.lock().unwrap();
        let logged_at_info = records
            .iter()
            .any(|(level, msg)| *level == log::Level::Info && msg.contains(action));
        assert!(logged_at_info);
    }

    #[test]
    fn test_verdict_lists_failing_guards() {
        let gate = ActionGate::default();
        let ctx = ActionContext::builder().focus(FocusTarget::QueryEditor).build();
        match gate.verdict(&ctx, "edit_connection") {
            Verdict::Denied(failing) => {
                assert_eq!(join_guards(&failing), "focus=tree, selection=connection");
            }
            other => panic!("expected denial, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_registry_denies_everything() {
        let gate = ActionGate::new(ActionPredicateRegistry::new());
        assert!(!gate.check(&ActionContext::default(), "quit"));
    }

    #[test]
    fn test_allowed_actions_in_insert_mode() {
        let gate = ActionGate::default();
        let ctx = ActionContext::builder()
            .mode(Mode::Insert)
            .focus(FocusTarget::QueryEditor)
            .build();
        assert_eq!(gate.allowed_actions(&ctx), vec!["exit_insert_mode"]);

        let ctx = ActionContext::builder()
            .mode(Mode::Insert)
            .focus(FocusTarget::QueryEditor)
            .has_connection(true)
            .build();
        assert_eq!(
            gate.allowed_actions(&ctx),
            vec!["execute_query_insert", "exit_insert_mode"]
        );
    }
}
