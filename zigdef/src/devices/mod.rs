use crate::Definition;

pub mod air_quality_monitor;

/// Definitions loaded by [`Registry::with_builtin`](crate::Registry::with_builtin)
pub fn definitions() -> Vec<Definition> {
    vec![air_quality_monitor::definition()]
}
