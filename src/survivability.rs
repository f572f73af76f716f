//! The sigmoid, and the group/individual survivability functions built on it.
//!
//! `sig(x) = tanh(ln(x+1))`, not the standard logistic sigmoid. Preserved
//! exactly as specified: the clamps in `IS`/`GS` depend on this definition.

use crate::types::{Agent, Group};

/// `sig(x) = tanh(ln(x+1))`.
pub fn sig(x: f64) -> f64 {
    (x + 1.0).ln().tanh()
}

/// Group survivability, clamped to `[0.6, 1]`.
pub fn gs(group: &Group) -> f64 {
    if group.members.is_empty() {
        return 1.0;
    }
    let n = group.members.len() as f64;
    (1.0 - sig(group.group_load / (n * 200.0))).max(0.6)
}

/// Individual survivability, clamped to `[0.3, 1]`.
pub fn is(agent: &Agent, group: &Group) -> f64 {
    (gs(group) * (1.0 - sig(agent.load / 60.0))).max(0.3)
}
