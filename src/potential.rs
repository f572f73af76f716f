//! Contextual load and potential fields (spec §4.4 phases 4-5).
//!
//! Treated as a read-mostly map from agent id to real: always rebuilt from
//! current agent/group state rather than patched incrementally, so it never
//! drifts out of sync with the world it describes.

use std::collections::HashMap;

use crate::config::WeightConfig;
use crate::graph::{Graph, ShortestPathOracle};
use crate::survivability::is;
use crate::types::{AgentId, GroupId, World};

/// A read-mostly mapping from agent id to a potential-field scalar.
#[derive(Debug, Clone, Default)]
pub struct PotentialField {
    values: HashMap<AgentId, f64>,
}

impl PotentialField {
    pub fn get(&self, id: AgentId) -> f64 {
        *self.values.get(&id).unwrap_or(&0.0)
    }
}

fn own_term(world: &World, weights: WeightConfig, agent_id: AgentId) -> f64 {
    let agent = &world.agents[&agent_id];
    let group = &world.groups[&agent.group_id];
    weights.a * (agent.load / agent.capacity) - weights.b * is(agent, group)
}

/// `contextual(r)` restricted to same-group neighbors, using the group's leader.
pub fn contextual_load(
    world: &World,
    graph: &Graph,
    oracle: &ShortestPathOracle,
    weights: WeightConfig,
    leader: AgentId,
    r: AgentId,
) -> f64 {
    let neighbors = world.same_group_neighbors(graph, r);
    let deg = neighbors.len() as f64;

    let f_r = own_term(world, weights, r);
    let domain_f: f64 = neighbors.iter().map(|&n| own_term(world, weights, n)).sum();
    let cost_sum: f64 = neighbors
        .iter()
        .map(|&n| graph.edge_weight(r, n).unwrap_or(0.0))
        .sum::<f64>()
        + oracle.weight(leader, r);

    f_r + 0.1 * (domain_f / (deg + 2.0) + cost_sum / (deg + 1.0))
}

/// Analogous scalar using neighbors across all groups; each neighbor's
/// contribution is scaled by its own group's interaction level, since a
/// higher `RL` on the target group means stronger cross-group attraction.
pub fn global_contextual_load(
    world: &World,
    graph: &Graph,
    oracle: &ShortestPathOracle,
    weights: WeightConfig,
    leader: AgentId,
    r: AgentId,
) -> f64 {
    let neighbors: Vec<AgentId> = graph.neighbors(r).map(|(n, _)| n).collect();
    let deg = neighbors.len() as f64;

    let f_r = own_term(world, weights, r);
    let domain_f: f64 = neighbors
        .iter()
        .map(|&n| {
            let rl = world.groups[&world.agents[&n].group_id].interaction_level;
            own_term(world, weights, n) * rl
        })
        .sum();
    let cost_sum: f64 = neighbors
        .iter()
        .map(|&n| graph.edge_weight(r, n).unwrap_or(0.0))
        .sum::<f64>()
        + oracle.weight(leader, r);

    f_r + 0.1 * (domain_f / (deg + 2.0) + cost_sum / (deg + 1.0))
}

fn leader_or_self(world: &World, group_id: GroupId, agent_id: AgentId) -> AgentId {
    world.groups[&group_id].leader.unwrap_or(agent_id)
}

/// Build the per-group (intra) potential field for every group that has a
/// leader. Groups without a leader (all members faulted) are omitted.
pub fn build_intra_fields(
    world: &World,
    graph: &Graph,
    oracle: &ShortestPathOracle,
    weights: WeightConfig,
) -> HashMap<GroupId, PotentialField> {
    let mut fields = HashMap::new();
    for group in world.groups.values() {
        let mut values = HashMap::new();
        for &member in &group.members {
            let leader = leader_or_self(world, group.id, member);
            values.insert(member, contextual_load(world, graph, oracle, weights, leader, member));
        }
        fields.insert(group.id, PotentialField { values });
    }
    fields
}

/// Build the single global (inter) potential field over every agent.
pub fn build_global_field(
    world: &World,
    graph: &Graph,
    oracle: &ShortestPathOracle,
    weights: WeightConfig,
) -> PotentialField {
    let mut values = HashMap::new();
    for agent in world.agents.values() {
        let leader = leader_or_self(world, agent.group_id, agent.id);
        values.insert(
            agent.id,
            global_contextual_load(world, graph, oracle, weights, leader, agent.id),
        );
    }
    PotentialField { values }
}
