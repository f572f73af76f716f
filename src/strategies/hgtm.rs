//! Hierarchical Group Task Migration (spec §4.4), the master algorithm.
//!
//! Composes leader selection, bag formation over faulted agents, and
//! bag-to-target migration prepared by a scoped run of MPFTM.

use crate::config::{RunConfig, WeightConfig};
use crate::graph::{Graph, ShortestPathOracle};
use crate::survivability::sig;
use crate::types::{AgentId, MigrationRecord, World};

use super::mpftm::run_mpftm;
use super::{execute_single_task_move, select_leaders, BestTracker, MigrationStrategy};

pub struct Hgtm;

impl MigrationStrategy for Hgtm {
    fn name(&self) -> &'static str {
        "hgtm"
    }

    fn migrate(
        &self,
        world: &mut World,
        graph: &Graph,
        oracle: &ShortestPathOracle,
        config: RunConfig,
    ) -> Vec<MigrationRecord> {
        select_leaders(world, graph);

        let faulted = world.faulted_agent_ids();
        if faulted.is_empty() {
            return Vec::new();
        }

        let mut bags: Vec<Bag> = faulted.into_iter().map(|id| Bag { members: vec![id] }).collect();
        merge_bags(world, graph, config.hgtm_weights, &mut bags);

        let mut records = Vec::new();
        for bag in &bags {
            let (_, target) = ben_intra(world, graph, config.hgtm_weights, bag);
            let Some(target) = target else {
                tracing::warn!(bag_leader = bag.members[0], "no eligible destination for bag");
                continue;
            };

            let gsize = bag_task_count(world, bag) as f64;
            let qsize = world.agents[&target].tasks.len() as f64;
            let rl = world.groups[&world.agents[&target].group_id].interaction_level;
            if !(gsize * (1.0 - rl) * 2.0 > qsize) {
                tracing::warn!(target, "receiving agent lacks headroom, bag stays");
                continue;
            }

            let sub_records = prepare_receiver_and_shed(world, graph, oracle, config, target, bag);
            records.extend(sub_records);

            for &member in &bag.members {
                while let Some(record) = execute_single_task_move(world, member, target) {
                    records.push(record);
                }
            }
        }

        records
    }
}

/// A set of co-migrating faulted agents, member ids kept sorted.
struct Bag {
    members: Vec<AgentId>,
}

fn bag_task_count(world: &World, bag: &Bag) -> usize {
    bag.members.iter().map(|&m| world.agents[&m].tasks.len()).sum()
}

/// Repeatedly merges the pair of bags whose combined benefit exceeds the sum
/// of their individual benefits, re-evaluating from scratch each round
/// (pop-and-reinsert, never decrease-key) until no accepted merge remains.
fn merge_bags(world: &World, graph: &Graph, weights: WeightConfig, bags: &mut Vec<Bag>) {
    loop {
        bags.sort_by(|a, b| {
            bag_task_count(world, b)
                .cmp(&bag_task_count(world, a))
                .then(a.members.iter().min().cmp(&b.members.iter().min()))
        });

        let mut merged_any = false;
        'outer: for i in 0..bags.len() {
            for j in (i + 1)..bags.len() {
                let (ben_i, _) = ben_intra(world, graph, weights, &bags[i]);
                let (ben_j, _) = ben_intra(world, graph, weights, &bags[j]);

                let mut combined_members = bags[i].members.clone();
                combined_members.extend(bags[j].members.iter().copied());
                combined_members.sort_unstable();
                let combined = Bag { members: combined_members };
                let (ben_c, _) = ben_intra(world, graph, weights, &combined);

                if ben_c > ben_i + ben_j {
                    bags.remove(j);
                    bags.remove(i);
                    bags.push(combined);
                    merged_any = true;
                    break 'outer;
                }
            }
        }

        if !merged_any {
            break;
        }
    }
}

/// Best same-group, non-faulted neighbor of any bag member to receive the
/// whole bag, and the benefit score that picked it. `None` when no member
/// has an eligible same-group neighbor.
fn ben_intra(world: &World, graph: &Graph, weights: WeightConfig, bag: &Bag) -> (f64, Option<AgentId>) {
    let mut candidates: std::collections::BTreeSet<AgentId> = std::collections::BTreeSet::new();
    for &m in &bag.members {
        for n in world.same_group_neighbors(graph, m) {
            if !bag.members.contains(&n) && !world.agents[&n].fault_a {
                candidates.insert(n);
            }
        }
    }

    let load_in_bag: f64 = bag.members.iter().map(|&m| world.agents[&m].load).sum();
    let mut best = BestTracker::new(false);

    for &n in &candidates {
        let neighbors_of_n = world.same_group_neighbors(graph, n);
        if neighbors_of_n.is_empty() {
            continue;
        }
        let deg = neighbors_of_n.len() as f64;

        let mut cd: f64 = neighbors_of_n
            .iter()
            .map(|&m| graph.edge_weight(n, m).unwrap_or(0.0) * world.agents[&m].tasks.len() as f64)
            .sum();
        let mean_c: f64 =
            neighbors_of_n.iter().map(|&m| world.agents[&m].load_ratio()).sum::<f64>() / deg;
        if mean_c == 0.0 {
            continue;
        }

        cd /= deg;
        cd += load_in_bag;
        cd += bag.members.iter().filter_map(|&x| graph.edge_weight(x, n)).sum::<f64>();

        let cost_increase_p = cd / mean_c;
        let rl = world.groups[&world.agents[&n].group_id].interaction_level;
        let complete_p = 1.0 - (sig(load_in_bag) * rl).max(0.5);
        let ben = weights.b * complete_p - weights.a * cost_increase_p;
        best.consider(ben, n);
    }

    match best.best() {
        Some((score, id)) => (score, Some(id)),
        None => (f64::NEG_INFINITY, None),
    }
}

/// Temporarily mark `target` faulted and every bag member healthy, run MPFTM
/// so the receiver evacuates its own tasks to make room, then restore every
/// flag before the caller executes the actual bag migration.
fn prepare_receiver_and_shed(
    world: &mut World,
    graph: &Graph,
    oracle: &ShortestPathOracle,
    config: RunConfig,
    target: AgentId,
    bag: &Bag,
) -> Vec<MigrationRecord> {
    let old_target = (world.agents[&target].fault_a, world.agents[&target].fault_o);
    world.agents.get_mut(&target).unwrap().fault_a = true;
    world.agents.get_mut(&target).unwrap().fault_o = 0.0;

    let old_members: Vec<(AgentId, bool, f64)> = bag
        .members
        .iter()
        .map(|&m| (m, world.agents[&m].fault_a, world.agents[&m].fault_o))
        .collect();
    for &m in &bag.members {
        let agent = world.agents.get_mut(&m).unwrap();
        agent.fault_a = false;
        agent.fault_o = 1.0;
    }

    let records = run_mpftm(world, graph, oracle, config);

    world.agents.get_mut(&target).unwrap().fault_a = old_target.0;
    world.agents.get_mut(&target).unwrap().fault_o = old_target.1;
    for (m, fa, fo) in old_members {
        let agent = world.agents.get_mut(&m).unwrap();
        agent.fault_a = fa;
        agent.fault_o = fo;
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Agent, Group, Task};

    fn trivial_world() -> (World, Graph) {
        let mut world = World::new();
        let mut group = Group::new(0);
        group.members.insert(0);
        group.members.insert(1);
        world.groups.insert(0, group);

        let mut a0 = Agent::new(0, 10.0, 0);
        a0.fault_a = true;
        a0.push_task(Task::new(1, 5.0, -1));
        world.agents.insert(0, a0);
        world.agents.insert(1, Agent::new(1, 10.0, 0));

        let mut graph = Graph::new();
        graph.add_edge(0, 1, 1.0);
        (world, graph)
    }

    #[test]
    fn leader_selection_skips_faulted_members() {
        let (mut world, graph) = trivial_world();
        select_leaders(&mut world, &graph);
        assert_eq!(world.groups[&0].leader, Some(1));
    }

    #[test]
    fn single_faulted_agent_migrates_its_task() {
        let (mut world, graph) = trivial_world();
        let oracle = ShortestPathOracle::new(&graph);
        let records = Hgtm.migrate(&mut world, &graph, &oracle, RunConfig::default());
        assert!(!records.is_empty());
        assert_eq!(world.agents[&0].tasks.len(), 0);
        assert_eq!(world.agents[&1].load, 5.0);
    }

    #[test]
    fn group_with_every_member_faulted_is_leaderless() {
        let mut world = World::new();
        let mut group = Group::new(0);
        group.members.insert(0);
        group.members.insert(1);
        world.groups.insert(0, group);

        let mut a0 = Agent::new(0, 10.0, 0);
        a0.fault_a = true;
        a0.push_task(Task::new(1, 5.0, -1));
        let mut a1 = Agent::new(1, 10.0, 0);
        a1.fault_a = true;
        world.agents.insert(0, a0);
        world.agents.insert(1, a1);

        let mut graph = Graph::new();
        graph.add_edge(0, 1, 1.0);
        select_leaders(&mut world, &graph);
        assert_eq!(world.groups[&0].leader, None);

        let oracle = ShortestPathOracle::new(&graph);
        let records = Hgtm.migrate(&mut world, &graph, &oracle, RunConfig::default());
        assert!(records.is_empty());
        assert_eq!(world.agents[&0].tasks.len(), 1);
    }
}
