//! Greedy max-remaining-capacity migration (spec §4.6).

use crate::config::RunConfig;
use crate::graph::{Graph, ShortestPathOracle};
use crate::types::{MigrationRecord, World};

use super::{execute_single_task_move, BestTracker, MigrationStrategy};

pub struct Mmlma;

impl MigrationStrategy for Mmlma {
    fn name(&self) -> &'static str {
        "mmlma"
    }

    fn migrate(
        &self,
        world: &mut World,
        _graph: &Graph,
        _oracle: &ShortestPathOracle,
        _config: RunConfig,
    ) -> Vec<MigrationRecord> {
        let mut records = Vec::new();
        let faulted = world.faulted_agent_ids();

        for source in faulted {
            loop {
                let Some(task_size) = world.agents[&source].tasks.last().map(|t| t.size) else {
                    break;
                };
                let group_id = world.agents[&source].group_id;
                let mut best = BestTracker::new(false);
                for &cand in &world.groups[&group_id].members {
                    if cand == source || world.agents[&cand].fault_a {
                        continue;
                    }
                    let headroom = world.agents[&cand].remaining_capacity();
                    if headroom < task_size {
                        continue;
                    }
                    best.consider(headroom, cand);
                }

                let Some(dest) = best.best_id() else { break };
                match execute_single_task_move(world, source, dest) {
                    Some(record) => records.push(record),
                    None => break,
                }
            }
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Agent, Group, Task};

    fn world_with_two_candidates() -> (World, Graph) {
        let mut world = World::new();
        let mut group = Group::new(0);
        for id in 0..3 {
            group.members.insert(id);
        }
        world.groups.insert(0, group);

        let mut a0 = Agent::new(0, 10.0, 0);
        a0.fault_a = true;
        a0.push_task(Task::new(1, 2.0, -1));
        world.agents.insert(0, a0);

        let mut a1 = Agent::new(1, 10.0, 0);
        a1.push_task(Task::new(2, 6.0, -1));
        world.agents.insert(1, a1);

        world.agents.insert(2, Agent::new(2, 10.0, 0));

        let mut graph = Graph::new();
        graph.add_edge(0, 1, 1.0);
        graph.add_edge(0, 2, 5.0);
        (world, graph)
    }

    #[test]
    fn prefers_candidate_with_more_headroom_over_nearer_one() {
        let (mut world, graph) = world_with_two_candidates();
        let oracle = ShortestPathOracle::new(&graph);
        let records = Mmlma.migrate(&mut world, &graph, &oracle, RunConfig::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].to, 2);
    }

    #[test]
    fn no_candidate_leaves_task_in_place() {
        let mut world = World::new();
        let mut group = Group::new(0);
        group.members.insert(0);
        group.members.insert(1);
        world.groups.insert(0, group);

        let mut a0 = Agent::new(0, 10.0, 0);
        a0.fault_a = true;
        a0.push_task(Task::new(1, 20.0, -1));
        world.agents.insert(0, a0);
        world.agents.insert(1, Agent::new(1, 5.0, 0));

        let mut graph = Graph::new();
        graph.add_edge(0, 1, 1.0);
        let oracle = ShortestPathOracle::new(&graph);

        let records = Mmlma.migrate(&mut world, &graph, &oracle, RunConfig::default());
        assert!(records.is_empty());
        assert_eq!(world.agents[&0].tasks.len(), 1);
    }
}
