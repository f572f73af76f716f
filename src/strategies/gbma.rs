//! Greedy shortest-path migration (spec §4.6).

use crate::config::RunConfig;
use crate::graph::{Graph, ShortestPathOracle};
use crate::types::{MigrationRecord, World};

use super::{execute_single_task_move, BestTracker, MigrationStrategy};

pub struct Gbma;

impl MigrationStrategy for Gbma {
    fn name(&self) -> &'static str {
        "gbma"
    }

    fn migrate(
        &self,
        world: &mut World,
        _graph: &Graph,
        oracle: &ShortestPathOracle,
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
                let mut best = BestTracker::new(true);
                for &cand in &world.groups[&group_id].members {
                    if cand == source || world.agents[&cand].fault_a {
                        continue;
                    }
                    if world.agents[&cand].remaining_capacity() < task_size {
                        continue;
                    }
                    let weight = oracle.weight(source, cand);
                    if weight.is_infinite() {
                        continue;
                    }
                    best.consider(weight, cand);
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
