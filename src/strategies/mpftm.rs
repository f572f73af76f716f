//! Potential-field gradient-descent migration (spec §4.5).
//!
//! Runs standalone and as HGTM's preparatory pass, where temporarily-faulted
//! receiving agents shed their own tasks to make room for an incoming bag.

use crate::config::RunConfig;
use crate::graph::{Graph, ShortestPathOracle};
use crate::potential::{build_global_field, build_intra_fields};
use crate::types::{MigrationRecord, World};

use super::{execute_single_task_move, select_leaders, BestTracker, MigrationStrategy};

pub struct Mpftm;

impl MigrationStrategy for Mpftm {
    fn name(&self) -> &'static str {
        "mpftm"
    }

    fn migrate(
        &self,
        world: &mut World,
        graph: &Graph,
        oracle: &ShortestPathOracle,
        config: RunConfig,
    ) -> Vec<MigrationRecord> {
        // Inter-group candidates are restricted to other groups' leaders
        // (below), so a standalone run needs them selected first; HGTM's
        // receiver-prep pass calls `run_mpftm` directly and selects leaders
        // itself before either bag formation or this prep step runs.
        select_leaders(world, graph);
        run_mpftm(world, graph, oracle, config)
    }
}

/// Shared with HGTM's receiving-agent preparation pass.
pub(crate) fn run_mpftm(
    world: &mut World,
    graph: &Graph,
    oracle: &ShortestPathOracle,
    config: RunConfig,
) -> Vec<MigrationRecord> {
    let mut records = Vec::new();
    let faulted = world.faulted_agent_ids();

    for source in faulted {
        loop {
            if world.agents[&source].tasks.is_empty() {
                break;
            }

            // Fields depend on current loads, so they are rebuilt every step
            // rather than patched incrementally (see potential.rs).
            let intra_fields = build_intra_fields(world, graph, oracle, config.hgtm_weights);
            let global_field = build_global_field(world, graph, oracle, config.hgtm_weights);

            let source_group = world.agents[&source].group_id;
            let baseline = intra_fields
                .get(&source_group)
                .map(|f| f.get(source))
                .unwrap_or(0.0);

            let task_size = world.agents[&source].tasks.last().unwrap().size;
            let mut best = BestTracker::new(true);

            if let Some(field) = intra_fields.get(&source_group) {
                for &cand in &world.groups[&source_group].members {
                    if cand == source || world.agents[&cand].fault_a {
                        continue;
                    }
                    if world.agents[&cand].remaining_capacity() < task_size {
                        continue;
                    }
                    let dist = oracle.weight(source, cand);
                    if dist.is_infinite() {
                        continue;
                    }
                    let score = field.get(cand) + config.mpftm_alpha * dist;
                    best.consider(score, cand);
                }
            }

            // Inter-group candidates are restricted to leaders of other
            // groups, scored with the global field weighted by the
            // destination group's interaction level.
            for group in world.groups.values() {
                if group.id == source_group {
                    continue;
                }
                let Some(leader) = group.leader else { continue };
                if world.agents[&leader].fault_a {
                    continue;
                }
                if world.agents[&leader].remaining_capacity() < task_size {
                    continue;
                }
                let dist = oracle.weight(source, leader);
                if dist.is_infinite() {
                    continue;
                }
                let score = global_field.get(leader) * group.interaction_level
                    + config.mpftm_alpha * dist;
                best.consider(score, leader);
            }

            let Some((score, dest)) = best.best() else { break };
            if score >= baseline {
                break;
            }

            match execute_single_task_move(world, source, dest) {
                Some(record) => records.push(record),
                None => break,
            }
        }
    }

    records
}
