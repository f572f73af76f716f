//! Migration strategies, dispatched through a common trait.
//!
//! Modeled on the teacher's `SchedulingPolicy` trait: one small struct per
//! strategy, each implementing the same interface so the batch driver can
//! run all four uniformly.

mod gbma;
mod hgtm;
mod mmlma;
mod mpftm;

pub use gbma::Gbma;
pub use hgtm::Hgtm;
pub use mmlma::Mmlma;
pub use mpftm::Mpftm;

use crate::centrality::group_betweenness;
use crate::config::RunConfig;
use crate::error::{FaultMeshError, Result};
use crate::graph::{Graph, ShortestPathOracle};
use crate::types::{AgentId, GroupId, MigrationRecord, World};

/// A migration strategy mutates the world in place and returns the list of
/// `MigrationRecord`s it produced, in execution order.
pub trait MigrationStrategy {
    fn name(&self) -> &'static str;

    fn migrate(
        &self,
        world: &mut World,
        graph: &Graph,
        oracle: &ShortestPathOracle,
        config: RunConfig,
    ) -> Vec<MigrationRecord>;
}

/// Look up a strategy by its spec name (case-insensitive): `hgtm`, `mpftm`, `gbma`, `mmlma`.
pub fn by_name(name: &str) -> Result<Box<dyn MigrationStrategy>> {
    match name.to_ascii_lowercase().as_str() {
        "hgtm" => Ok(Box::new(Hgtm)),
        "mpftm" => Ok(Box::new(Mpftm)),
        "gbma" => Ok(Box::new(Gbma)),
        "mmlma" => Ok(Box::new(Mmlma)),
        other => Err(FaultMeshError::UnknownAlgorithm(other.to_string())),
    }
}

/// Tracks the best-scoring candidate seen so far, breaking ties by the
/// smallest id (spec §5's ordering guarantee). Avoids relying on
/// `Iterator::max_by`/`min_by`'s "last element wins" tie semantics, which
/// pick the wrong side of a tie for our ascending-id rule.
pub(crate) struct BestTracker {
    minimize: bool,
    best: Option<(f64, u64)>,
}

impl BestTracker {
    pub fn new(minimize: bool) -> Self {
        Self { minimize, best: None }
    }

    pub fn consider(&mut self, score: f64, id: u64) {
        let better = match self.best {
            None => true,
            Some((best_score, best_id)) => {
                if self.minimize {
                    score < best_score || (score == best_score && id < best_id)
                } else {
                    score > best_score || (score == best_score && id < best_id)
                }
            }
        };
        if better {
            self.best = Some((score, id));
        }
    }

    pub fn best(&self) -> Option<(f64, u64)> {
        self.best
    }

    pub fn best_id(&self) -> Option<u64> {
        self.best.map(|(_, id)| id)
    }
}

/// Move one task from `from` to `to`, updating loads and (if the migration
/// crosses groups) each group's `groupLoad`. Returns the migration record.
pub(crate) fn execute_single_task_move(
    world: &mut World,
    from: u64,
    to: u64,
) -> Option<MigrationRecord> {
    let task = world.agents.get_mut(&from)?.pop_task()?;
    world.agents.get_mut(&to).unwrap().push_task(task);

    let from_group = world.agents[&from].group_id;
    let to_group = world.agents[&to].group_id;
    if from_group != to_group {
        world.groups.get_mut(&from_group).unwrap().group_load -= task.size;
        world.groups.get_mut(&to_group).unwrap().group_load += task.size;
    }

    Some(MigrationRecord { from, to })
}

/// Leader = highest group-restricted betweenness among non-faulted members
/// (ties broken by lowest id); up to two runner-ups become ad-leaders. A
/// group with no non-faulted member is left leaderless, which folds phase 3
/// ("leader-fault replacement") into this single ranking pass: a faulted
/// top-scorer is simply never a candidate to begin with.
///
/// Shared by HGTM (phase 1) and MPFTM (whose inter-group candidates are
/// restricted to other groups' leaders), so both strategies see a consistent
/// `Group.leader` whether run standalone or as HGTM's receiver-prep pass.
pub(crate) fn select_leaders(world: &mut World, graph: &Graph) {
    let group_ids: Vec<GroupId> = world.groups.keys().copied().collect();
    for gid in group_ids {
        let members: Vec<AgentId> = world.groups[&gid].members.iter().copied().collect();
        let scores = group_betweenness(graph, &members);
        let mut ranked: Vec<AgentId> = members.iter().copied().filter(|id| !world.agents[id].fault_a).collect();
        ranked.sort_by(|&a, &b| scores[&b].partial_cmp(&scores[&a]).unwrap().then(a.cmp(&b)));
        let group = world.groups.get_mut(&gid).unwrap();
        group.leader = ranked.first().copied();
        group.ad_leaders = ranked.iter().skip(1).take(2).copied().collect();
    }
}
