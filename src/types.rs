//! Core data model: agents, tasks, groups, and migration records.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type AgentId = u64;
pub type GroupId = u64;
pub type TaskId = u64;

/// A unit of work. Immutable after load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub size: f64,
    /// -1 means the task is present at t=0 (a "preTask")
    pub arrive_time: i64,
}

impl Task {
    pub fn new(id: TaskId, size: f64, arrive_time: i64) -> Self {
        Self { id, size, arrive_time }
    }

    pub fn is_pre_task(&self) -> bool {
        self.arrive_time == -1
    }
}

/// A node of the network: finite capacity, a mutable task list, and fault state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub capacity: f64,
    pub load: f64,
    pub tasks: Vec<Task>,
    pub group_id: GroupId,
    /// Functional fault indicator: if set, this agent is a migration source, never a destination.
    pub fault_a: bool,
    /// Overload-fault probability in [0, 1].
    pub fault_o: f64,
}

impl Agent {
    pub fn new(id: AgentId, capacity: f64, group_id: GroupId) -> Self {
        Self {
            id,
            capacity,
            load: 0.0,
            tasks: Vec::new(),
            group_id,
            fault_a: false,
            fault_o: 0.0,
        }
    }

    /// Ratio of current load to capacity.
    pub fn load_ratio(&self) -> f64 {
        self.load / self.capacity
    }

    /// Remaining headroom before `capacity` is exceeded.
    pub fn remaining_capacity(&self) -> f64 {
        self.capacity - self.load
    }

    /// Add a task, updating `load`. Does not check capacity; callers enforce
    /// the "no destination overflow" invariant before calling this.
    pub fn push_task(&mut self, task: Task) {
        self.load += task.size;
        self.tasks.push(task);
    }

    /// Remove and return the last task in the list (LIFO, matching the
    /// "move one task at a time" phrasing used by MPFTM and the greedy
    /// strategies), updating `load`.
    pub fn pop_task(&mut self) -> Option<Task> {
        let task = self.tasks.pop()?;
        self.load -= task.size;
        Some(task)
    }

    pub fn is_faulted(&self) -> bool {
        self.fault_a
    }
}

/// A partition block of agents sharing a leader and an interaction level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub members: BTreeSet<AgentId>,
    pub leader: Option<AgentId>,
    /// Ordered backups, highest centrality first. At most 2.
    pub ad_leaders: Vec<AgentId>,
    pub group_load: f64,
    pub group_capacity: f64,
    /// In {0.1, 0.2}.
    pub interaction_level: f64,
}

impl Group {
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            members: BTreeSet::new(),
            leader: None,
            ad_leaders: Vec::new(),
            group_load: 0.0,
            group_capacity: 0.0,
            interaction_level: 0.1,
        }
    }
}

/// One migrated task: `from` lost it, `to` gained it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub from: AgentId,
    pub to: AgentId,
}

/// The full in-memory world state: agents, groups, and the graph that
/// connects them. Created fresh (deep-cloned from parsed inputs) before each
/// algorithm run, mutated only by the initializer and the migration engine.
#[derive(Debug, Clone)]
pub struct World {
    pub agents: BTreeMap<AgentId, Agent>,
    pub groups: BTreeMap<GroupId, Group>,
}

impl World {
    pub fn new() -> Self {
        Self { agents: BTreeMap::new(), groups: BTreeMap::new() }
    }

    pub fn total_load(&self) -> f64 {
        self.agents.values().map(|a| a.load).sum()
    }

    pub fn total_task_count(&self) -> usize {
        self.agents.values().map(|a| a.tasks.len()).sum()
    }

    pub fn faulted_agent_ids(&self) -> Vec<AgentId> {
        self.agents
            .values()
            .filter(|a| a.fault_a)
            .map(|a| a.id)
            .collect()
    }

    /// Same-group neighbor ids of `agent_id`, from the graph's adjacency list.
    pub fn same_group_neighbors(&self, graph: &crate::graph::Graph, agent_id: AgentId) -> Vec<AgentId> {
        let Some(agent) = self.agents.get(&agent_id) else { return Vec::new() };
        graph
            .neighbors(agent_id)
            .filter(|(n, _)| {
                self.agents
                    .get(n)
                    .is_some_and(|na| na.group_id == agent.group_id)
            })
            .map(|(n, _)| n)
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_pre_task_flag() {
        let t = Task::new(1, 5.0, -1);
        assert!(t.is_pre_task());
        let t2 = Task::new(2, 5.0, 3);
        assert!(!t2.is_pre_task());
    }

    #[test]
    fn agent_push_pop_updates_load() {
        let mut a = Agent::new(1, 10.0, 0);
        a.push_task(Task::new(1, 4.0, -1));
        assert_eq!(a.load, 4.0);
        assert_eq!(a.remaining_capacity(), 6.0);

        let popped = a.pop_task().unwrap();
        assert_eq!(popped.size, 4.0);
        assert_eq!(a.load, 0.0);
    }

    #[test]
    fn agent_load_ratio() {
        let mut a = Agent::new(1, 10.0, 0);
        a.push_task(Task::new(1, 5.0, -1));
        assert_eq!(a.load_ratio(), 0.5);
    }

    #[test]
    fn world_total_load_conservation() {
        let mut w = World::new();
        let mut a0 = Agent::new(0, 10.0, 0);
        a0.push_task(Task::new(1, 3.0, -1));
        let mut a1 = Agent::new(1, 10.0, 0);
        a1.push_task(Task::new(2, 7.0, -1));
        w.agents.insert(0, a0);
        w.agents.insert(1, a1);

        assert_eq!(w.total_load(), 10.0);
        assert_eq!(w.total_task_count(), 2);
    }
}
