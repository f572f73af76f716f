//! Initial task matching and deterministic fault injection (spec §4.2).

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::survivability::is;
use crate::types::{Agent, AgentId, Group, GroupId, Task, World};

/// Result of initialization: the world ready for a migration strategy to
/// run, plus any tasks that arrive later than t=0 (left untouched, per the
/// "no online task arrival" non-goal — they are never placed on an agent).
pub struct InitResult {
    pub world: World,
    pub pending_tasks: Vec<Task>,
}

/// Build the world from parsed inputs: place preTasks, compute group
/// aggregates and interaction levels, then inject faults.
pub fn initialize(tasks: Vec<Task>, agents: Vec<Agent>, fault_ratio: f64, seed: u64) -> InitResult {
    let (pre_tasks, pending_tasks): (Vec<Task>, Vec<Task>) =
        tasks.into_iter().partition(|t| t.is_pre_task());

    let mut world = World::new();
    for agent in agents {
        world
            .groups
            .entry(agent.group_id)
            .or_insert_with(|| Group::new(agent.group_id))
            .members
            .insert(agent.id);
        world.agents.insert(agent.id, agent);
    }

    assign_pre_tasks(&mut world, pre_tasks);
    finalize_groups(&mut world, seed);
    inject_faults(&mut world, fault_ratio);

    InitResult { world, pending_tasks }
}

fn assign_task(world: &mut World, agent_id: AgentId, task: Task) {
    let group_id = world.agents[&agent_id].group_id;
    world.agents.get_mut(&agent_id).unwrap().push_task(task);
    world.groups.get_mut(&group_id).unwrap().group_load += task.size;
}

/// Sort preTasks by size descending and agents by capacity descending; give
/// each agent one task round-robin, then repeatedly hand the next task to
/// whichever agent currently has the smallest load/capacity ratio.
fn assign_pre_tasks(world: &mut World, pre_tasks: Vec<Task>) {
    let mut sorted_tasks = pre_tasks;
    sorted_tasks.sort_by(|a, b| b.size.partial_cmp(&a.size).unwrap());

    let mut sorted_agent_ids: Vec<AgentId> = world.agents.keys().copied().collect();
    sorted_agent_ids.sort_by(|&a, &b| {
        let ca = world.agents[&a].capacity;
        let cb = world.agents[&b].capacity;
        cb.partial_cmp(&ca).unwrap().then(a.cmp(&b))
    });

    let mut task_iter = sorted_tasks.into_iter();

    for &aid in &sorted_agent_ids {
        match task_iter.next() {
            Some(task) => assign_task(world, aid, task),
            None => break,
        }
    }

    let mut heap: BinaryHeap<Reverse<(OrderedFloat<f64>, AgentId)>> = BinaryHeap::new();
    for &aid in &sorted_agent_ids {
        heap.push(Reverse((OrderedFloat(world.agents[&aid].load_ratio()), aid)));
    }

    for task in task_iter {
        loop {
            let Some(Reverse((OrderedFloat(stale_ratio), aid))) = heap.pop() else { break };
            let current_ratio = world.agents[&aid].load_ratio();
            if current_ratio != stale_ratio {
                heap.push(Reverse((OrderedFloat(current_ratio), aid)));
                continue;
            }
            assign_task(world, aid, task);
            heap.push(Reverse((OrderedFloat(world.agents[&aid].load_ratio()), aid)));
            break;
        }
    }
}

/// `groupCapacity = Σ member.capacity`; `interactionLevel` drawn from a
/// two-valued uniform distribution over {0.1, 0.2}, seeded for determinism.
fn finalize_groups(world: &mut World, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let group_ids: Vec<GroupId> = world.groups.keys().copied().collect();
    for gid in group_ids {
        let capacity: f64 = {
            let group = &world.groups[&gid];
            group
                .members
                .iter()
                .map(|id| world.agents[id].capacity)
                .sum()
        };
        let level = if rng.gen_bool(0.5) { 0.1 } else { 0.2 };
        let group = world.groups.get_mut(&gid).unwrap();
        group.group_capacity = capacity;
        group.interaction_level = level;
    }
}

/// `k = max(1, floor(p*n))`, `step = max(1, floor(n/k))`. Agent `id` faults
/// iff `id mod step == 1`. Processed in ascending agent id order.
fn inject_faults(world: &mut World, fault_ratio: f64) {
    let n = world.agents.len();
    if n == 0 {
        return;
    }
    let k = ((fault_ratio * n as f64).floor() as usize).max(1);
    let step = (n / k).max(1);

    let ids: Vec<AgentId> = world.agents.keys().copied().collect();
    for id in ids {
        if id % step as u64 == 1 {
            let group_id = world.agents[&id].group_id;
            let capacity = world.agents[&id].capacity;
            world.agents.get_mut(&id).unwrap().fault_a = true;
            world.groups.get_mut(&group_id).unwrap().group_capacity -= capacity;
        }
    }

    let ids: Vec<AgentId> = world.agents.keys().copied().collect();
    let groups_snapshot: BTreeMap<GroupId, Group> = world.groups.clone();
    for id in ids {
        let agent = &world.agents[&id];
        let group = &groups_snapshot[&agent.group_id];
        let survivability = is(agent, group);
        world.agents.get_mut(&id).unwrap().fault_o = 1.0 - survivability;
    }
}
