//! End-to-end scenarios S1-S6 (spec §8).

use faultmesh::config::RunConfig;
use faultmesh::evaluator::evaluate;
use faultmesh::graph::{Graph, ShortestPathOracle};
use faultmesh::strategies::{Gbma, Hgtm, MigrationStrategy, Mmlma, Mpftm};
use faultmesh::types::{Agent, Group, MigrationRecord, Task, World};

fn strategies() -> Vec<Box<dyn MigrationStrategy>> {
    vec![Box::new(Hgtm), Box::new(Mpftm), Box::new(Gbma), Box::new(Mmlma)]
}

fn one_group_world(agent_capacities: &[f64], faulted: &[usize]) -> World {
    let mut world = World::new();
    let mut group = Group::new(0);
    for (i, &cap) in agent_capacities.iter().enumerate() {
        let id = i as u64;
        group.members.insert(id);
        let mut agent = Agent::new(id, cap, 0);
        if faulted.contains(&i) {
            agent.fault_a = true;
        }
        world.agents.insert(id, agent);
    }
    world.groups.insert(0, group);
    world
}

/// S1: trivial two-agent migration.
#[test]
fn s1_trivial_migration() {
    for strategy in strategies() {
        let mut world = one_group_world(&[10.0, 10.0], &[0]);
        world.agents.get_mut(&0).unwrap().push_task(Task::new(1, 5.0, -1));

        let mut graph = Graph::new();
        graph.add_edge(0, 1, 1.0);
        let oracle = ShortestPathOracle::new(&graph);

        let records = strategy.migrate(&mut world, &graph, &oracle, RunConfig::default());
        assert_eq!(records, vec![MigrationRecord { from: 0, to: 1 }], "{}", strategy.name());

        let record = evaluate(strategy.name(), &world, &oracle, &records, RunConfig::default().eval_weights, std::time::Duration::ZERO);
        assert_eq!(record.exec_cost, 0.5, "{}", strategy.name());
        assert_eq!(record.mig_cost, 1.0, "{}", strategy.name());
    }
}

/// S2: no destination (both agents faulted) - task stays put.
#[test]
fn s2_no_destination() {
    for strategy in strategies() {
        let mut world = one_group_world(&[10.0, 10.0], &[0, 1]);
        world.agents.get_mut(&0).unwrap().push_task(Task::new(1, 5.0, -1));

        let mut graph = Graph::new();
        graph.add_edge(0, 1, 1.0);
        let oracle = ShortestPathOracle::new(&graph);

        let records = strategy.migrate(&mut world, &graph, &oracle, RunConfig::default());
        assert!(records.is_empty(), "{}", strategy.name());
        assert_eq!(world.agents[&0].tasks.len(), 1, "{}", strategy.name());
    }
}

/// S3: two groups, cross-group; in-group candidate would overflow so greedy
/// strategies refuse and the task stays on the source.
#[test]
fn s3_two_groups_refuse_overflow() {
    let mut world = World::new();
    let mut g0 = Group::new(0);
    g0.members.insert(0);
    g0.members.insert(1);
    let mut g1 = Group::new(1);
    g1.members.insert(2);
    g1.members.insert(3);
    world.groups.insert(0, g0);
    world.groups.insert(1, g1);

    let mut a0 = Agent::new(0, 10.0, 0);
    a0.fault_a = true;
    a0.push_task(Task::new(1, 3.0, -1));
    world.agents.insert(0, a0);

    let mut a1 = Agent::new(1, 3.0, 0);
    a1.push_task(Task::new(2, 2.0, -1));
    world.agents.insert(1, a1);

    world.agents.insert(2, Agent::new(2, 10.0, 1));
    world.agents.insert(3, Agent::new(3, 10.0, 1));

    let mut graph = Graph::new();
    graph.add_edge(0, 1, 1.0);
    graph.add_edge(1, 2, 1.0);
    graph.add_edge(2, 3, 1.0);
    graph.add_edge(3, 0, 1.0);
    let oracle = ShortestPathOracle::new(&graph);

    for strategy in [Box::new(Mmlma) as Box<dyn MigrationStrategy>, Box::new(Gbma)] {
        let mut world = world.clone();
        let records = strategy.migrate(&mut world, &graph, &oracle, RunConfig::default());
        assert!(records.is_empty(), "{}", strategy.name());
        assert_eq!(world.agents[&0].tasks.len(), 1, "{}", strategy.name());
    }
}

/// S4: tie-breaking always prefers the lowest agent id among equal candidates.
#[test]
fn s4_tie_breaking_prefers_lowest_id() {
    let mut world = one_group_world(&[10.0, 10.0, 10.0], &[0]);
    world.agents.get_mut(&0).unwrap().push_task(Task::new(1, 1.0, -1));

    let mut graph = Graph::new();
    graph.add_edge(0, 1, 1.0);
    graph.add_edge(0, 2, 1.0);
    graph.add_edge(1, 2, 1.0);
    let oracle = ShortestPathOracle::new(&graph);

    for strategy in strategies() {
        let mut world = world.clone();
        let records = strategy.migrate(&mut world, &graph, &oracle, RunConfig::default());
        assert_eq!(records.len(), 1, "{}", strategy.name());
        assert_eq!(records[0].to, 1, "{}", strategy.name());
    }
}

/// S5: disconnected graph - migration cost contributes 0 and the run
/// surfaces exactly one unreachable-migration diagnostic.
#[test]
fn s5_unreachable_migration_is_diagnosed() {
    let world = one_group_world(&[10.0, 10.0], &[0]);
    let graph = Graph::new(); // no edges at all: 0 and 1 are unreachable from each other

    let oracle = ShortestPathOracle::new(&graph);
    let records = vec![MigrationRecord { from: 0, to: 1 }];
    let record = evaluate("gbma", &world, &oracle, &records, RunConfig::default().eval_weights, std::time::Duration::ZERO);

    assert_eq!(record.mig_cost, 0.0);
    assert_eq!(record.unreachable_migrations, 1);
}

/// S6: random-shaped 50-agent, 200-task instance with 30% faults - total
/// task size and count are conserved across every algorithm.
#[test]
fn s6_load_conservation_on_larger_instance() {
    let n_agents = 50u64;
    let n_tasks = 200u64;

    let mut graph = Graph::new();
    for id in 0..n_agents {
        let next = (id + 1) % n_agents;
        graph.add_edge(id, next, 1.0 + (id % 5) as f64);
    }

    let agents: Vec<Agent> = (0..n_agents).map(|id| Agent::new(id, 20.0 + (id % 7) as f64, id % 5)).collect();
    let tasks: Vec<Task> = (0..n_tasks).map(|id| Task::new(id, 1.0 + (id % 4) as f64, -1)).collect();

    let total_size_before: f64 = tasks.iter().map(|t| t.size).sum();

    for strategy in strategies() {
        let init_result = faultmesh::init::initialize(tasks.clone(), agents.clone(), 0.3, 7);
        let mut world = init_result.world;
        let oracle = ShortestPathOracle::new(&graph);

        assert_eq!(world.total_task_count(), n_tasks as usize, "{}", strategy.name());
        assert!((world.total_load() - total_size_before).abs() < 1e-9, "{}", strategy.name());

        strategy.migrate(&mut world, &graph, &oracle, RunConfig::default());

        assert_eq!(world.total_task_count(), n_tasks as usize, "{} task count not conserved", strategy.name());
        assert!(
            (world.total_load() - total_size_before).abs() < 1e-6,
            "{} load not conserved",
            strategy.name()
        );
    }
}
