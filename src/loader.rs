//! Line-oriented text format readers for tasks, agents, and graph edges.
//!
//! Whitespace-separated, one record per line. Empty and malformed lines are
//! logged and skipped; they never abort a run. Negative capacities and
//! non-numeric tokens where a number is required are fatal (spec §7).

use std::path::Path;

use crate::error::{FaultMeshError, Result};
use crate::graph::Graph;
use crate::types::{Agent, GroupId, Task};

/// Parsed `id size arriveTime` lines from the task file.
pub fn load_tasks(path: impl AsRef<Path>) -> Result<Vec<Task>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|_| FaultMeshError::FileNotFound(path.display().to_string()))?;

    let mut tasks = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 3 {
            tracing::warn!(line = lineno + 1, "skipping malformed task line");
            continue;
        }
        let Ok(id) = fields[0].parse::<u64>() else {
            tracing::warn!(line = lineno + 1, "skipping task line with bad id");
            continue;
        };
        let size = parse_number(fields[1], lineno + 1)?;
        if size < 0.0 {
            return Err(FaultMeshError::NegativeValue { line: lineno + 1, value: size });
        }
        let Ok(arrive_time) = fields[2].parse::<i64>() else {
            tracing::warn!(line = lineno + 1, "skipping task line with bad arrive time");
            continue;
        };
        tasks.push(Task::new(id, size, arrive_time));
    }
    Ok(tasks)
}

/// Parsed `id capacity groupId` lines from the agent (robot) file.
pub fn load_agents(path: impl AsRef<Path>) -> Result<Vec<Agent>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|_| FaultMeshError::FileNotFound(path.display().to_string()))?;

    let mut agents = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 3 {
            tracing::warn!(line = lineno + 1, "skipping malformed agent line");
            continue;
        }
        let Ok(id) = fields[0].parse::<u64>() else {
            tracing::warn!(line = lineno + 1, "skipping agent line with bad id");
            continue;
        };
        let capacity = parse_number(fields[1], lineno + 1)?;
        if capacity <= 0.0 {
            return Err(FaultMeshError::NegativeValue { line: lineno + 1, value: capacity });
        }
        let Ok(group_id) = fields[2].parse::<GroupId>() else {
            tracing::warn!(line = lineno + 1, "skipping agent line with bad group id");
            continue;
        };
        agents.push(Agent::new(id, capacity, group_id));
    }
    Ok(agents)
}

/// Parsed `u v weight` lines from the graph file. Duplicate edges keep the
/// first weight read; every agent id is added as a node even if isolated, so
/// `DisconnectedAgent` queries resolve to `+inf` rather than panicking.
pub fn load_graph(path: impl AsRef<Path>, agent_ids: &[u64]) -> Result<Graph> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|_| FaultMeshError::FileNotFound(path.display().to_string()))?;

    let mut graph = Graph::new();
    for &id in agent_ids {
        graph.add_node(id);
    }

    for (lineno, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 3 {
            tracing::warn!(line = lineno + 1, "skipping malformed edge line");
            continue;
        }
        let (Ok(u), Ok(v)) = (fields[0].parse::<u64>(), fields[1].parse::<u64>()) else {
            tracing::warn!(line = lineno + 1, "skipping edge line with bad endpoint");
            continue;
        };
        let weight = parse_number(fields[2], lineno + 1)?;
        if weight <= 0.0 {
            return Err(FaultMeshError::NegativeValue { line: lineno + 1, value: weight });
        }
        graph.add_edge(u, v, weight);
    }

    bridge_disconnected_components(&mut graph);
    Ok(graph)
}

/// The spec requires the graph to be connected; if the loaded edges leave it
/// disconnected, add a low-weight bridge between each pair of components.
fn bridge_disconnected_components(graph: &mut Graph) {
    let mut comps = graph.components();
    if comps.len() <= 1 {
        return;
    }
    comps.sort();
    const BRIDGE_WEIGHT: f64 = 1e-6;
    for pair in comps.windows(2) {
        let a = *pair[0].iter().min().expect("component is non-empty");
        let b = *pair[1].iter().min().expect("component is non-empty");
        tracing::warn!(a, b, "graph disconnected, adding bridge edge");
        graph.add_edge(a, b, BRIDGE_WEIGHT);
    }
}

fn parse_number(token: &str, line: usize) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| FaultMeshError::NotANumber { line, token: token.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_well_formed_tasks() {
        let f = write_temp("1 5.0 -1\n2 3.5 10\n\n3 0 -1\n");
        let tasks = load_tasks(f.path()).unwrap();
        assert_eq!(tasks.len(), 3);
        assert!(tasks[0].is_pre_task());
        assert!(!tasks[1].is_pre_task());
    }

    #[test]
    fn skips_malformed_task_lines() {
        let f = write_temp("1 5.0 -1\nbad line here\n2 x 5\n3 4.0 -1\n");
        let tasks = load_tasks(f.path()).unwrap();
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn rejects_negative_task_size() {
        let f = write_temp("1 -5.0 -1\n");
        let err = load_tasks(f.path()).unwrap_err();
        assert!(matches!(err, FaultMeshError::NegativeValue { .. }));
    }

    #[test]
    fn loads_agents() {
        let f = write_temp("0 10.0 0\n1 20.0 1\n");
        let agents = load_agents(f.path()).unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[1].group_id, 1);
    }

    #[test]
    fn rejects_nonpositive_capacity() {
        let f = write_temp("0 0 0\n");
        let err = load_agents(f.path()).unwrap_err();
        assert!(matches!(err, FaultMeshError::NegativeValue { .. }));
    }

    #[test]
    fn loads_graph_with_duplicate_edge_kept_first() {
        let f = write_temp("0 1 2.0\n0 1 99.0\n1 2 3.0\n");
        let graph = load_graph(f.path(), &[0, 1, 2]).unwrap();
        assert_eq!(graph.edge_weight(0, 1), Some(2.0));
    }

    #[test]
    fn bridges_disconnected_components() {
        let f = write_temp("0 1 1.0\n2 3 1.0\n");
        let graph = load_graph(f.path(), &[0, 1, 2, 3]).unwrap();
        assert!(graph.is_connected());
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_tasks("/nonexistent/path/does-not-exist.txt").unwrap_err();
        assert!(matches!(err, FaultMeshError::FileNotFound(_)));
    }
}
