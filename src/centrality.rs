//! Betweenness centrality restricted to a group's induced subgraph.
//!
//! Brandes' algorithm (unweighted BFS variant), adapted from the same shape
//! used for edge betweenness in community-detection code: accumulate
//! shortest-path counts on the forward BFS pass, then back-propagate
//! dependencies on the reverse pass.

use std::collections::{HashMap, VecDeque};

use crate::graph::Graph;
use crate::types::AgentId;

/// Node betweenness centrality for every member of `members`, considering
/// only edges whose both endpoints are in `members` (the group's induced
/// subgraph).
pub fn group_betweenness(graph: &Graph, members: &[AgentId]) -> HashMap<AgentId, f64> {
    let member_set: std::collections::HashSet<AgentId> = members.iter().copied().collect();
    let neighbors_in_group = |u: AgentId| -> Vec<AgentId> {
        graph
            .neighbors(u)
            .filter(|(v, _)| member_set.contains(v))
            .map(|(v, _)| v)
            .collect()
    };

    let mut centrality: HashMap<AgentId, f64> = members.iter().map(|&m| (m, 0.0)).collect();

    for &s in members {
        let mut stack = Vec::new();
        let mut preds: HashMap<AgentId, Vec<AgentId>> = members.iter().map(|&m| (m, Vec::new())).collect();
        let mut sigma: HashMap<AgentId, f64> = members.iter().map(|&m| (m, 0.0)).collect();
        let mut dist: HashMap<AgentId, i64> = members.iter().map(|&m| (m, -1)).collect();

        sigma.insert(s, 1.0);
        dist.insert(s, 0);

        let mut queue = VecDeque::new();
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for w in neighbors_in_group(v) {
                if dist[&w] < 0 {
                    dist.insert(w, dist[&v] + 1);
                    queue.push_back(w);
                }
                if dist[&w] == dist[&v] + 1 {
                    *sigma.get_mut(&w).unwrap() += sigma[&v];
                    preds.get_mut(&w).unwrap().push(v);
                }
            }
        }

        let mut delta: HashMap<AgentId, f64> = members.iter().map(|&m| (m, 0.0)).collect();
        while let Some(w) = stack.pop() {
            for &v in &preds[&w] {
                let contrib = (sigma[&v] / sigma[&w]) * (1.0 + delta[&w]);
                *delta.get_mut(&v).unwrap() += contrib;
            }
            if w != s {
                *centrality.get_mut(&w).unwrap() += delta[&w];
            }
        }
    }

    centrality
}
