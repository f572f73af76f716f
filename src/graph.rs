//! The weighted undirected agent graph and its shortest-path oracle.
//!
//! Betweenness centrality and distance queries dominate runtime on large
//! instances, so the oracle caches a full single-source Dijkstra run per
//! requested source and never recomputes it within a run.

use ordered_float::OrderedFloat;
use std::cell::RefCell;
use std::collections::{BinaryHeap, HashMap};

use crate::types::AgentId;

/// Undirected, weighted, multigraph-free graph over agent ids.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: HashMap<AgentId, Vec<(AgentId, f64)>>,
}

impl Graph {
    pub fn new() -> Self {
        Self { adjacency: HashMap::new() }
    }

    /// Ensure `id` exists as a vertex, even if it ends up with no edges.
    pub fn add_node(&mut self, id: AgentId) {
        self.adjacency.entry(id).or_default();
    }

    /// Add an undirected edge. Duplicate edges keep the first weight seen.
    pub fn add_edge(&mut self, u: AgentId, v: AgentId, weight: f64) {
        self.add_node(u);
        self.add_node(v);
        if !self.adjacency[&u].iter().any(|&(n, _)| n == v) {
            self.adjacency.get_mut(&u).unwrap().push((v, weight));
            self.adjacency.get_mut(&v).unwrap().push((u, weight));
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn neighbors(&self, id: AgentId) -> impl Iterator<Item = (AgentId, f64)> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|v| v.iter().copied())
    }

    pub fn edge_weight(&self, u: AgentId, v: AgentId) -> Option<f64> {
        self.adjacency
            .get(&u)?
            .iter()
            .find(|&&(n, _)| n == v)
            .map(|&(_, w)| w)
    }

    pub fn degree(&self, id: AgentId) -> usize {
        self.adjacency.get(&id).map_or(0, |v| v.len())
    }

    /// Whether the graph is connected. Used by the loader to decide whether
    /// bridging edges must be synthesized.
    pub fn is_connected(&self) -> bool {
        let Some(&start) = self.adjacency.keys().next() else { return true };
        let reached = bfs_reachable(self, start);
        reached.len() == self.adjacency.len()
    }

    /// Connected components as lists of node ids, for bridge synthesis.
    pub fn components(&self) -> Vec<Vec<AgentId>> {
        let mut seen: std::collections::HashSet<AgentId> = std::collections::HashSet::new();
        let mut comps = Vec::new();
        for &node in self.adjacency.keys() {
            if seen.contains(&node) {
                continue;
            }
            let reached = bfs_reachable(self, node);
            seen.extend(reached.iter().copied());
            comps.push(reached);
        }
        comps
    }
}

fn bfs_reachable(graph: &Graph, start: AgentId) -> Vec<AgentId> {
    let mut visited = std::collections::HashSet::new();
    let mut queue = std::collections::VecDeque::new();
    visited.insert(start);
    queue.push_back(start);
    while let Some(u) = queue.pop_front() {
        for (v, _) in graph.neighbors(u) {
            if visited.insert(v) {
                queue.push_back(v);
            }
        }
    }
    visited.into_iter().collect()
}

/// Dijkstra from any source, with caching per source for the lifetime of a run.
pub struct ShortestPathOracle<'g> {
    graph: &'g Graph,
    cache: RefCell<HashMap<AgentId, HashMap<AgentId, (f64, Option<AgentId>)>>>,
}

impl<'g> ShortestPathOracle<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph, cache: RefCell::new(HashMap::new()) }
    }

    fn ensure_source(&self, source: AgentId) {
        if self.cache.borrow().contains_key(&source) {
            return;
        }
        let table = dijkstra(self.graph, source);
        self.cache.borrow_mut().insert(source, table);
    }

    /// Shortest-path weight from `u` to `v`, or `+inf` if unreachable.
    pub fn weight(&self, u: AgentId, v: AgentId) -> f64 {
        if u == v {
            return 0.0;
        }
        self.ensure_source(u);
        self.cache
            .borrow()
            .get(&u)
            .and_then(|t| t.get(&v))
            .map(|&(w, _)| w)
            .unwrap_or(f64::INFINITY)
    }

    /// Shortest path from `u` to `v` as a sequence of node ids, inclusive of
    /// both endpoints. Empty if unreachable.
    pub fn path(&self, u: AgentId, v: AgentId) -> Vec<AgentId> {
        if u == v {
            return vec![u];
        }
        self.ensure_source(u);
        let cache = self.cache.borrow();
        let Some(table) = cache.get(&u) else { return Vec::new() };
        if !table.contains_key(&v) {
            return Vec::new();
        }
        let mut path = vec![v];
        let mut cur = v;
        while cur != u {
            match table.get(&cur).and_then(|&(_, prev)| prev) {
                Some(prev) => {
                    path.push(prev);
                    cur = prev;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// Plain single-source Dijkstra, returning `node -> (distance, predecessor)`.
/// `source` itself is not present as a key (distance 0 by convention, no predecessor).
fn dijkstra(graph: &Graph, source: AgentId) -> HashMap<AgentId, (f64, Option<AgentId>)> {
    let mut dist: HashMap<AgentId, (f64, Option<AgentId>)> = HashMap::new();
    let mut heap: BinaryHeap<std::cmp::Reverse<(OrderedFloat<f64>, AgentId)>> = BinaryHeap::new();
    let mut best: HashMap<AgentId, f64> = HashMap::new();

    best.insert(source, 0.0);
    heap.push(std::cmp::Reverse((OrderedFloat(0.0), source)));

    while let Some(std::cmp::Reverse((OrderedFloat(d), u))) = heap.pop() {
        if best.get(&u).is_some_and(|&b| d > b) {
            continue;
        }
        for (v, w) in graph.neighbors(u) {
            let nd = d + w;
            if best.get(&v).is_none_or(|&b| nd < b) {
                best.insert(v, nd);
                dist.insert(v, (nd, Some(u)));
                heap.push(std::cmp::Reverse((OrderedFloat(nd), v)));
            }
        }
    }

    dist
}
