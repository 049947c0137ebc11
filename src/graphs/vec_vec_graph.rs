use super::{Distance, Graph, TaillessEdge, Vertex, WeightedEdge};

/// Growable directed multigraph stored as a dense vector of out-neighbour
/// lists. `add_edge` appends without deduplication; `update_edge` maintains
/// at most one edge per `(tail, head)` pair.
#[derive(Clone, Debug, Default)]
pub struct VecVecGraph {
    edges: Vec<Vec<TaillessEdge>>,
    number_of_edges: u32,
}

impl VecVecGraph {
    pub fn new() -> Self {
        VecVecGraph {
            edges: Vec::new(),
            number_of_edges: 0,
        }
    }

    pub fn from_edges(edges: &[WeightedEdge]) -> Self {
        let mut graph = Self::new();
        for &edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    /// Ensures the graph has a vertex `vertex`. Idempotent.
    pub fn add_vertex(&mut self, vertex: Vertex) {
        if vertex as usize >= self.edges.len() {
            self.edges.resize(vertex as usize + 1, Vec::new());
        }
    }

    /// Appends an edge. Parallel edges are kept as they are.
    pub fn add_edge(&mut self, edge: WeightedEdge) {
        self.add_vertex(edge.tail);
        self.add_vertex(edge.head);
        self.edges[edge.tail as usize].push(edge.remove_tail());
        self.number_of_edges += 1;
    }

    /// Lowers the weight of the edge `tail -> head` to `min(weight, current)`,
    /// or appends the edge if it is not present. Returns whether an append
    /// occurred. The linear scan is fine here: the lists touched during
    /// contraction stay short.
    pub fn update_edge(&mut self, tail: Vertex, head: Vertex, weight: Distance) -> bool {
        for edge in &mut self.edges[tail as usize] {
            if edge.head == head {
                if weight < edge.weight {
                    edge.weight = weight;
                }
                return false;
            }
        }
        self.edges[tail as usize].push(TaillessEdge { head, weight });
        self.number_of_edges += 1;
        true
    }

    pub fn out_degree(&self, vertex: Vertex) -> u32 {
        self.edges[vertex as usize].len() as u32
    }

    /// A new graph with the same vertices and every edge flipped.
    pub fn reverse(&self) -> VecVecGraph {
        let mut reversed = VecVecGraph::new();
        reversed.edges.resize(self.edges.len(), Vec::new());
        for (tail, edges) in self.edges.iter().enumerate() {
            for edge in edges {
                reversed.edges[edge.head as usize].push(TaillessEdge {
                    head: tail as Vertex,
                    weight: edge.weight,
                });
                reversed.number_of_edges += 1;
            }
        }
        reversed
    }

    /// A copy without self-loops. A self-loop can never shorten a path.
    pub fn without_self_loops(&self) -> VecVecGraph {
        let mut copy = VecVecGraph::new();
        copy.edges.resize(self.edges.len(), Vec::new());
        for (tail, edges) in self.edges.iter().enumerate() {
            for edge in edges {
                if edge.head != tail as Vertex {
                    copy.edges[tail].push(*edge);
                    copy.number_of_edges += 1;
                }
            }
        }
        copy
    }

    /// The subgraph over the vertices accepted by `filter`, re-indexed
    /// densely in first-encounter order. Also returns the mapping from new
    /// indices back to the original ones.
    pub fn subgraph(&self, filter: impl Fn(Vertex) -> bool) -> (VecVecGraph, Vec<Vertex>) {
        let invalid = self.edges.len() as Vertex;
        let mut to_original = Vec::new();
        let mut to_new = vec![invalid; self.edges.len()];
        let mut subgraph = VecVecGraph::new();

        let mut reindex = |vertex: Vertex, to_original: &mut Vec<Vertex>| {
            if to_new[vertex as usize] == invalid {
                to_new[vertex as usize] = to_original.len() as Vertex;
                to_original.push(vertex);
            }
            to_new[vertex as usize]
        };

        for tail in 0..self.edges.len() as Vertex {
            if !filter(tail) {
                continue;
            }
            for edge in &self.edges[tail as usize] {
                if filter(edge.head) {
                    let new_tail = reindex(tail, &mut to_original);
                    let new_head = reindex(edge.head, &mut to_original);
                    subgraph.add_edge(WeightedEdge::new(new_tail, new_head, edge.weight));
                }
            }
        }
        (subgraph, to_original)
    }

    pub fn to_edges(&self) -> Vec<WeightedEdge> {
        self.edges
            .iter()
            .enumerate()
            .flat_map(|(tail, edges)| {
                edges.iter().map(move |edge| edge.set_tail(tail as Vertex))
            })
            .collect()
    }
}

impl Graph for VecVecGraph {
    fn number_of_vertices(&self) -> u32 {
        self.edges.len() as u32
    }

    fn number_of_edges(&self) -> u32 {
        self.number_of_edges
    }

    fn out_edges(&self, tail: Vertex) -> impl Iterator<Item = TaillessEdge> + '_ {
        self.edges[tail as usize].iter().copied()
    }
}

/// Two graphs are equal when they have the same vertex count and the same
/// unordered multiset of edges.
impl PartialEq for VecVecGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.edges.len() != other.edges.len() {
            return false;
        }
        let mut edges = self.to_edges();
        let mut other_edges = other.to_edges();
        edges.sort_unstable();
        other_edges.sort_unstable();
        edges == other_edges
    }
}

impl Eq for VecVecGraph {}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> VecVecGraph {
        VecVecGraph::from_edges(&[
            WeightedEdge::new(0, 1, 12),
            WeightedEdge::new(0, 2, 13),
            WeightedEdge::new(1, 2, 14),
        ])
    }

    #[test]
    fn add_edge_keeps_parallel_edges() {
        let mut graph = triangle();
        graph.add_edge(WeightedEdge::new(0, 1, 7));
        assert_eq!(graph.number_of_edges(), 4);
        assert_eq!(graph.out_degree(0), 3);
    }

    #[test]
    fn add_vertex_is_idempotent_and_grows() {
        let mut graph = VecVecGraph::new();
        graph.add_vertex(4);
        graph.add_vertex(2);
        graph.add_vertex(4);
        assert_eq!(graph.number_of_vertices(), 5);
        assert_eq!(graph.number_of_edges(), 0);
    }

    #[test]
    fn update_edge_lowers_or_appends() {
        let mut graph = triangle();
        assert!(!graph.update_edge(0, 1, 20));
        assert_eq!(graph.out_edges(0).next().unwrap().weight, 12);

        assert!(!graph.update_edge(0, 1, 5));
        assert_eq!(graph.out_edges(0).next().unwrap().weight, 5);
        assert_eq!(graph.number_of_edges(), 3);

        assert!(graph.update_edge(2, 0, 1));
        assert_eq!(graph.number_of_edges(), 4);
    }

    #[test]
    fn reverse_is_an_involution() {
        let mut graph = triangle();
        graph.add_edge(WeightedEdge::new(0, 1, 7));
        graph.add_vertex(5);
        assert_eq!(graph.reverse().reverse(), graph);
    }

    #[test]
    fn reverse_flips_edges() {
        let graph = triangle();
        let reversed = graph.reverse();
        assert_eq!(reversed.number_of_vertices(), 3);
        assert_eq!(reversed.number_of_edges(), 3);
        assert_eq!(
            reversed.out_edges(2).collect::<Vec<_>>(),
            vec![
                TaillessEdge { head: 0, weight: 13 },
                TaillessEdge { head: 1, weight: 14 },
            ]
        );
    }

    #[test]
    fn without_self_loops_drops_only_loops() {
        let mut graph = triangle();
        graph.add_edge(WeightedEdge::new(1, 1, 3));
        let clean = graph.without_self_loops();
        assert_eq!(clean.number_of_vertices(), 3);
        assert_eq!(clean.number_of_edges(), 3);
        assert_eq!(clean, triangle());
    }

    #[test]
    fn subgraph_reindexes_in_first_encounter_order() {
        let graph = VecVecGraph::from_edges(&[
            WeightedEdge::new(0, 3, 1),
            WeightedEdge::new(3, 5, 2),
            WeightedEdge::new(5, 0, 3),
            WeightedEdge::new(0, 1, 9),
        ]);
        let (subgraph, to_original) = graph.subgraph(|vertex| vertex != 1);
        assert_eq!(to_original, vec![0, 3, 5]);
        assert_eq!(subgraph.number_of_vertices(), 3);
        assert_eq!(
            subgraph.to_edges(),
            vec![
                WeightedEdge::new(0, 1, 1),
                WeightedEdge::new(1, 2, 2),
                WeightedEdge::new(2, 0, 3),
            ]
        );
    }
}
