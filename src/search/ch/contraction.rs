use ahash::AHashSet;
use fixedbitset::FixedBitSet;
use itertools::Itertools;
use log::info;

use crate::graphs::{
    checked_distance_sum, reversible_graph::ReversibleGraph, vec_vec_graph::VecVecGraph, Distance,
    Graph, TaillessEdge, Vertex, INFINITY,
};
use crate::search::{bidirectional::bidirectional_dijkstra, traversal::Traversal};

/// Contraction hierarchies preprocessor and distance oracle.
///
/// Contracting a vertex deactivates it and inserts shortcut edges between
/// its remaining neighbours wherever no witness path of at most the
/// shortcut weight survives, so distances between the remaining vertices
/// never change. Vertices are contracted in batches of pairwise
/// non-adjacent vertices, cheapest fill first. After contraction the
/// forward/backward pair doubles as the query hierarchy.
pub struct Contraction {
    graph: ReversibleGraph,
    fwd_traversal: Traversal,
    bwd_traversal: Traversal,
    /// Alive vertices that may still be contracted.
    contractible: FixedBitSet,
    alive: FixedBitSet,
    /// Contraction rank per vertex; the vertex count means "not contracted".
    rank: Vec<u32>,
    order: Vec<Vertex>,
    in_degrees: Vec<u32>,
    out_degrees: Vec<u32>,
    alive_vertices: u32,
    alive_edges: u64,
}

impl Contraction {
    /// Prepares to contract a snapshot of `graph`. Vertices in `keep` are
    /// never contracted but still participate in witness searches and as
    /// shortcut endpoints. The input graph itself is left untouched.
    pub fn new(graph: &VecVecGraph, keep: &[Vertex]) -> Self {
        let graph = ReversibleGraph::from_graph(graph);
        let n = graph.out_graph().number_of_vertices();

        let out_degrees = (0..n).map(|u| graph.out_graph().out_degree(u)).collect_vec();
        let in_degrees = (0..n).map(|u| graph.in_graph().out_degree(u)).collect_vec();

        let mut contractible = FixedBitSet::with_capacity(n as usize);
        contractible.insert_range(..);
        for &vertex in keep {
            contractible.set(vertex as usize, false);
        }
        let mut alive = FixedBitSet::with_capacity(n as usize);
        alive.insert_range(..);

        let alive_edges = graph.out_graph().number_of_edges() as u64;
        Contraction {
            graph,
            fwd_traversal: Traversal::new(),
            bwd_traversal: Traversal::new(),
            contractible,
            alive,
            rank: vec![n; n as usize],
            order: Vec::new(),
            in_degrees,
            out_degrees,
            alive_vertices: n,
            alive_edges,
        }
    }

    /// Contracts batches of vertices until the average out-degree of the
    /// remaining graph reaches `max_avg_deg` or nothing contractible is
    /// left. Pass `f32::INFINITY` to contract everything.
    pub fn contract(&mut self, max_avg_deg: f32) {
        let mut round: u64 = 0;
        let mut last_logged: u64 = 0;
        loop {
            if self.alive_edges as f32 >= max_avg_deg * self.alive_vertices as f32
                || self.contractible.count_ones(..) == 0
            {
                break;
            }
            let contracted = self.contract_round();
            round += 1;
            if 2 * round >= 3 * last_logged {
                last_logged = round;
                info!(
                    "round {}: n={} m={} contracted={} avg_out_deg={:.2} hierarchy m={}",
                    round,
                    self.alive_vertices,
                    self.alive_edges,
                    contracted,
                    self.alive_edges as f64 / self.alive_vertices.max(1) as f64,
                    self.graph.out_graph().number_of_edges(),
                );
            }
        }
        info!(
            "contracted graph: n={} m={}; hierarchy: n={} m={}",
            self.alive_vertices,
            self.alive_edges,
            self.graph.out_graph().number_of_vertices(),
            self.graph.out_graph().number_of_edges(),
        );
    }

    /// The distance from `source` to `target` over the hierarchy. Exact
    /// once contraction is done: every shortest path has an equivalent that
    /// first climbs in rank and then descends, and the filter admits
    /// exactly the climbing edges of either side.
    pub fn distance(&mut self, source: Vertex, target: Vertex) -> Distance {
        let rank = &self.rank;
        bidirectional_dijkstra(
            self.graph.out_graph(),
            self.graph.in_graph(),
            &mut self.fwd_traversal,
            &mut self.bwd_traversal,
            source,
            target,
            INFINITY,
            true,
            |vertex, _, parent| rank[parent as usize] < rank[vertex as usize],
        )
    }

    pub fn is_alive(&self, vertex: Vertex) -> bool {
        self.alive.contains(vertex as usize)
    }

    /// Vertices in the order they were contracted.
    pub fn contraction_order(&self) -> &[Vertex] {
        &self.order
    }

    /// The forward graph: original edges (minus self-loops) plus all
    /// shortcuts inserted so far.
    pub fn hierarchy(&self) -> &VecVecGraph {
        self.graph.out_graph()
    }

    pub fn alive_vertices(&self) -> u32 {
        self.alive_vertices
    }

    pub fn alive_edges(&self) -> u64 {
        self.alive_edges
    }

    /// Estimate of the number of shortcuts contracting `vertex` would
    /// insert, tiered so that vertices whose contraction cannot add edges
    /// sort strictly below any fill-producing vertex.
    fn fill_priority(&self, vertex: Vertex) -> u64 {
        let a = self.in_degrees[vertex as usize].min(self.out_degrees[vertex as usize]) as u64;
        let b = self.in_degrees[vertex as usize].max(self.out_degrees[vertex as usize]) as u64;
        if a == 0 {
            0
        } else if a == 1 {
            b.min(255)
        } else {
            // (a - 1)(b - 1) potential shortcuts; the low byte stays free
            // for the first two tiers.
            (a * b - a - b + 1) << 8
        }
    }

    /// Selects a batch of pairwise non-adjacent contractible vertices,
    /// cheapest fill first, and contracts them. Returns how many.
    fn contract_round(&mut self) -> usize {
        let mut candidates = self
            .contractible
            .ones()
            .map(|vertex| (self.fill_priority(vertex as Vertex), vertex as Vertex))
            .collect_vec();
        candidates.sort_unstable();
        let total = candidates.len();

        let mut selected = Vec::new();
        let mut blocked: AHashSet<Vertex> = AHashSet::new();
        let mut threshold = 0;
        for (priority, vertex) in candidates {
            if selected.len() * 100 < total {
                threshold = priority;
            } else if 4 * priority > 5 * threshold {
                // The remaining candidates would produce disproportionate
                // fill; leave them for a later round.
                break;
            }
            if !blocked.contains(&vertex) {
                for edge in self.graph.in_graph().out_edges(vertex) {
                    blocked.insert(edge.head);
                }
                for edge in self.graph.out_graph().out_edges(vertex) {
                    blocked.insert(edge.head);
                }
                selected.push(vertex);
            }
        }

        for &vertex in &selected {
            self.contract_vertex(vertex);
        }
        selected.len()
    }

    fn contract_vertex(&mut self, vertex: Vertex) {
        self.alive.set(vertex as usize, false);
        self.rank[vertex as usize] = self.order.len() as u32;
        self.order.push(vertex);
        self.contractible.set(vertex as usize, false);
        self.alive_vertices -= 1;
        self.alive_edges -=
            (self.in_degrees[vertex as usize] + self.out_degrees[vertex as usize]) as u64;

        let predecessors: Vec<TaillessEdge> = self
            .graph
            .in_graph()
            .out_edges(vertex)
            .filter(|edge| self.alive.contains(edge.head as usize))
            .collect();
        let successors: Vec<TaillessEdge> = self
            .graph
            .out_graph()
            .out_edges(vertex)
            .filter(|edge| self.alive.contains(edge.head as usize))
            .collect();

        // The edges into and out of `vertex` die with it.
        for edge in &predecessors {
            self.out_degrees[edge.head as usize] -= 1;
        }
        for edge in &successors {
            self.in_degrees[edge.head as usize] -= 1;
        }

        for predecessor in &predecessors {
            for successor in &successors {
                if predecessor.head == successor.head {
                    continue;
                }
                let shortcut = checked_distance_sum(predecessor.weight, successor.weight);

                // Is there a path of the remaining vertices that makes the
                // shortcut redundant?
                let alive = &self.alive;
                let witness = bidirectional_dijkstra(
                    self.graph.out_graph(),
                    self.graph.in_graph(),
                    &mut self.fwd_traversal,
                    &mut self.bwd_traversal,
                    predecessor.head,
                    successor.head,
                    shortcut,
                    true,
                    |head, _, _| alive.contains(head as usize),
                );
                if witness >= shortcut {
                    let added =
                        self.graph
                            .update_edge(predecessor.head, successor.head, shortcut);
                    if added {
                        self.alive_edges += 1;
                        self.out_degrees[predecessor.head as usize] += 1;
                        self.in_degrees[successor.head as usize] += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::WeightedEdge;
    use crate::utility::{random_graph, small_cyclic_graph};

    fn all_distances(graph: &VecVecGraph, source: Vertex) -> Vec<Distance> {
        let mut traversal = Traversal::new();
        traversal.dijkstra(graph, source, |_, _| true);
        traversal.copy_distances()
    }

    /// Degree, rank and count bookkeeping that must hold between rounds.
    fn check_bookkeeping(contraction: &Contraction) {
        let n = contraction.graph.out_graph().number_of_vertices();
        assert_eq!(
            contraction.order.len() as u32 + contraction.alive_vertices,
            n
        );

        let mut ranks = contraction
            .order
            .iter()
            .map(|&vertex| contraction.rank[vertex as usize])
            .collect_vec();
        ranks.sort_unstable();
        assert_eq!(ranks, (0..contraction.order.len() as u32).collect_vec());

        for vertex in 0..n {
            assert_eq!(
                contraction.rank[vertex as usize] < n,
                !contraction.is_alive(vertex)
            );
        }

        let mut alive_edges = 0;
        for vertex in 0..n {
            if !contraction.is_alive(vertex) {
                continue;
            }
            let out_alive = contraction
                .graph
                .out_graph()
                .out_edges(vertex)
                .filter(|edge| contraction.is_alive(edge.head))
                .count() as u32;
            let in_alive = contraction
                .graph
                .in_graph()
                .out_edges(vertex)
                .filter(|edge| contraction.is_alive(edge.head))
                .count() as u32;
            assert_eq!(contraction.out_degrees[vertex as usize], out_alive);
            assert_eq!(contraction.in_degrees[vertex as usize], in_alive);
            alive_edges += out_alive as u64;
        }
        assert_eq!(contraction.alive_edges, alive_edges);

        assert_eq!(
            contraction.graph.in_graph(),
            &contraction.graph.out_graph().reverse()
        );
    }

    #[test]
    fn chain_with_kept_endpoints_gets_the_long_shortcut() {
        let chain = VecVecGraph::from_edges(&[
            WeightedEdge::new(0, 1, 1),
            WeightedEdge::new(1, 2, 1),
            WeightedEdge::new(2, 3, 1),
            WeightedEdge::new(3, 4, 1),
        ]);
        let mut contraction = Contraction::new(&chain, &[0, 4]);
        contraction.contract(f32::INFINITY);

        assert!(contraction.is_alive(0));
        assert!(contraction.is_alive(4));
        assert_eq!(contraction.alive_vertices(), 2);
        assert_eq!(contraction.alive_edges(), 1);
        assert!(contraction
            .hierarchy()
            .out_edges(0)
            .contains(&TaillessEdge { head: 4, weight: 4 }));
        assert_eq!(contraction.distance(0, 4), 4);
        check_bookkeeping(&contraction);
    }

    #[test]
    fn shortcut_lowers_an_existing_heavier_edge() {
        let graph = VecVecGraph::from_edges(&[
            WeightedEdge::new(0, 1, 1),
            WeightedEdge::new(1, 2, 1),
            WeightedEdge::new(0, 2, 5),
        ]);
        let mut contraction = Contraction::new(&graph, &[0, 2]);
        contraction.contract(f32::INFINITY);

        assert!(!contraction.is_alive(1));
        assert!(contraction
            .hierarchy()
            .out_edges(0)
            .contains(&TaillessEdge { head: 2, weight: 2 }));
        // Lowered in place, not duplicated.
        assert_eq!(contraction.hierarchy().out_degree(0), 2);
        check_bookkeeping(&contraction);
    }

    #[test]
    fn witness_path_suppresses_the_shortcut() {
        let graph = VecVecGraph::from_edges(&[
            WeightedEdge::new(0, 1, 5),
            WeightedEdge::new(1, 2, 5),
            WeightedEdge::new(0, 2, 3),
        ]);
        let mut contraction = Contraction::new(&graph, &[0, 2]);
        contraction.contract(f32::INFINITY);

        assert!(!contraction.is_alive(1));
        assert!(contraction
            .hierarchy()
            .out_edges(0)
            .contains(&TaillessEdge { head: 2, weight: 3 }));
        assert_eq!(contraction.hierarchy().number_of_edges(), 3);
        assert_eq!(contraction.distance(0, 2), 3);
        check_bookkeeping(&contraction);
    }

    #[test]
    fn vertices_whose_contraction_sheds_edges_go_first() {
        let mut contraction = Contraction::new(&small_cyclic_graph(), &[]);
        // 10 only has a self-loop, so its degrees are zero after the loop
        // is dropped.
        assert_eq!(contraction.fill_priority(10), 0);
        // 8 has one in (7) and one out (9) neighbour.
        assert_eq!(contraction.fill_priority(8), 1);

        contraction.in_degrees[3] = 4;
        contraction.out_degrees[3] = 3;
        assert_eq!(contraction.fill_priority(3), 6 << 8);
    }

    #[test]
    fn full_contraction_keeps_all_distances() {
        let graph = small_cyclic_graph();
        let mut contraction = Contraction::new(&graph, &[]);
        contraction.contract(f32::INFINITY);

        assert_eq!(contraction.alive_vertices(), 0);
        assert_eq!(contraction.contraction_order().len(), 11);
        check_bookkeeping(&contraction);

        for source in 0..graph.number_of_vertices() {
            let expected = all_distances(&graph, source);
            for target in 0..graph.number_of_vertices() {
                assert_eq!(
                    contraction.distance(source, target),
                    expected[target as usize],
                    "{} -> {}",
                    source,
                    target
                );
            }
        }
    }

    #[test]
    fn partial_contraction_preserves_alive_distances() {
        for seed in 0..4 {
            let graph = random_graph(seed, 40, 120, 100);
            let mut contraction = Contraction::new(&graph, &[]);
            contraction.contract(4.0);
            check_bookkeeping(&contraction);

            let mut traversal = Traversal::new();
            for source in 0..graph.number_of_vertices() {
                if !contraction.is_alive(source) {
                    continue;
                }
                let expected = all_distances(&graph, source);
                traversal.dijkstra(contraction.hierarchy(), source, |vertex, _| {
                    contraction.is_alive(vertex)
                });
                for target in 0..graph.number_of_vertices() {
                    if contraction.is_alive(target) {
                        assert_eq!(
                            traversal.distance(target),
                            expected[target as usize],
                            "seed {}: {} -> {}",
                            seed,
                            source,
                            target
                        );
                    }
                }
            }
        }
    }
}
