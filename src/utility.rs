use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

use crate::graphs::{vec_vec_graph::VecVecGraph, Distance, Graph, Vertex, WeightedEdge};
use crate::search::traversal::Traversal;

pub fn get_progressbar(job_name: &str, len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_message(job_name.to_string());
    bar.set_style(
        ProgressStyle::with_template(
            " {msg} {wide_bar} ({percent_precise}%) estimated remaining: {eta_precise}",
        )
        .unwrap(),
    );
    bar
}

/// A small graph with cycles, a diamond of alternative routes, two
/// self-loops and an isolated component. Eleven vertices.
pub fn small_cyclic_graph() -> VecVecGraph {
    VecVecGraph::from_edges(&[
        WeightedEdge::new(0, 1, 1),
        WeightedEdge::new(1, 2, 1),
        WeightedEdge::new(2, 3, 1),
        WeightedEdge::new(3, 4, 1),
        WeightedEdge::new(0, 4, 10),
        WeightedEdge::new(2, 5, 10),
        WeightedEdge::new(5, 6, 1),
        WeightedEdge::new(6, 3, 1),
        WeightedEdge::new(4, 0, 3),
        WeightedEdge::new(5, 1, 1),
        WeightedEdge::new(3, 3, 2),
        WeightedEdge::new(4, 7, 10),
        WeightedEdge::new(7, 8, 5),
        WeightedEdge::new(8, 9, 2),
        WeightedEdge::new(9, 7, 1),
        WeightedEdge::new(6, 9, 1),
        WeightedEdge::new(10, 10, 1),
    ])
}

/// A reproducible random multigraph. Parallel edges and self-loops are
/// allowed, as in any parsed edge list.
pub fn random_graph(seed: u64, vertices: u32, edges: u32, max_weight: Distance) -> VecVecGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let edges = (0..edges)
        .map(|_| {
            WeightedEdge::new(
                rng.gen_range(0..vertices),
                rng.gen_range(0..vertices),
                rng.gen_range(1..=max_weight),
            )
        })
        .collect_vec();
    let mut graph = VecVecGraph::from_edges(&edges);
    graph.add_vertex(vertices - 1);
    graph
}

/// Reference distances from every vertex, by plain Dijkstra. Each worker
/// thread reuses one traversal state.
pub fn all_pairs_distances(graph: &VecVecGraph) -> Vec<Vec<Distance>> {
    (0..graph.number_of_vertices())
        .into_par_iter()
        .map_init(Traversal::new, |traversal, source| {
            traversal.dijkstra(graph, source, |_, _| true);
            traversal.copy_distances()
        })
        .collect()
}
