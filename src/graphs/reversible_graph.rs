use super::{vec_vec_graph::VecVecGraph, Distance, Vertex};

/// A graph together with its reverse, kept symmetric under every edge
/// update: for every edge `tail -> head` in the out-graph there is a
/// `head -> tail` edge of the same weight in the in-graph.
#[derive(Clone, Debug)]
pub struct ReversibleGraph {
    out_graph: VecVecGraph,
    in_graph: VecVecGraph,
}

impl ReversibleGraph {
    /// Snapshots `graph` with self-loops removed and builds the reverse.
    pub fn from_graph(graph: &VecVecGraph) -> Self {
        let out_graph = graph.without_self_loops();
        let in_graph = out_graph.reverse();
        ReversibleGraph {
            out_graph,
            in_graph,
        }
    }

    pub fn out_graph(&self) -> &VecVecGraph {
        &self.out_graph
    }

    pub fn in_graph(&self) -> &VecVecGraph {
        &self.in_graph
    }

    /// Lower-or-insert on both directions at once. The two sides must agree
    /// on whether the edge was inserted; anything else is a lost update.
    pub fn update_edge(&mut self, tail: Vertex, head: Vertex, weight: Distance) -> bool {
        let added = self.out_graph.update_edge(tail, head, weight);
        let added_reversed = self.in_graph.update_edge(head, tail, weight);
        assert_eq!(added, added_reversed);
        added
    }
}
