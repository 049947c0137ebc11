use std::{cmp::Reverse, collections::BinaryHeap};

use fixedbitset::FixedBitSet;

use crate::graphs::{checked_distance_sum, Distance, Graph, Vertex, INFINITY};

/// Reusable state for Dijkstra-style searches: a distance table, a visited
/// bitmap, the list of touched vertices for sparse resets, and a lazy
/// deletion min-heap. One instance serves one side of a search; reusing it
/// across many short searches on a large graph keeps the per-search cost
/// near the work actually done.
pub struct Traversal {
    pub(crate) distances: Vec<Distance>,
    pub(crate) visited: FixedBitSet,
    pub(crate) touched: Vec<Vertex>,
    pub(crate) queue: BinaryHeap<Reverse<(Distance, Vertex)>>,
    pub(crate) capacity: usize,
}

impl Traversal {
    pub fn new() -> Self {
        Traversal {
            distances: Vec::new(),
            visited: FixedBitSet::new(),
            touched: Vec::new(),
            queue: BinaryHeap::new(),
            capacity: 0,
        }
    }

    /// The distance found by the last search, `INFINITY` if unreached.
    pub fn distance(&self, vertex: Vertex) -> Distance {
        self.distances[vertex as usize]
    }

    /// A snapshot of the distance table for the current graph size.
    pub fn copy_distances(&self) -> Vec<Distance> {
        self.distances[..self.capacity].to_vec()
    }

    /// Prepares the state for a search on a graph of `n` vertices. Resets
    /// only the slots dirtied by the previous search unless so much was
    /// touched that a dense fill is cheaper.
    pub fn init(&mut self, n: usize) {
        let dirty = self.touched.len() + 2 * self.queue.len();
        if dirty > self.capacity / 10 {
            self.distances.fill(INFINITY);
            self.visited.clear();
            self.queue.clear();
        } else {
            for &vertex in &self.touched {
                self.distances[vertex as usize] = INFINITY;
                self.visited.set(vertex as usize, false);
            }
            while let Some(Reverse((_, vertex))) = self.queue.pop() {
                self.distances[vertex as usize] = INFINITY;
                self.visited.set(vertex as usize, false);
            }
        }
        self.touched.clear();

        if n > self.distances.len() {
            self.distances.resize(n, INFINITY);
            self.visited.grow(n);
        }
        self.capacity = n;
    }

    /// Single-source shortest paths from `source`. A vertex is relaxed only
    /// if `filter(vertex, tentative_distance)` accepts it, so on return the
    /// distance table holds shortest paths through accepted vertices only.
    pub fn dijkstra<G: Graph>(
        &mut self,
        graph: &G,
        source: Vertex,
        mut filter: impl FnMut(Vertex, Distance) -> bool,
    ) {
        self.init(graph.number_of_vertices() as usize);
        self.distances[source as usize] = 0;
        self.queue.push(Reverse((0, source)));

        while let Some(Reverse((distance, vertex))) = self.queue.pop() {
            if self.visited.contains(vertex as usize) {
                continue;
            }
            debug_assert_eq!(distance, self.distances[vertex as usize]);
            self.visited.insert(vertex as usize);
            self.touched.push(vertex);

            for edge in graph.out_edges(vertex) {
                let distance_head = checked_distance_sum(distance, edge.weight);
                if filter(edge.head, distance_head)
                    && distance_head < self.distances[edge.head as usize]
                {
                    self.distances[edge.head as usize] = distance_head;
                    self.queue.push(Reverse((distance_head, edge.head)));
                }
            }
        }
    }
}
