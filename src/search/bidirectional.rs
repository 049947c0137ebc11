use std::cmp::Reverse;

use crate::graphs::{checked_distance_sum, Distance, Graph, Vertex, INFINITY};

use super::traversal::Traversal;

/// Meet-in-the-middle distance query from `source` to `target`, assuming
/// `bwd` is the reverse of `fwd`.
///
/// Only vertices accepted by `filter(vertex, distance, parent)` are
/// expanded. The search is bounded by `limit`: when the true distance is
/// below it, that distance is returned; otherwise the returned value is only
/// guaranteed to be at least `limit`.
///
/// With the default alternation the two frontiers expand in distance order
/// and the search stops once the frontier radii meet the best distance seen.
/// A filter that skips vertices out of distance order (as the hierarchy
/// query filter does) breaks that argument; `pruned` disables the
/// radius-based stop and leaves termination to the meet bound and the
/// filter.
///
/// Taking the two traversal states as distinct `&mut` rules out running
/// both sides on the same state.
pub fn bidirectional_dijkstra<G: Graph>(
    fwd: &G,
    bwd: &G,
    fwd_traversal: &mut Traversal,
    bwd_traversal: &mut Traversal,
    source: Vertex,
    target: Vertex,
    limit: Distance,
    pruned: bool,
    filter: impl Fn(Vertex, Distance, Vertex) -> bool,
) -> Distance {
    assert_eq!(fwd.number_of_vertices(), bwd.number_of_vertices());
    assert_eq!(fwd.number_of_edges(), bwd.number_of_edges());

    let n = fwd.number_of_vertices() as usize;
    fwd_traversal.init(n);
    bwd_traversal.init(n);

    fwd_traversal.distances[source as usize] = 0;
    fwd_traversal.queue.push(Reverse((0, source)));
    bwd_traversal.distances[target as usize] = 0;
    bwd_traversal.queue.push(Reverse((0, target)));

    let mut best = INFINITY;
    let (mut fwd_radius, mut bwd_radius) = (0, 0);

    while !(fwd_traversal.queue.is_empty() && bwd_traversal.queue.is_empty()) {
        fwd_radius = step(
            fwd,
            fwd_traversal,
            bwd_traversal,
            target,
            if pruned { 0 } else { bwd_radius },
            limit,
            &mut best,
            &filter,
        );
        if !pruned && fwd_radius == INFINITY && bwd_traversal.queue.is_empty() {
            break;
        }
        bwd_radius = step(
            bwd,
            bwd_traversal,
            fwd_traversal,
            source,
            if pruned { 0 } else { fwd_radius },
            limit,
            &mut best,
            &filter,
        );
        if !pruned && fwd_radius as u64 + bwd_radius as u64 >= best as u64 {
            break;
        }
    }

    best
}

/// Settles one vertex on one side. Returns the new search radius on that
/// side: the distance of the settled vertex, or `INFINITY` when its heap is
/// exhausted.
#[allow(clippy::too_many_arguments)]
fn step<G: Graph>(
    graph: &G,
    traversal: &mut Traversal,
    other: &Traversal,
    other_origin: Vertex,
    other_radius: Distance,
    limit: Distance,
    best: &mut Distance,
    filter: &impl Fn(Vertex, Distance, Vertex) -> bool,
) -> Distance {
    let (vertex, distance) = loop {
        let Some(Reverse((distance, vertex))) = traversal.queue.pop() else {
            return INFINITY;
        };
        if !traversal.visited.contains(vertex as usize) {
            break (vertex, distance);
        }
    };
    debug_assert_eq!(distance, traversal.distances[vertex as usize]);
    traversal.visited.insert(vertex as usize);
    traversal.touched.push(vertex);

    if vertex == other_origin {
        *best = distance;
        return distance;
    }
    if distance as u64 + other_radius as u64 >= *best as u64 {
        // This side can no longer improve on the meeting point.
        return distance;
    }

    for edge in graph.out_edges(vertex) {
        let distance_head = checked_distance_sum(distance, edge.weight);

        // Do we meet the other frontier here?
        let other_distance = other.distances[edge.head as usize];
        if other_distance < INFINITY {
            let through_head = distance_head as u64 + other_distance as u64;
            if through_head < *best as u64 {
                *best = through_head as Distance;
            }
        }

        if filter(edge.head, distance_head, vertex)
            && distance_head < traversal.distances[edge.head as usize]
            && distance_head as u64 + (other_radius as u64) < limit.min(*best) as u64
        {
            traversal.distances[edge.head as usize] = distance_head;
            traversal.queue.push(Reverse((distance_head, edge.head)));
        }
    }

    distance
}
