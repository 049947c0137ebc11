use std::time::Instant;

use anyhow::{ensure, Result};
use clap::Parser;
use indicatif::ProgressIterator;
use log::info;
use shortcut_paths::graphs::{label_edges::LabelEdges, vec_vec_graph::VecVecGraph, Graph};
use shortcut_paths::search::{ch::contraction::Contraction, traversal::Traversal};
use shortcut_paths::utility::get_progressbar;

/// Times plain Dijkstra sweeps against contraction hierarchy distance
/// queries on a sample grid of vertex pairs, and cross-checks the results.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Graph file with one `src dst length` edge per line, `-` for stdin
    graph: String,
    /// Sample at most this many sources (and targets per source)
    #[arg(short, long, default_value_t = 100)]
    samples: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let label_edges = LabelEdges::from_path(&args.graph)?;
    let mut graph = VecVecGraph::new();
    for &edge in &label_edges.edges {
        graph.add_edge(edge);
    }
    let n = graph.number_of_vertices();
    ensure!(n > 0, "the graph is empty");
    info!("loaded graph with n={} m={}", n, graph.number_of_edges());

    let samples = args.samples.clamp(1, n);
    let stride = (n / samples).max(1);
    let sampled = (0..n).step_by(stride as usize).collect::<Vec<_>>();

    let mut traversal = Traversal::new();
    let start = Instant::now();
    for &source in sampled
        .iter()
        .progress_with(get_progressbar("Dijkstra sweeps", sampled.len() as u64))
    {
        traversal.dijkstra(&graph, source, |_, _| true);
    }
    println!(
        "{} Dijkstra sweeps: {:?} ({:?} per sweep)",
        sampled.len(),
        start.elapsed(),
        start.elapsed() / sampled.len() as u32
    );

    let start = Instant::now();
    let mut contraction = Contraction::new(&graph, &[]);
    contraction.contract(f32::INFINITY);
    println!(
        "contraction of {} vertices: {:?}, hierarchy has {} edges",
        n,
        start.elapsed(),
        contraction.hierarchy().number_of_edges()
    );

    let mut mismatches = 0u64;
    let start = Instant::now();
    for &source in sampled
        .iter()
        .progress_with(get_progressbar("Hierarchy queries", sampled.len() as u64))
    {
        traversal.dijkstra(&graph, source, |_, _| true);
        for &target in &sampled {
            if contraction.distance(source, target) != traversal.distance(target) {
                mismatches += 1;
            }
        }
    }
    println!(
        "{} hierarchy queries: {:?}",
        sampled.len() * sampled.len(),
        start.elapsed()
    );

    ensure!(mismatches == 0, "{mismatches} queries disagreed with Dijkstra");
    println!("all queries agree with Dijkstra");
    Ok(())
}
