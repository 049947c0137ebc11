use anyhow::Result;
use clap::Parser;
use shortcut_paths::graphs::{label_edges::LabelEdges, vec_vec_graph::VecVecGraph, Graph, INFINITY};

/// Reads a graph and reports a few basic facts about it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Graph file with one `src dst length` edge per line, `-` for stdin
    graph: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let label_edges = LabelEdges::from_path(&args.graph)?;
    let mut graph = VecVecGraph::new();
    for &edge in &label_edges.edges {
        graph.add_edge(edge);
    }

    println!(
        "loaded graph with n={} nodes and m={} edges",
        graph.number_of_vertices(),
        graph.number_of_edges()
    );
    println!(
        "maximum edge length: {} (distance overflow at {})",
        label_edges.max_weight(),
        INFINITY
    );
    let symmetric = graph.reverse() == graph;
    println!("graph is {}symmetric", if symmetric { "" } else { "not " });

    Ok(())
}
