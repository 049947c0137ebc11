use std::io::{BufWriter, Write};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use itertools::Itertools;
use log::info;
use shortcut_paths::graphs::{
    label_edges::LabelEdges, vec_vec_graph::VecVecGraph, Graph, INFINITY,
};
use shortcut_paths::search::ch::contraction::Contraction;

#[derive(Debug, Clone, ValueEnum)]
enum OutputMode {
    /// Edges between the surviving vertices, with their labels.
    Preserver,
    /// The contraction order and every edge of the hierarchy, as indices.
    Hierarchy,
}

/// Contracts graph vertices in the contraction hierarchies style: removing
/// a vertex inserts shortcut edges so that distances between the remaining
/// vertices are preserved.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Graph file with one `src dst length` edge per line, `-` for stdin
    graph: String,
    /// File with one label per line; these vertices are never contracted
    keep: String,
    /// Stop once the average degree of the remaining graph reaches this
    max_avg_deg: f32,
    /// What to write to stdout
    #[arg(long, value_enum, default_value = "preserver")]
    mode: OutputMode,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let label_edges = LabelEdges::from_path(&args.graph)?;
    let mut graph = VecVecGraph::new();
    for &edge in &label_edges.edges {
        graph.add_edge(edge);
    }
    info!(
        "loaded graph with n={} m={}",
        graph.number_of_vertices(),
        graph.number_of_edges()
    );
    info!(
        "maximum edge length: {} (overflow at {})",
        label_edges.max_weight(),
        INFINITY
    );

    let keep = label_edges.vertex_set_from_path(&args.keep)?;
    info!(
        "keeping {} vertices, {} contractible",
        keep.len(),
        graph.number_of_vertices() as usize - keep.iter().unique().count()
    );

    let mut contraction = Contraction::new(&graph, &keep);
    contraction.contract(args.max_avg_deg);

    let stdout = std::io::stdout().lock();
    let mut writer = BufWriter::new(stdout);
    match args.mode {
        OutputMode::Preserver => {
            let (subgraph, to_original) = contraction
                .hierarchy()
                .subgraph(|vertex| contraction.is_alive(vertex));
            for tail in 0..subgraph.number_of_vertices() {
                for edge in subgraph.out_edges(tail) {
                    writeln!(
                        writer,
                        "{}\t{}\t{}",
                        label_edges.label(to_original[tail as usize]),
                        label_edges.label(to_original[edge.head as usize]),
                        edge.weight
                    )?;
                }
            }
        }
        OutputMode::Hierarchy => {
            writeln!(
                writer,
                "# contraction_order: {}",
                contraction.contraction_order().iter().join(" ")
            )?;
            let hierarchy = contraction.hierarchy();
            for tail in 0..hierarchy.number_of_vertices() {
                for edge in hierarchy.out_edges(tail) {
                    writeln!(writer, "{}\t{}\t{}", tail, edge.head, edge.weight)?;
                }
            }
        }
    }

    Ok(())
}
