use std::{
    fs::File,
    io::{stdin, BufRead, BufReader, Read},
    path::Path,
};

use ahash::AHashMap;
use anyhow::{bail, ensure, Context, Result};

use super::{Distance, Vertex, WeightedEdge, INFINITY};

/// An edge list whose endpoints carry arbitrary whitespace-free labels,
/// interned to dense vertex indices in insertion order.
#[derive(Debug, Default)]
pub struct LabelEdges {
    pub labels: Vec<String>,
    pub indexes: AHashMap<String, Vertex>,
    pub edges: Vec<WeightedEdge>,
}

impl LabelEdges {
    /// Reads edges from `path`, or from stdin when `path` is `-`. Each data
    /// line is a `src dst length` triple; blank lines and lines starting
    /// with `#` are skipped.
    pub fn from_path(path: &str) -> Result<Self> {
        if path == "-" {
            return Self::from_reader(stdin().lock());
        }
        let file = File::open(path).with_context(|| format!("cannot open graph file {path}"))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("in graph file {path}"))
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut label_edges = LabelEdges::default();
        for (number, line) in reader.lines().enumerate() {
            let line = line.context("read error")?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let edge = label_edges
                .parse_edge(trimmed)
                .with_context(|| format!("line {}: {:?}", number + 1, trimmed))?;
            label_edges.edges.push(edge);
        }
        Ok(label_edges)
    }

    fn parse_edge(&mut self, line: &str) -> Result<WeightedEdge> {
        let mut fields = line.split_whitespace();
        let (Some(src), Some(dst), Some(length)) = (fields.next(), fields.next(), fields.next())
        else {
            bail!("expected `src dst length`");
        };
        ensure!(fields.next().is_none(), "trailing fields after `src dst length`");

        let length: u64 = length
            .parse()
            .with_context(|| format!("length {length:?} is not a non-negative integer"))?;
        ensure!(
            length < INFINITY as u64,
            "length {} is at or above the overflow sentinel {}",
            length,
            INFINITY
        );

        let tail = self.add_label(src);
        let head = self.add_label(dst);
        Ok(WeightedEdge::new(tail, head, length as Distance))
    }

    /// Interns `label` if it is new, and returns its index.
    pub fn add_label(&mut self, label: &str) -> Vertex {
        if let Some(&index) = self.indexes.get(label) {
            return index;
        }
        let index = self.labels.len() as Vertex;
        self.labels.push(label.to_string());
        self.indexes.insert(label.to_string(), index);
        index
    }

    pub fn index(&self, label: &str) -> Option<Vertex> {
        self.indexes.get(label).copied()
    }

    pub fn label(&self, vertex: Vertex) -> &str {
        &self.labels[vertex as usize]
    }

    /// Reads a set of vertices as one label per line. Every label must
    /// already be known from the edge list.
    pub fn vertex_set_from_path(&self, path: impl AsRef<Path>) -> Result<Vec<Vertex>> {
        let path = path.as_ref();
        let mut file =
            File::open(path).with_context(|| format!("cannot open vertex file {}", path.display()))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .with_context(|| format!("cannot read vertex file {}", path.display()))?;
        self.vertex_set_from_str(&contents)
            .with_context(|| format!("in vertex file {}", path.display()))
    }

    pub fn vertex_set_from_str(&self, contents: &str) -> Result<Vec<Vertex>> {
        let mut vertices = Vec::new();
        for label in contents.lines().map(str::trim) {
            if label.is_empty() {
                continue;
            }
            let Some(vertex) = self.index(label) else {
                bail!("label {label:?} does not appear in the graph");
            };
            vertices.push(vertex);
        }
        Ok(vertices)
    }

    pub fn max_weight(&self) -> Distance {
        self.edges.iter().map(|edge| edge.weight).max().unwrap_or(0)
    }
}
