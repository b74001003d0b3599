//! Node, edge, and multiplexer statistics of a finished graph.

use crate::node::NodeKind;
use crate::store::NodeStore;
use loom_diagnostics::{Category, Diagnostic, DiagnosticCode, Location};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Graph statistics summary.
pub const N_GRAPH_STATS: DiagnosticCode = DiagnosticCode::new(Category::Note, 402);

/// Size distribution of one family of routing multiplexers.
#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct MuxStats {
    /// Number of multiplexers.
    pub count: usize,
    /// Smallest input count.
    pub min: u32,
    /// Largest input count.
    pub max: u32,
    /// Mean input count.
    pub avg: f64,
}

impl MuxStats {
    fn collect(sizes: impl Iterator<Item = u32>) -> Self {
        let mut stats = MuxStats::default();
        let mut sum = 0u64;
        for size in sizes {
            stats.min = if stats.count == 0 { size } else { stats.min.min(size) };
            stats.max = stats.max.max(size);
            stats.count += 1;
            sum += u64::from(size);
        }
        if stats.count > 0 {
            stats.avg = sum as f64 / stats.count as f64;
        }
        stats
    }
}

/// Node and edge counts per kind plus multiplexer size distributions.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct RrgStats {
    /// Node count per kind, indexed by [`NodeKind::index`].
    pub nodes: [usize; 7],
    /// Outgoing edge count per source kind, indexed by [`NodeKind::index`].
    pub edges: [usize; 7],
    /// Switch-block multiplexers: driven channel wires.
    pub sb_mux: MuxStats,
    /// Connection-block multiplexers: driven input pins.
    pub cb_mux: MuxStats,
}

impl RrgStats {
    /// Gathers statistics over every node in `store`.
    pub fn collect(store: &NodeStore) -> Self {
        let mut stats = RrgStats::default();
        for (_, node) in store.iter() {
            stats.nodes[node.kind.index()] += 1;
            stats.edges[node.kind.index()] += node.fan_out();
        }
        let driven = |pred: fn(NodeKind) -> bool| {
            store
                .iter()
                .filter(move |(_, n)| pred(n.kind) && n.fan_in() > 0)
                .map(|(_, n)| n.fan_in())
        };
        stats.sb_mux = MuxStats::collect(driven(NodeKind::is_channel));
        stats.cb_mux = MuxStats::collect(driven(|k| k == NodeKind::Ipin));
        stats
    }

    /// Total node count.
    pub fn total_nodes(&self) -> usize {
        self.nodes.iter().sum()
    }

    /// Total edge count.
    pub fn total_edges(&self) -> usize {
        self.edges.iter().sum()
    }

    /// The N402 note carrying this table.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::note(
            N_GRAPH_STATS,
            format!(
                "routing graph has {} nodes and {} edges",
                self.total_nodes(),
                self.total_edges()
            ),
            Location::DEVICE,
        )
        .with_note(self.to_string())
    }
}

impl fmt::Display for RrgStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(14 + 11 * (NodeKind::ALL.len() + 1));
        writeln!(f, "{rule}")?;
        write!(f, "{:<14}", "type")?;
        for kind in NodeKind::ALL {
            let name = kind.to_string();
            write!(f, "{:>11}", name.get(..10).unwrap_or(name.as_str()))?;
        }
        writeln!(f, "{:>11}", "total")?;
        write!(f, "{:<14}", "nodes")?;
        for n in self.nodes {
            write!(f, "{n:>11}")?;
        }
        writeln!(f, "{:>11}", self.total_nodes())?;
        write!(f, "{:<14}", "edges")?;
        for n in self.edges {
            write!(f, "{n:>11}")?;
        }
        writeln!(f, "{:>11}", self.total_edges())?;
        writeln!(f, "{rule}")?;
        for (name, mux) in [("sb", &self.sb_mux), ("cb", &self.cb_mux)] {
            writeln!(
                f,
                "{name} muxes: {} (size min {}, max {}, avg {:.2})",
                mux.count, mux.min, mux.max, mux.avg
            )?;
        }
        Ok(())
    }
}
