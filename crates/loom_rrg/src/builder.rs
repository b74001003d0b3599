//! Top-level construction of a device routing graph.

use crate::chan::{ChanType, ChannelNodes, TrackPlan};
use crate::connect::connect;
use crate::device::DeviceRrg;
use crate::error::RrgError;
use crate::graph::{allocate_tile_nodes, RoutingGraph};
use crate::grid::DeviceGrid;
use crate::store::NodeStore;
use loom_arch::Architecture;
use loom_config::BuildOptions;
use loom_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Label, Location};

/// An I/O tile placed inside the core.
pub const E_INTERIOR_IO: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);
/// A core dimension of zero.
pub const E_DEVICE_TOO_SMALL: DiagnosticCode = DiagnosticCode::new(Category::Error, 102);
/// The architecture failed validation.
pub const E_MALFORMED_ARCH: DiagnosticCode = DiagnosticCode::new(Category::Error, 103);
/// A placement overlaps a taller block.
pub const E_OVERLAPPING_BLOCKS: DiagnosticCode = DiagnosticCode::new(Category::Error, 104);
/// An instance matched two representatives.
pub const E_CANON_CONFLICT: DiagnosticCode = DiagnosticCode::new(Category::Error, 201);
/// Edge insertions that were already present.
pub const W_DUPLICATE_EDGES: DiagnosticCode = DiagnosticCode::new(Category::Warning, 301);

/// Builds the routing graph of one device and classifies its blocks.
///
/// The builder owns the node store while nodes are allocated and edges are
/// added. If construction fails part way, [`RrgBuilder::store`] shows what
/// was allocated before the failure; input errors found before allocation
/// leave it empty.
pub struct RrgBuilder<'a> {
    arch: &'a Architecture,
    options: BuildOptions,
    store: NodeStore,
}

impl<'a> RrgBuilder<'a> {
    /// Creates a builder for `arch`.
    pub fn new(arch: &'a Architecture, options: BuildOptions) -> Self {
        Self {
            arch,
            options,
            store: NodeStore::new(),
        }
    }

    /// Nodes left behind by a failed build.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Runs every construction pass. Input errors and canonicalization
    /// conflicts are also reported to `sink` with their locations.
    pub fn build(&mut self, sink: &DiagnosticSink) -> Result<DeviceRrg, RrgError> {
        let result = self.build_inner(sink);
        if let Err(err) = &result {
            if let Some(diag) = self.error_diagnostic(err) {
                sink.emit(diag);
            }
        }
        result
    }

    fn build_inner(&mut self, sink: &DiagnosticSink) -> Result<DeviceRrg, RrgError> {
        self.store = NodeStore::new();
        self.arch.validate()?;
        let grid = DeviceGrid::expand(self.arch)?;
        let plan = TrackPlan::new(self.arch);

        let tiles = allocate_tile_nodes(&mut self.store, self.arch, &grid)?;
        let chanx = ChannelNodes::allocate(&mut self.store, self.arch, &grid, &plan, ChanType::ChanX)?;
        let chany = ChannelNodes::allocate(&mut self.store, self.arch, &grid, &plan, ChanType::ChanY)?;

        let mut graph = RoutingGraph {
            arch: self.arch.clone(),
            grid,
            plan,
            store: std::mem::take(&mut self.store),
            tiles,
            chanx,
            chany,
        };
        if let Err(err) = connect(&mut graph, sink) {
            self.store = graph.store;
            return Err(err);
        }

        let duplicates = graph.store.duplicate_attempts();
        if duplicates > 0 {
            sink.emit(
                Diagnostic::warning(
                    W_DUPLICATE_EDGES,
                    format!("{duplicates} edge insertions were already present"),
                    Location::named(self.arch.name.clone()),
                )
                .with_note("duplicates are dropped; the graph keeps one edge per target"),
            );
        }

        DeviceRrg::assemble(graph, &self.options, sink)
    }

    fn error_diagnostic(&self, err: &RrgError) -> Option<Diagnostic> {
        let diag = match err {
            RrgError::UnsupportedInteriorIO { tile, coord } => Diagnostic::error(
                E_INTERIOR_IO,
                err.to_string(),
                Location::at(*coord, tile.clone()),
            )
            .with_help("I/O tiles may only be placed on the perimeter ring"),
            RrgError::OverlappingBlocks {
                tile,
                root,
                existing_root,
            } => Diagnostic::error(
                E_OVERLAPPING_BLOCKS,
                err.to_string(),
                Location::at(*root, tile.clone()),
            )
            .with_label(Label::secondary(
                Location::at(*existing_root, "tile"),
                "taller block rooted here",
            )),
            RrgError::CanonicalizationConflict {
                structure,
                coord,
                first,
                second,
            } => Diagnostic::error(E_CANON_CONFLICT, err.to_string(), Location::at(*coord, *structure))
                .with_label(Label::secondary(Location::at(*first, *structure), "first representative"))
                .with_label(Label::secondary(Location::at(*second, *structure), "second representative"))
                .with_note("representatives of one structure must be pairwise distinct"),
            RrgError::DeviceTooSmall { .. } => {
                Diagnostic::error(E_DEVICE_TOO_SMALL, err.to_string(), Location::DEVICE)
                    .with_help("set device.nx and device.ny to at least 1")
            }
            RrgError::MalformedArchitecture(inner) => Diagnostic::error(
                E_MALFORMED_ARCH,
                inner.to_string(),
                Location::named(self.arch.name.clone()),
            ),
            _ => return None,
        };
        Some(diag)
    }
}

/// Builds the routing graph of the device described by `arch`.
pub fn build_device(
    arch: &Architecture,
    options: &BuildOptions,
    sink: &DiagnosticSink,
) -> Result<DeviceRrg, RrgError> {
    RrgBuilder::new(arch, options.clone()).build(sink)
}
