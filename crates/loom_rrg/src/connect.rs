//! Edge construction: wiring tiles, switch blocks, and connection blocks.

use crate::chan::ChanType;
use crate::error::RrgError;
use crate::gsb::{ChanEntry, PinEntry, PortDir};
use crate::graph::RoutingGraph;
use crate::ids::NodeId;
use loom_arch::{PinType, Segment, SegmentId, SwitchBlockPattern, SwitchId};
use loom_common::{Coord, Side};
use loom_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Location};

/// A connection block depopulated down to no input connections.
pub const W_EMPTY_CB: DiagnosticCode = DiagnosticCode::new(Category::Warning, 303);

type Batch = (NodeId, Vec<(NodeId, SwitchId)>);

/// Adds every edge of the device: SOURCE/SINK hookups, switch-block
/// patterns, and connection-block patterns.
pub(crate) fn connect(graph: &mut RoutingGraph, sink: &DiagnosticSink) -> Result<(), RrgError> {
    connect_tiles(graph)?;
    for x in 0..=graph.grid.nx() {
        for y in 0..=graph.grid.ny() {
            let batches = sb_edges(graph, Coord::new(x, y))?;
            apply(graph, batches)?;
        }
    }
    for chan_type in ChanType::ALL {
        for x in 0..=graph.grid.nx() {
            for y in 0..=graph.grid.ny() {
                let c = Coord::new(x, y);
                if !graph.cb_exists(chan_type, c) {
                    continue;
                }
                let edges = cb_edges(graph, chan_type, c)?;
                if edges.is_empty() {
                    sink.emit(
                        Diagnostic::warning(
                            W_EMPTY_CB,
                            format!("{} has input pins but no track reaches them", chan_type.cb_name()),
                            Location::at(c, chan_type.cb_name()),
                        )
                        .with_help("check the segment cb patterns"),
                    );
                }
                for (track, ipin, switch) in edges {
                    graph.store.add_edge(track, ipin, switch)?;
                }
            }
        }
    }
    Ok(())
}

fn apply(graph: &mut RoutingGraph, batches: Vec<Batch>) -> Result<(), RrgError> {
    for (src, targets) in batches {
        graph.store.add_edges_bulk(src, targets)?;
    }
    Ok(())
}

fn connect_tiles(graph: &mut RoutingGraph) -> Result<(), RrgError> {
    let delayless = graph.arch.delayless_switch;
    let mut batches = Vec::new();
    for (&root, nodes) in &graph.tiles {
        let tile = graph.tile_type_at(root)?;
        for (class, &class_node) in tile.classes.iter().zip(&nodes.classes) {
            let pins = class.pins.iter().filter_map(|&p| nodes.pins.get(p as usize).copied());
            match class.pin_type {
                PinType::Output => {
                    batches.push((class_node, pins.map(|p| (p, delayless)).collect()));
                }
                PinType::Input => {
                    for pin in pins {
                        batches.push((pin, vec![(class_node, delayless)]));
                    }
                }
            }
        }
    }
    apply(graph, batches)
}

/// Number of connections for a fraction `fc` of `total` candidates,
/// at least one and at most all of them.
pub(crate) fn fc_count(fc: f64, total: usize) -> usize {
    ((fc * total as f64).round() as usize).clamp(1, total.max(1))
}

/// Index of the target track for the `i`-th of `n` incoming tracks turning
/// `rel` quarter turns clockwise.
fn pattern_index(pattern: SwitchBlockPattern, rel: u8, i: usize, n: usize) -> usize {
    match (pattern, rel) {
        (SwitchBlockPattern::Wilton, 1) => (i + 1) % n,
        (SwitchBlockPattern::Wilton, 3) => (n - i % n) % n,
        _ => i % n,
    }
}

fn segment<'a>(graph: &'a RoutingGraph, id: SegmentId, at: Coord) -> Result<&'a Segment, RrgError> {
    graph.arch.segment(id).ok_or_else(|| RrgError::InconsistentBlock {
        structure: "sb",
        coord: at,
        reason: format!("unknown segment {id}"),
    })
}

fn sb_edges(graph: &RoutingGraph, sb: Coord) -> Result<Vec<Batch>, RrgError> {
    let mut tracks: Vec<Vec<ChanEntry>> = Vec::with_capacity(4);
    let mut opins: Vec<Vec<PinEntry>> = Vec::with_capacity(4);
    for side in Side::ALL {
        tracks.push(graph.sb_side_tracks(sb, side)?.1);
        opins.push(graph.sb_side_opins(sb, side)?);
    }
    let starts = |side: Side, seg: Option<SegmentId>| -> Vec<&ChanEntry> {
        tracks[side.index()]
            .iter()
            .filter(|e| e.port == PortDir::Out && !e.passing)
            .filter(|e| seg.map_or(true, |s| e.segment == s))
            .collect()
    };

    let mut batches = Vec::new();

    for side in Side::ALL {
        let targets = starts(side, None);
        if targets.is_empty() {
            continue;
        }
        for (q, opin) in opins[side.index()].iter().enumerate() {
            let fc = graph.tile_type_at(opin.tile)?.fc_out;
            let n = fc_count(fc, targets.len());
            let step = targets.len() / n;
            let mut edges = Vec::with_capacity(n);
            for m in 0..n {
                let target = targets[(q + m * step) % targets.len()];
                edges.push((target.node, segment(graph, target.segment, sb)?.opin_switch));
            }
            batches.push((opin.node, edges));
        }
    }

    let sb_params = graph.arch.switch_block;
    for from in Side::ALL {
        for seg_id in graph.arch.segment_ids() {
            let seg = segment(graph, seg_id, sb)?;
            let incoming = tracks[from.index()]
                .iter()
                .filter(|e| e.port == PortDir::In && e.segment == seg_id);
            let ending: Vec<&ChanEntry> = incoming.clone().filter(|e| !e.passing).collect();
            let passing: Vec<&ChanEntry> = incoming
                .filter(|e| e.passing)
                .filter(|e| seg.sb_pattern.get(e.phase as usize + 1).copied().unwrap_or(false))
                .collect();
            if ending.is_empty() && passing.is_empty() {
                continue;
            }
            for to in Side::ALL {
                if to == from {
                    continue;
                }
                let targets = starts(to, Some(seg_id));
                let n = targets.len();
                if n == 0 {
                    continue;
                }
                let rel = from.turns_to(to);
                let fanout = (sb_params.fs / 3) as usize;
                for (i, entry) in ending.iter().enumerate() {
                    let base = pattern_index(sb_params.pattern, rel, i, n);
                    let edges = (0..fanout.min(n))
                        .map(|m| (targets[(base + m) % n].node, seg.wire_switch))
                        .collect();
                    batches.push((entry.node, edges));
                }
                if rel == 2 && !seg.wire_opposite_side {
                    continue;
                }
                let sub_fanout = (sb_params.sub_fs / 3) as usize;
                for (i, entry) in passing.iter().enumerate() {
                    let base = pattern_index(sb_params.sub_pattern, rel, i, n);
                    let edges = (0..sub_fanout.min(n))
                        .map(|m| (targets[(base + m) % n].node, seg.wire_switch))
                        .collect();
                    batches.push((entry.node, edges));
                }
            }
        }
    }
    Ok(batches)
}

fn cb_edges(
    graph: &RoutingGraph,
    chan_type: ChanType,
    c: Coord,
) -> Result<Vec<(NodeId, NodeId, SwitchId)>, RrgError> {
    let cb = graph.build_cb(chan_type, c)?;
    let half = graph.plan.half() as usize;
    let mut edges = Vec::new();
    if half == 0 {
        return Ok(edges);
    }
    let switch = graph.arch.wire_to_ipin_switch;
    for side in chan_type.pin_sides() {
        for (j, ipin) in cb.ipins(side).iter().enumerate() {
            let fc = graph.tile_type_at(ipin.tile)?.fc_in;
            let n = fc_count(fc, half);
            let step = half / n;
            for m in 0..n {
                let t = (j + m * step) % half;
                for track in [&cb.tracks[t], &cb.tracks[half + t]] {
                    let seg = segment(graph, track.segment, c)?;
                    if seg.cb_pattern.get(track.phase as usize).copied().unwrap_or(false) {
                        edges.push((track.node, ipin.node, switch));
                    }
                }
            }
        }
    }
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fc_count_clamps() {
        assert_eq!(fc_count(0.0, 8), 1);
        assert_eq!(fc_count(0.5, 8), 4);
        assert_eq!(fc_count(1.0, 8), 8);
        assert_eq!(fc_count(0.3, 4), 1);
        assert_eq!(fc_count(0.4, 4), 2);
    }

    #[test]
    fn wilton_turns() {
        let w = SwitchBlockPattern::Wilton;
        assert_eq!(pattern_index(w, 2, 1, 4), 1);
        assert_eq!(pattern_index(w, 1, 3, 4), 0);
        assert_eq!(pattern_index(w, 3, 1, 4), 3);
        assert_eq!(pattern_index(w, 3, 0, 4), 0);
    }

    #[test]
    fn subset_keeps_index() {
        let s = SwitchBlockPattern::Subset;
        for rel in 1..4 {
            assert_eq!(pattern_index(s, rel, 5, 4), 1);
        }
    }
}
