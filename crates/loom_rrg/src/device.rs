//! The finished device: routing graph, block views, unique modules, and
//! configuration-bit ranges.

use crate::canon::{classify, ModuleTable};
use crate::chan::ChanType;
use crate::conf_bits::{block_conf_bits, BitDemand, ConfBitCounter, ConfPorts};
use crate::error::RrgError;
use crate::graph::RoutingGraph;
use crate::gsb::{Cb, Gsb};
use crate::order::{device_blocks_in_bitstream_order, BitstreamBlock};
use crate::signature::{cb_signature, chan_signature, sb_signature, CbSignature, SbSignature};
use crate::stats::RrgStats;
use loom_common::Coord;
use loom_config::BuildOptions;
use loom_diagnostics::DiagnosticSink;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Connection blocks of one channel type with their signatures and modules.
#[derive(Clone, Debug, Default)]
struct CbSet {
    blocks: BTreeMap<Coord, Cb>,
    signatures: BTreeMap<Coord, CbSignature>,
    modules: ModuleTable,
}

/// A device routing graph with every switch and connection block resolved
/// to its unique module and assigned configuration bits.
#[derive(Clone, Debug)]
pub struct DeviceRrg {
    graph: RoutingGraph,
    gsbs: Vec<Gsb>,
    sb_signatures: Vec<SbSignature>,
    sb_modules: ModuleTable,
    cbx: CbSet,
    cby: CbSet,
    chanx_modules: ModuleTable,
    chany_modules: ModuleTable,
    tile_conf: BTreeMap<Coord, ConfPorts>,
    total_regular: u32,
    total_reserved: u32,
    stats: RrgStats,
}

impl DeviceRrg {
    pub(crate) fn assemble(
        graph: RoutingGraph,
        options: &BuildOptions,
        sink: &DiagnosticSink,
    ) -> Result<Self, RrgError> {
        let (nx, ny) = (graph.grid.nx(), graph.grid.ny());
        let fan_in = graph.store.fan_in_index();

        let sb_coords: Vec<Coord> = (0..=nx)
            .flat_map(|x| (0..=ny).map(move |y| Coord::new(x, y)))
            .collect();
        let extract = |c: &Coord| -> Result<(Gsb, SbSignature), RrgError> {
            let gsb = graph.build_sb(*c)?;
            let sig = sb_signature(&gsb, &graph.store, &fan_in)?;
            Ok((gsb, sig))
        };
        let sbs: Vec<(Gsb, SbSignature)> = if options.parallel {
            sb_coords.par_iter().map(extract).collect::<Result<_, _>>()?
        } else {
            sb_coords.iter().map(extract).collect::<Result<_, _>>()?
        };
        let (gsbs, sb_signatures): (Vec<Gsb>, Vec<SbSignature>) = sbs.into_iter().unzip();
        let keyed: Vec<(Coord, SbSignature)> = sb_coords.iter().copied().zip(sb_signatures.iter().cloned()).collect();
        let sb_modules = classify("sb", &keyed, options, sink)?;

        let mut cb_sets = Vec::with_capacity(2);
        for chan_type in ChanType::ALL {
            let mut blocks = BTreeMap::new();
            let mut keyed = Vec::new();
            for &c in &sb_coords {
                if !graph.cb_exists(chan_type, c) {
                    continue;
                }
                let cb = graph.build_cb(chan_type, c)?;
                keyed.push((c, cb_signature(&cb, &fan_in)));
                blocks.insert(c, cb);
            }
            let modules = classify(chan_type.cb_name(), &keyed, options, sink)?;
            cb_sets.push(CbSet {
                blocks,
                signatures: keyed.into_iter().collect(),
                modules,
            });
        }
        let cby = cb_sets.pop().unwrap_or_default();
        let cbx = cb_sets.pop().unwrap_or_default();

        let mut chan_modules = Vec::with_capacity(2);
        for chan_type in ChanType::ALL {
            let channel = graph.channel(chan_type);
            let mut keyed = Vec::new();
            for &c in &sb_coords {
                if let Some(nodes) = channel.tracks(c) {
                    keyed.push((c, chan_signature(&graph.store, nodes, chan_type, c)?));
                }
            }
            chan_modules.push(classify(chan_type.name(), &keyed, options, sink)?);
        }
        let chany_modules = chan_modules.pop().unwrap_or_default();
        let chanx_modules = chan_modules.pop().unwrap_or_default();

        let stats = RrgStats::collect(&graph.store);
        sink.emit(stats.to_diagnostic());

        let mut device = DeviceRrg {
            graph,
            gsbs,
            sb_signatures,
            sb_modules,
            cbx,
            cby,
            chanx_modules,
            chany_modules,
            tile_conf: BTreeMap::new(),
            total_regular: 0,
            total_reserved: 0,
            stats,
        };
        device.assign_conf_bits(options)?;
        Ok(device)
    }

    /// Hands out configuration bits block by block in bitstream order.
    fn assign_conf_bits(&mut self, options: &BuildOptions) -> Result<(), RrgError> {
        let style = options.config_style;
        let order: Vec<BitstreamBlock> = device_blocks_in_bitstream_order(&self.graph.grid, |ct, c| {
            self.cb_set(ct).blocks.contains_key(&c)
        })
        .collect();

        let mut counter = ConfBitCounter::new();
        for block in order {
            match block {
                BitstreamBlock::Tile(root) => {
                    let bits = self.graph.tile_type_at(root)?.total_conf_bits();
                    let ports = counter.allocate(BitDemand {
                        reserved: 0,
                        regular: bits,
                    })?;
                    self.tile_conf.insert(root, ports);
                }
                BitstreamBlock::Sb(c) => {
                    let index = self.sb_index(c)?;
                    let gsb = &self.gsbs[index];
                    let mut fan_ins = Vec::new();
                    for (_, entry) in gsb.driven_tracks() {
                        fan_ins.push(self.graph.store.get(entry.node)?.fan_in());
                    }
                    self.gsbs[index].conf = counter.allocate(block_conf_bits(fan_ins, style))?;
                }
                BitstreamBlock::Cb(ct, c) => {
                    let set = self.cb_set_mut(ct);
                    let demand = match set.signatures.get(&c) {
                        Some(sig) => block_conf_bits(
                            sig.sides.iter().flatten().map(|p| p.drivers.len() as u32),
                            style,
                        ),
                        None => BitDemand::default(),
                    };
                    if let Some(cb) = set.blocks.get_mut(&c) {
                        cb.conf = counter.allocate(demand)?;
                    }
                }
            }
        }
        self.total_regular = counter.total_regular();
        self.total_reserved = counter.total_reserved();
        Ok(())
    }

    fn cb_set(&self, chan_type: ChanType) -> &CbSet {
        match chan_type {
            ChanType::ChanX => &self.cbx,
            ChanType::ChanY => &self.cby,
        }
    }

    fn cb_set_mut(&mut self, chan_type: ChanType) -> &mut CbSet {
        match chan_type {
            ChanType::ChanX => &mut self.cbx,
            ChanType::ChanY => &mut self.cby,
        }
    }

    fn sb_index(&self, c: Coord) -> Result<usize, RrgError> {
        let (nx, ny) = (self.graph.grid.nx(), self.graph.grid.ny());
        if c.x > nx || c.y > ny {
            return Err(RrgError::NoSuchBlock {
                structure: "sb",
                coord: c,
            });
        }
        Ok((c.x * (ny + 1) + c.y) as usize)
    }

    /// The routing graph.
    pub fn graph(&self) -> &RoutingGraph {
        &self.graph
    }

    /// Consumes the device, keeping only the routing graph.
    pub fn into_graph(self) -> RoutingGraph {
        self.graph
    }

    /// The generalized switch block at `(x, y)`.
    pub fn gsb(&self, x: u32, y: u32) -> Result<&Gsb, RrgError> {
        let index = self.sb_index(Coord::new(x, y))?;
        Ok(&self.gsbs[index])
    }

    /// Every generalized switch block, x outer and y inner.
    pub fn gsbs(&self) -> &[Gsb] {
        &self.gsbs
    }

    /// Representative of the switch-block module containing `c`.
    pub fn unique_sb_module(&self, c: Coord) -> Result<&Gsb, RrgError> {
        let rep = self.sb_modules.representative_of(c).ok_or(RrgError::NoSuchBlock {
            structure: "sb",
            coord: c,
        })?;
        self.gsb(rep.x, rep.y)
    }

    /// Returns `true` if a connection block sits on `(chan_type, c)`.
    pub fn cb_exists(&self, chan_type: ChanType, c: Coord) -> bool {
        self.cb_set(chan_type).blocks.contains_key(&c)
    }

    /// The connection block on `(chan_type, c)`.
    pub fn cb(&self, chan_type: ChanType, c: Coord) -> Result<&Cb, RrgError> {
        self.cb_set(chan_type).blocks.get(&c).ok_or(RrgError::NoSuchBlock {
            structure: chan_type.cb_name(),
            coord: c,
        })
    }

    /// Connection blocks of one type in coordinate order.
    pub fn cbs(&self, chan_type: ChanType) -> impl Iterator<Item = &Cb> {
        self.cb_set(chan_type).blocks.values()
    }

    /// Representative of the connection-block module containing `c`.
    pub fn unique_cb_module(&self, chan_type: ChanType, c: Coord) -> Result<&Cb, RrgError> {
        let rep = self
            .cb_set(chan_type)
            .modules
            .representative_of(c)
            .ok_or(RrgError::NoSuchBlock {
                structure: chan_type.cb_name(),
                coord: c,
            })?;
        self.cb(chan_type, rep)
    }

    /// Representative coordinate of the channel module containing `c`.
    pub fn unique_chan_module(&self, chan_type: ChanType, c: Coord) -> Result<Coord, RrgError> {
        self.chan_modules(chan_type)
            .representative_of(c)
            .ok_or(RrgError::NoSuchBlock {
                structure: chan_type.name(),
                coord: c,
            })
    }

    /// Switch-block module table.
    pub fn sb_modules(&self) -> &ModuleTable {
        &self.sb_modules
    }

    /// Connection-block module table of one channel type.
    pub fn cb_modules(&self, chan_type: ChanType) -> &ModuleTable {
        &self.cb_set(chan_type).modules
    }

    /// Channel module table of one channel type.
    pub fn chan_modules(&self, chan_type: ChanType) -> &ModuleTable {
        match chan_type {
            ChanType::ChanX => &self.chanx_modules,
            ChanType::ChanY => &self.chany_modules,
        }
    }

    /// Structural signature of the switch block at `c`.
    pub fn sb_signature(&self, c: Coord) -> Option<&SbSignature> {
        self.sb_index(c).ok().and_then(|i| self.sb_signatures.get(i))
    }

    /// Structural signature of the connection block on `(chan_type, c)`.
    pub fn cb_signature(&self, chan_type: ChanType, c: Coord) -> Option<&CbSignature> {
        self.cb_set(chan_type).signatures.get(&c)
    }

    /// Configuration ports of the tile block rooted at `root`.
    pub fn tile_conf_bits(&self, root: Coord) -> Option<&ConfPorts> {
        self.tile_conf.get(&root)
    }

    /// Regular configuration bits of the whole device.
    pub fn total_conf_bits(&self) -> u32 {
        self.total_regular
    }

    /// Largest number of reserved lines any block uses.
    pub fn total_reserved_bits(&self) -> u32 {
        self.total_reserved
    }

    /// Every configurable block with its ports, in bitstream order.
    pub fn conf_ranges(&self) -> Vec<(BitstreamBlock, ConfPorts)> {
        device_blocks_in_bitstream_order(&self.graph.grid, |ct, c| self.cb_exists(ct, c))
            .filter_map(|block| {
                let ports = match block {
                    BitstreamBlock::Tile(root) => self.tile_conf.get(&root).copied()?,
                    BitstreamBlock::Sb(c) => self.gsbs.get(self.sb_index(c).ok()?)?.conf,
                    BitstreamBlock::Cb(ct, c) => self.cb(ct, c).ok()?.conf,
                };
                Some((block, ports))
            })
            .collect()
    }

    /// Node, edge, and multiplexer statistics.
    pub fn stats(&self) -> &RrgStats {
        &self.stats
    }
}
