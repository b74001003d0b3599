//! Architecture fixtures shared by the unit tests of this crate.

use loom_arch::*;
use loom_common::Side;

fn switch(name: &str) -> Switch {
    Switch {
        name: name.into(),
        kind: SwitchKind::Mux,
        resistance: 0.0,
        c_in: 0.0,
        c_out: 0.0,
        t_del: 0.0,
    }
}

pub(crate) fn segment(name: &str, length: u32, tracks: u32) -> Segment {
    Segment {
        name: name.into(),
        length,
        tracks,
        directionality: Directionality::Unidirectional,
        wire_switch: SwitchId::from_raw(2),
        opin_switch: SwitchId::from_raw(2),
        cb_pattern: vec![true; length as usize],
        sb_pattern: vec![true; length as usize + 1],
        wire_opposite_side: false,
        r_metal: 10.0,
        c_metal: 1.0,
    }
}

fn locations(entries: &[(u32, Side, u32)]) -> Vec<PinLocation> {
    let mut locs: Vec<PinLocation> = entries
        .iter()
        .map(|&(height, side, pin)| PinLocation { height, side, pin })
        .collect();
    locs.sort();
    locs
}

/// A logic tile with one input and one output pin per side.
pub(crate) fn clb() -> TileType {
    let mut entries = Vec::new();
    for side in Side::ALL {
        entries.push((0, side, side.index() as u32));
        entries.push((0, side, 4 + side.index() as u32));
    }
    TileType {
        name: "clb".into(),
        kind: TileKind::Logic,
        height: 1,
        capacity: 1,
        num_pins: 8,
        classes: vec![
            PinClass { pin_type: PinType::Input, pins: vec![0, 1, 2, 3] },
            PinClass { pin_type: PinType::Output, pins: vec![4, 5, 6, 7] },
        ],
        locations: locations(&entries),
        fc_in: 0.5,
        fc_out: 0.5,
        conf_bits: 16,
    }
}

/// An I/O tile whose two pins sit on every side.
pub(crate) fn io() -> TileType {
    let mut entries = Vec::new();
    for side in Side::ALL {
        entries.push((0, side, 0));
        entries.push((0, side, 1));
    }
    TileType {
        name: "io".into(),
        kind: TileKind::Io,
        height: 1,
        capacity: 1,
        num_pins: 2,
        classes: vec![
            PinClass { pin_type: PinType::Input, pins: vec![0] },
            PinClass { pin_type: PinType::Output, pins: vec![1] },
        ],
        locations: locations(&entries),
        fc_in: 0.5,
        fc_out: 0.5,
        conf_bits: 1,
    }
}

/// A `nx × ny` core of `clb` tiles inside an `io` ring with one length-1
/// segment of two tracks per direction.
pub(crate) fn arch(nx: u32, ny: u32) -> Architecture {
    Architecture {
        name: "fixture".into(),
        switches: vec![switch("delayless"), switch("ipin_cblock"), switch("mux0")],
        segments: vec![segment("L1", 1, 2)],
        switch_block: SwitchBlock {
            pattern: SwitchBlockPattern::Wilton,
            fs: 3,
            sub_pattern: SwitchBlockPattern::Subset,
            sub_fs: 3,
        },
        tile_types: vec![io(), clb()],
        layout: DeviceLayout {
            nx,
            ny,
            fill: TileTypeId::from_raw(1),
            io: Some(TileTypeId::from_raw(0)),
            columns: Vec::new(),
            tiles: Vec::new(),
        },
        delayless_switch: SwitchId::from_raw(0),
        wire_to_ipin_switch: SwitchId::from_raw(1),
        tileable: true,
    }
}

/// Like [`arch`] with a single length-2 segment.
pub(crate) fn arch_l2(nx: u32, ny: u32) -> Architecture {
    let mut a = arch(nx, ny);
    a.segments = vec![segment("L2", 2, 2)];
    a
}

/// Like [`arch`] with a column of two-high `tall` tiles at `x = 2`.
pub(crate) fn arch_with_tall_column(nx: u32, ny: u32) -> Architecture {
    let mut a = arch(nx, ny);
    a.tile_types.push(TileType {
        name: "tall".into(),
        kind: TileKind::Logic,
        height: 2,
        capacity: 1,
        num_pins: 4,
        classes: vec![
            PinClass { pin_type: PinType::Input, pins: vec![0, 1] },
            PinClass { pin_type: PinType::Output, pins: vec![2, 3] },
        ],
        locations: locations(&[
            (0, Side::Left, 0),
            (0, Side::Left, 2),
            (1, Side::Right, 1),
            (1, Side::Right, 3),
        ]),
        fc_in: 1.0,
        fc_out: 1.0,
        conf_bits: 40,
    });
    a.layout.columns.push(ColumnPlacement {
        x: 2,
        tile: TileTypeId::from_raw(2),
        start_y: 1,
        repeat: 0,
    });
    a
}
