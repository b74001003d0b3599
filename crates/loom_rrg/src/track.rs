//! Start/end conventions for channel wires.
//!
//! An increasing wire starts at `(x_low, y_low)` and ends at
//! `(x_high, y_high)`; a decreasing wire runs the other way. The track id at
//! the wire's end is `track_ids.last()` when increasing and
//! `track_ids.first()` when decreasing. Switch-block wiring matches a wire's
//! end to the entry side of the next switch block through these helpers.

use crate::node::{Direction, NodeKind, RoutingNode};
use loom_common::Coord;

impl RoutingNode {
    /// Grid cell where the wire's signal enters. `None` for non-channel and
    /// bidirectional nodes.
    pub fn start(&self) -> Option<Coord> {
        match self.channel_direction()? {
            Direction::Increasing => Some(self.bounds.low()),
            Direction::Decreasing => Some(self.bounds.high()),
            Direction::Bidirectional => None,
        }
    }

    /// Grid cell where the wire's signal leaves.
    pub fn end(&self) -> Option<Coord> {
        match self.channel_direction()? {
            Direction::Increasing => Some(self.bounds.high()),
            Direction::Decreasing => Some(self.bounds.low()),
            Direction::Bidirectional => None,
        }
    }

    /// Track id the wire occupies at its start.
    pub fn start_track_id(&self) -> Option<u32> {
        match self.channel_direction()? {
            Direction::Increasing => self.track_ids.first().copied(),
            Direction::Decreasing => self.track_ids.last().copied(),
            Direction::Bidirectional => None,
        }
    }

    /// Track id the wire occupies at its end-of-channel boundary.
    pub fn end_track_id(&self) -> Option<u32> {
        match self.channel_direction()? {
            Direction::Increasing => self.track_ids.last().copied(),
            Direction::Decreasing => self.track_ids.first().copied(),
            Direction::Bidirectional => None,
        }
    }

    /// Track id at channel position `pos` along the wire's axis.
    pub fn track_at(&self, pos: u32) -> Option<u32> {
        let low = match self.kind {
            NodeKind::ChanX => self.bounds.x_low,
            NodeKind::ChanY => self.bounds.y_low,
            _ => return None,
        };
        let offset = pos.checked_sub(low)?;
        self.track_ids.get(offset as usize).copied()
    }

    fn channel_direction(&self) -> Option<Direction> {
        if self.kind.is_channel() {
            self.direction
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{Bounds, Direction, NodeKind, RoutingNode};
    use loom_common::Coord;

    fn wire(kind: NodeKind, bounds: Bounds, direction: Direction, tracks: Vec<u32>) -> RoutingNode {
        let mut node = RoutingNode::new(kind, bounds);
        node.direction = Some(direction);
        node.track_ids = tracks;
        node
    }

    #[test]
    fn increasing_runs_low_to_high() {
        let n = wire(NodeKind::ChanX, Bounds::new(2, 4, 1, 1), Direction::Increasing, vec![0, 1, 2]);
        assert_eq!(n.start(), Some(Coord::new(2, 1)));
        assert_eq!(n.end(), Some(Coord::new(4, 1)));
        assert_eq!(n.start_track_id(), Some(0));
        assert_eq!(n.end_track_id(), Some(2));
    }

    #[test]
    fn decreasing_runs_high_to_low() {
        let n = wire(NodeKind::ChanY, Bounds::new(0, 0, 1, 2), Direction::Decreasing, vec![5, 4]);
        assert_eq!(n.start(), Some(Coord::new(0, 2)));
        assert_eq!(n.end(), Some(Coord::new(0, 1)));
        assert_eq!(n.start_track_id(), Some(4));
        assert_eq!(n.end_track_id(), Some(5));
    }

    #[test]
    fn track_at_position() {
        let n = wire(NodeKind::ChanY, Bounds::new(3, 3, 2, 3), Direction::Increasing, vec![6, 7]);
        assert_eq!(n.track_at(2), Some(6));
        assert_eq!(n.track_at(3), Some(7));
        assert_eq!(n.track_at(1), None);
        assert_eq!(n.track_at(4), None);
    }

    #[test]
    fn pins_have_no_start() {
        let n = RoutingNode::new(NodeKind::Ipin, Bounds::point(Coord::new(1, 1)));
        assert_eq!(n.start(), None);
        assert_eq!(n.end_track_id(), None);
    }

    #[test]
    fn bidirectional_has_no_start() {
        let n = wire(NodeKind::ChanX, Bounds::new(1, 1, 0, 0), Direction::Bidirectional, vec![0]);
        assert_eq!(n.start(), None);
        assert_eq!(n.end(), None);
    }
}
