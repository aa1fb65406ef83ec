//! Panel topology: which zones a layout has and how they are split.

use crate::models::{LayoutId, SplitDirection, ZoneKey};

/// Ordered zone keys, labels and split direction for a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub direction: SplitDirection,
    /// Zone keys in on-screen order.
    pub zone_keys: &'static [ZoneKey],
    /// Human labels aligned with `zone_keys`.
    pub zone_labels: &'static [&'static str],
}

impl Topology {
    /// Topology with no zones, used for unrecognised layouts.
    pub const EMPTY: Topology = Topology {
        direction: SplitDirection::Vertical,
        zone_keys: &[],
        zone_labels: &[],
    };

    pub fn len(&self) -> usize {
        self.zone_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zone_keys.is_empty()
    }

    pub fn contains(&self, key: ZoneKey) -> bool {
        self.zone_keys.contains(&key)
    }

    /// The zone made active when the layout is selected.
    pub fn first(&self) -> Option<ZoneKey> {
        self.zone_keys.first().copied()
    }

    /// Label for a zone of this topology.
    pub fn label_of(&self, key: ZoneKey) -> Option<&'static str> {
        self.zone_keys
            .iter()
            .position(|k| *k == key)
            .and_then(|i| self.zone_labels.get(i).copied())
    }

    /// Iterate `(key, label)` pairs in order.
    pub fn zones(&self) -> impl Iterator<Item = (ZoneKey, &'static str)> + '_ {
        self.zone_keys
            .iter()
            .copied()
            .zip(self.zone_labels.iter().copied())
    }
}

/// Topology of a known layout.
pub fn topology(layout: LayoutId) -> Topology {
    use SplitDirection::{Horizontal, Vertical};
    use ZoneKey::*;

    match layout {
        LayoutId::Fullscreen => Topology {
            direction: Vertical,
            zone_keys: &[Full],
            zone_labels: &["Full"],
        },
        LayoutId::TwoRow => Topology {
            direction: Vertical,
            zone_keys: &[Top, Bottom],
            zone_labels: &["Top", "Bottom"],
        },
        LayoutId::ThreeRow => Topology {
            direction: Vertical,
            zone_keys: &[Top, Middle, Bottom],
            zone_labels: &["Top", "Middle", "Bottom"],
        },
        LayoutId::TwoColumn => Topology {
            direction: Horizontal,
            zone_keys: &[Left, Right],
            zone_labels: &["Left", "Right"],
        },
        LayoutId::ThreeColumn => Topology {
            direction: Horizontal,
            zone_keys: &[Left, Center, Right],
            zone_labels: &["Left", "Center", "Right"],
        },
    }
}

/// Resolve a layout identifier string.
///
/// Unknown identifiers resolve to [`Topology::EMPTY`] rather than an error.
pub fn resolve(layout_id: &str) -> Topology {
    match layout_id.parse::<LayoutId>() {
        Ok(layout) => topology(layout),
        Err(_) => {
            tracing::debug!(layout_id, "Unknown layout, resolving to empty topology");
            Topology::EMPTY
        }
    }
}

impl LayoutId {
    /// Topology of this layout.
    pub fn topology(&self) -> Topology {
        topology(*self)
    }
}
