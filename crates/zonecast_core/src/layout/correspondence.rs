//! Carrying zone content across layout changes.
//!
//! Row keys map to the geometrically nearest column key and back:
//! `top`↔`left`, `bottom`↔`right`, `middle`↔`center`. When a layout
//! changes, each new zone is seeded by walking a [`SeedChain`] of lookup
//! rules until one finds an old zone.

use crate::models::{Zone, ZoneKey, ZoneMap};

use super::topology::Topology;

/// Row/column counterpart of a zone key. Keys without one map to themselves.
pub fn correspond(key: ZoneKey) -> ZoneKey {
    match key {
        ZoneKey::Top => ZoneKey::Left,
        ZoneKey::Bottom => ZoneKey::Right,
        ZoneKey::Middle => ZoneKey::Center,
        ZoneKey::Left => ZoneKey::Top,
        ZoneKey::Right => ZoneKey::Bottom,
        ZoneKey::Center => ZoneKey::Middle,
        ZoneKey::Full => ZoneKey::Full,
    }
}

/// One rule in the seeding chain: which old zone to look at for a new key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedRule {
    /// The old zone with the same key.
    SameKey,
    /// The old zone under the corresponding row/column key.
    Corresponding,
}

impl SeedRule {
    fn source_key(self, key: ZoneKey) -> ZoneKey {
        match self {
            SeedRule::SameKey => key,
            SeedRule::Corresponding => correspond(key),
        }
    }
}

/// Prioritized lookup chain used to seed new zones from old ones.
///
/// The first rule whose source zone exists wins, even if that zone is
/// empty. If no rule matches the new zone starts empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedChain {
    rules: Vec<SeedRule>,
}

impl Default for SeedChain {
    fn default() -> Self {
        Self {
            rules: vec![SeedRule::SameKey, SeedRule::Corresponding],
        }
    }
}

impl SeedChain {
    /// Build a chain from explicit rules, highest priority first.
    pub fn new(rules: Vec<SeedRule>) -> Self {
        Self { rules }
    }

    /// Append a lower-priority rule.
    pub fn then(mut self, rule: SeedRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[SeedRule] {
        &self.rules
    }

    /// Find the seed zone for `key` among `previous` zones.
    pub fn seed(&self, key: ZoneKey, previous: Option<&ZoneMap>) -> Zone {
        let Some(previous) = previous else {
            return Zone::default();
        };
        self.rules
            .iter()
            .find_map(|rule| previous.get(&rule.source_key(key)))
            .cloned()
            .unwrap_or_default()
    }

    /// Rebuild the zone set for a new topology.
    ///
    /// The result holds exactly the topology's keys.
    pub fn rezone(&self, previous: Option<&ZoneMap>, topology: &Topology) -> ZoneMap {
        topology
            .zone_keys
            .iter()
            .map(|key| (*key, self.seed(*key, previous)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LayoutId, MediaReference};

    fn zone(urls: &[&str]) -> Zone {
        Zone::new(urls.iter().map(|u| MediaReference::video(*u)).collect())
    }

    #[test]
    fn correspondence_is_involutive() {
        for key in ZoneKey::all() {
            assert_eq!(correspond(correspond(*key)), *key);
        }
        assert_eq!(correspond(ZoneKey::Full), ZoneKey::Full);
    }

    #[test]
    fn rows_to_columns_carry_content() {
        let mut previous = ZoneMap::new();
        previous.insert(ZoneKey::Top, zone(&["a", "b"]));
        previous.insert(ZoneKey::Bottom, Zone::default());

        let zones = SeedChain::default().rezone(Some(&previous), &LayoutId::TwoColumn.topology());

        assert_eq!(zones.len(), 2);
        assert_eq!(zones[&ZoneKey::Left], zone(&["a", "b"]));
        assert!(zones[&ZoneKey::Right].is_empty());
    }

    #[test]
    fn same_key_wins_over_corresponding() {
        let mut previous = ZoneMap::new();
        previous.insert(ZoneKey::Left, zone(&["same"]));
        previous.insert(ZoneKey::Top, zone(&["mapped"]));

        let seeded = SeedChain::default().seed(ZoneKey::Left, Some(&previous));
        assert_eq!(seeded, zone(&["same"]));
    }

    #[test]
    fn present_but_empty_zone_stops_the_chain() {
        let mut previous = ZoneMap::new();
        previous.insert(ZoneKey::Left, Zone::default());
        previous.insert(ZoneKey::Top, zone(&["mapped"]));

        let seeded = SeedChain::default().seed(ZoneKey::Left, Some(&previous));
        assert!(seeded.is_empty());
    }

    #[test]
    fn fullscreen_does_not_inherit_split_content() {
        let mut previous = ZoneMap::new();
        previous.insert(ZoneKey::Top, zone(&["a"]));

        let zones = SeedChain::default().rezone(Some(&previous), &LayoutId::Fullscreen.topology());
        assert_eq!(zones.keys().copied().collect::<Vec<_>>(), vec![ZoneKey::Full]);
        assert!(zones[&ZoneKey::Full].is_empty());
    }

    #[test]
    fn same_key_only_chain_drops_counterparts() {
        let mut previous = ZoneMap::new();
        previous.insert(ZoneKey::Top, zone(&["a"]));

        let chain = SeedChain::new(vec![SeedRule::SameKey]);
        let zones = chain.rezone(Some(&previous), &LayoutId::TwoColumn.topology());
        assert!(zones[&ZoneKey::Left].is_empty());
    }
}
