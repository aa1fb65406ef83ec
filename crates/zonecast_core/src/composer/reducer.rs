//! Pure transition function over the in-progress composition.

use std::collections::BTreeSet;

use crate::layout::{normalize_with_step, SeedChain, Topology, DEFAULT_SNAP_STEP};
use crate::models::{CompiledConfig, DeviceId, MediaReference, Zone, ZoneKey, ZoneMap};

use super::action::Action;
use super::errors::{CompositionError, CompositionResult};

/// Everything an operator has chosen so far in one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    /// The document that will be published.
    pub config: CompiledConfig,
    /// Zone receiving content selections.
    pub active_zone: Option<ZoneKey>,
    /// Selected target devices.
    pub targets: BTreeSet<DeviceId>,
    /// Whether the operator has dragged a zone divider since the layout
    /// was last chosen.
    pub has_resized: bool,
}

impl Draft {
    /// A fresh session: fullscreen, no zones, nothing selected.
    pub fn new() -> Self {
        Self {
            active_zone: Some(ZoneKey::Full),
            ..Self::default()
        }
    }

    /// Topology of the current layout.
    pub fn topology(&self) -> Topology {
        self.config.layout.topology()
    }
}

/// Tunables applied by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionRules {
    /// Snapping grid for manual resizes, in percent. `None` disables it.
    pub snap_step: Option<f64>,
    /// Smallest percentage a zone may be resized to.
    pub min_zone_percent: f64,
    /// How zone content is carried across layout changes.
    pub seed_chain: SeedChain,
}

impl Default for CompositionRules {
    fn default() -> Self {
        Self {
            snap_step: Some(DEFAULT_SNAP_STEP),
            min_zone_percent: 10.0,
            seed_chain: SeedChain::default(),
        }
    }
}

/// Apply `action` to `draft`, returning the next draft.
///
/// The input is never modified; on error the caller keeps its draft.
/// `Submit` leaves the draft unchanged; publishing goes through
/// `Composer::submit`.
pub fn reduce(draft: &Draft, action: &Action, rules: &CompositionRules) -> CompositionResult<Draft> {
    let mut next = draft.clone();

    match action {
        Action::SetLayout(layout) => {
            if *layout == draft.config.layout && draft.config.zones.is_some() {
                return Ok(next);
            }
            let topology = layout.topology();
            next.config.zones = Some(
                rules
                    .seed_chain
                    .rezone(draft.config.zones.as_ref(), &topology),
            );
            next.config.layout = *layout;
            // Old ratios mean nothing under a new topology.
            next.config.zone_sizes = None;
            next.has_resized = false;
            next.active_zone = topology.first();
        }

        Action::SetZoneSizes { raw_sizes, manual } => {
            if *manual {
                next.has_resized = true;
            }
            if !next.has_resized {
                return Ok(next);
            }
            let topology = draft.topology();
            let sizes = normalize_with_step(raw_sizes, topology.zone_keys, rules.snap_step)?;
            for key in topology.zone_keys {
                let percent = sizes.percent(*key).unwrap_or_default();
                if percent < rules.min_zone_percent {
                    return Err(CompositionError::ZoneTooSmall {
                        zone: *key,
                        percent,
                        min: rules.min_zone_percent,
                    });
                }
            }
            next.config.zone_sizes = Some(sizes);
        }

        Action::SetActiveZone(zone) => {
            ensure_in_layout(draft, *zone)?;
            next.active_zone = Some(*zone);
        }

        Action::AssignZoneItems { zone, items } => {
            ensure_in_layout(draft, *zone)?;
            let zone_entry = zone_mut(&mut next, *zone);
            zone_entry.items = unique_by_url(items);
        }

        Action::SetItemDuration { zone, url, seconds } => {
            ensure_in_layout(draft, *zone)?;
            if *seconds == 0 {
                return Err(CompositionError::InvalidDuration);
            }
            let item = zone_mut(&mut next, *zone)
                .items
                .iter_mut()
                .find(|item| item.url == *url)
                .ok_or_else(|| CompositionError::ItemNotFound {
                    zone: *zone,
                    url: url.clone(),
                })?;
            if !item.kind.is_timed() {
                return Err(CompositionError::UntimedItem {
                    url: url.clone(),
                    kind: item.kind.clone(),
                });
            }
            item.duration = Some(*seconds);
        }

        Action::MoveZoneItem { zone, from, to } => {
            ensure_in_layout(draft, *zone)?;
            let items = &mut zone_mut(&mut next, *zone).items;
            let len = items.len();
            for index in [*from, *to] {
                if index >= len {
                    return Err(CompositionError::ItemIndexOutOfRange {
                        zone: *zone,
                        index,
                        len,
                    });
                }
            }
            let item = items.remove(*from);
            items.insert(*to, item);
        }

        Action::SelectTargets(targets) => {
            next.targets = targets.clone();
        }

        Action::ToggleTarget(device_id) => {
            if !next.targets.remove(device_id) {
                next.targets.insert(device_id.clone());
            }
        }

        Action::Submit => {}
    }

    Ok(next)
}

fn ensure_in_layout(draft: &Draft, zone: ZoneKey) -> CompositionResult<()> {
    if draft.topology().contains(zone) {
        Ok(())
    } else {
        Err(CompositionError::UnknownZone {
            zone,
            layout: draft.config.layout,
        })
    }
}

/// Mutable zone of a draft, creating the layout's zone set on first use.
fn zone_mut(draft: &mut Draft, zone: ZoneKey) -> &mut Zone {
    let topology = draft.topology();
    let zones = draft
        .config
        .zones
        .get_or_insert_with(|| empty_zones(&topology));
    zones.entry(zone).or_default()
}

fn empty_zones(topology: &Topology) -> ZoneMap {
    topology
        .zone_keys
        .iter()
        .map(|key| (*key, Zone::default()))
        .collect()
}

/// Keep the first item for each url, normalizing MIME-style kinds.
fn unique_by_url(items: &[MediaReference]) -> Vec<MediaReference> {
    let mut seen = BTreeSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.url.as_str()))
        .map(|item| {
            let mut item = item.clone().normalized();
            if !item.kind.is_timed() {
                item.duration = None;
            }
            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LayoutId, MediaKind};

    fn apply(draft: &Draft, action: Action) -> Draft {
        reduce(draft, &action, &CompositionRules::default()).unwrap()
    }

    fn items(urls: &[&str]) -> Vec<MediaReference> {
        urls.iter().map(|u| MediaReference::image(*u, 5)).collect()
    }

    #[test]
    fn new_draft_is_empty_fullscreen() {
        let draft = Draft::new();
        assert_eq!(draft.config.layout, LayoutId::Fullscreen);
        assert!(draft.config.zones.is_none());
        assert_eq!(draft.active_zone, Some(ZoneKey::Full));
    }

    #[test]
    fn layout_switch_carries_rows_to_columns() {
        let draft = apply(&Draft::new(), Action::SetLayout(LayoutId::TwoRow));
        let draft = apply(
            &draft,
            Action::AssignZoneItems {
                zone: ZoneKey::Top,
                items: items(&["A", "B"]),
            },
        );
        let draft = apply(&draft, Action::SetLayout(LayoutId::TwoColumn));

        assert_eq!(draft.config.zone_keys(), vec![ZoneKey::Left, ZoneKey::Right]);
        assert_eq!(draft.config.zone(ZoneKey::Left).unwrap().items, items(&["A", "B"]));
        assert!(draft.config.zone(ZoneKey::Right).unwrap().is_empty());
        assert_eq!(draft.active_zone, Some(ZoneKey::Left));
    }

    #[test]
    fn layout_switch_drops_sizes_and_resize_state() {
        let draft = apply(&Draft::new(), Action::SetLayout(LayoutId::TwoColumn));
        let draft = apply(
            &draft,
            Action::SetZoneSizes {
                raw_sizes: vec![60.0, 40.0],
                manual: true,
            },
        );
        assert!(draft.config.zone_sizes.is_some());

        let draft = apply(&draft, Action::SetLayout(LayoutId::ThreeColumn));
        assert!(draft.config.zone_sizes.is_none());
        assert!(!draft.has_resized);
    }

    #[test]
    fn reselecting_layout_keeps_document() {
        let draft = apply(&Draft::new(), Action::SetLayout(LayoutId::TwoColumn));
        let draft = apply(
            &draft,
            Action::SetZoneSizes {
                raw_sizes: vec![70.0, 30.0],
                manual: true,
            },
        );
        assert_eq!(apply(&draft, Action::SetLayout(LayoutId::TwoColumn)), draft);
    }

    #[test]
    fn measurements_before_manual_resize_are_ignored() {
        let draft = apply(&Draft::new(), Action::SetLayout(LayoutId::ThreeRow));
        let measured = apply(
            &draft,
            Action::SetZoneSizes {
                raw_sizes: vec![1.0, 1.0, 1.0],
                manual: false,
            },
        );
        assert!(measured.config.zone_sizes.is_none());

        let dragged = apply(
            &measured,
            Action::SetZoneSizes {
                raw_sizes: vec![30.3, 30.3, 39.4],
                manual: true,
            },
        );
        let sizes = dragged.config.zone_sizes.unwrap();
        assert_eq!(sizes.get(ZoneKey::Top), Some("30.5%"));
        assert_eq!(sizes.get(ZoneKey::Bottom), Some("39.0%"));
    }

    #[test]
    fn resize_below_minimum_is_rejected() {
        let draft = apply(&Draft::new(), Action::SetLayout(LayoutId::TwoColumn));
        let err = reduce(
            &draft,
            &Action::SetZoneSizes {
                raw_sizes: vec![5.0, 95.0],
                manual: true,
            },
            &CompositionRules::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CompositionError::ZoneTooSmall { zone: ZoneKey::Left, .. }));
    }

    #[test]
    fn degenerate_resize_is_rejected() {
        let draft = apply(&Draft::new(), Action::SetLayout(LayoutId::TwoColumn));
        let err = reduce(
            &draft,
            &Action::SetZoneSizes {
                raw_sizes: vec![0.0, 0.0],
                manual: true,
            },
            &CompositionRules::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CompositionError::Resize(_)));
    }

    #[test]
    fn assigning_to_fullscreen_creates_zone_set() {
        let draft = apply(
            &Draft::new(),
            Action::AssignZoneItems {
                zone: ZoneKey::Full,
                items: items(&["A"]),
            },
        );
        assert_eq!(draft.config.zone_keys(), vec![ZoneKey::Full]);
    }

    #[test]
    fn assignment_outside_layout_is_rejected() {
        let err = reduce(
            &Draft::new(),
            &Action::AssignZoneItems {
                zone: ZoneKey::Left,
                items: items(&["A"]),
            },
            &CompositionRules::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CompositionError::UnknownZone {
                zone: ZoneKey::Left,
                layout: LayoutId::Fullscreen
            }
        );
    }

    #[test]
    fn assignment_drops_duplicate_urls_and_mime_kinds() {
        let mut mixed = items(&["A", "B", "A"]);
        mixed.push(MediaReference::new("C", MediaKind::Other("video/mp4".into())));
        let draft = apply(
            &Draft::new(),
            Action::AssignZoneItems {
                zone: ZoneKey::Full,
                items: mixed,
            },
        );
        let zone = draft.config.zone(ZoneKey::Full).unwrap();
        let urls: Vec<_> = zone.items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["A", "B", "C"]);
        assert_eq!(zone.items[2].kind, MediaKind::Video);
    }

    #[test]
    fn assignment_strips_durations_from_untimed_items() {
        let draft = apply(
            &Draft::new(),
            Action::AssignZoneItems {
                zone: ZoneKey::Full,
                items: vec![
                    MediaReference::video("V").with_duration(30),
                    MediaReference::new("M", MediaKind::Other("video/webm".into())).with_duration(9),
                    MediaReference::image("I", 7),
                ],
            },
        );
        let zone = draft.config.zone(ZoneKey::Full).unwrap();
        let durations: Vec<_> = zone.items.iter().map(|i| i.duration).collect();
        assert_eq!(durations, vec![None, None, Some(7)]);
    }

    #[test]
    fn active_zone_switch_keeps_other_selections() {
        let draft = apply(&Draft::new(), Action::SetLayout(LayoutId::TwoRow));
        let draft = apply(
            &draft,
            Action::AssignZoneItems {
                zone: ZoneKey::Top,
                items: items(&["A"]),
            },
        );
        let draft = apply(&draft, Action::SetActiveZone(ZoneKey::Bottom));
        let draft = apply(
            &draft,
            Action::AssignZoneItems {
                zone: ZoneKey::Bottom,
                items: items(&["B"]),
            },
        );
        assert_eq!(draft.config.zone(ZoneKey::Top).unwrap().items, items(&["A"]));
        assert_eq!(draft.config.zone(ZoneKey::Bottom).unwrap().items, items(&["B"]));
        assert_eq!(draft.active_zone, Some(ZoneKey::Bottom));
    }

    #[test]
    fn durations_apply_to_images_only() {
        let mut playlist = items(&["img"]);
        playlist.push(MediaReference::video("vid"));
        let draft = apply(
            &Draft::new(),
            Action::AssignZoneItems {
                zone: ZoneKey::Full,
                items: playlist,
            },
        );

        let timed = apply(
            &draft,
            Action::SetItemDuration {
                zone: ZoneKey::Full,
                url: "img".into(),
                seconds: 12,
            },
        );
        assert_eq!(timed.config.zone(ZoneKey::Full).unwrap().items[0].duration, Some(12));

        let rules = CompositionRules::default();
        let video = Action::SetItemDuration {
            zone: ZoneKey::Full,
            url: "vid".into(),
            seconds: 12,
        };
        assert!(matches!(
            reduce(&draft, &video, &rules),
            Err(CompositionError::UntimedItem { .. })
        ));
        let missing = Action::SetItemDuration {
            zone: ZoneKey::Full,
            url: "nope".into(),
            seconds: 12,
        };
        assert!(matches!(
            reduce(&draft, &missing, &rules),
            Err(CompositionError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn move_reorders_playlist() {
        let draft = apply(
            &Draft::new(),
            Action::AssignZoneItems {
                zone: ZoneKey::Full,
                items: items(&["A", "B", "C"]),
            },
        );
        let moved = apply(
            &draft,
            Action::MoveZoneItem {
                zone: ZoneKey::Full,
                from: 2,
                to: 0,
            },
        );
        assert_eq!(moved.config.zone(ZoneKey::Full).unwrap().items, items(&["C", "A", "B"]));

        let out_of_range = Action::MoveZoneItem {
            zone: ZoneKey::Full,
            from: 0,
            to: 3,
        };
        assert!(reduce(&draft, &out_of_range, &CompositionRules::default()).is_err());
    }

    #[test]
    fn toggle_target_flips_membership() {
        let draft = apply(&Draft::new(), Action::ToggleTarget("D1".into()));
        assert!(draft.targets.contains("D1"));
        let draft = apply(&draft, Action::ToggleTarget("D1".into()));
        assert!(draft.targets.is_empty());
    }

    #[test]
    fn reduce_does_not_touch_input() {
        let draft = Draft::new();
        let before = draft.clone();
        let _ = apply(&draft, Action::SetLayout(LayoutId::ThreeRow));
        assert_eq!(draft, before);
    }
}
