//! Converting drag-resize measurements into zone percentages.
//!
//! Raw panel sizes only carry meaning as ratios. They are scaled to
//! percentages, optionally snapped to a grid, and the rounding residual is
//! folded into the largest zone so the result always sums to exactly 100.
//!
//! All arithmetic after scaling happens in integer tenths of a percent,
//! the precision of the formatted output.

use crate::models::{ZoneKey, ZoneSizes};

use super::{LayoutError, LayoutResult};

/// Default snapping grid, in percent.
pub const DEFAULT_SNAP_STEP: f64 = 0.5;

/// Tenths of a percent in a whole screen.
const FULL_TENTHS: i64 = 1000;

/// Normalize raw sizes into formatted percentages keyed by zone.
///
/// `snap` should be true only once the operator has manually resized in
/// the current session; it snaps to [`DEFAULT_SNAP_STEP`].
pub fn normalize(raw_sizes: &[f64], zone_keys: &[ZoneKey], snap: bool) -> LayoutResult<ZoneSizes> {
    let step = snap.then_some(DEFAULT_SNAP_STEP);
    normalize_with_step(raw_sizes, zone_keys, step)
}

/// Like [`normalize`], with an explicit snapping grid (`None` disables it).
pub fn normalize_with_step(
    raw_sizes: &[f64],
    zone_keys: &[ZoneKey],
    snap_step: Option<f64>,
) -> LayoutResult<ZoneSizes> {
    if raw_sizes.len() != zone_keys.len() {
        return Err(LayoutError::SizeCountMismatch {
            expected: zone_keys.len(),
            found: raw_sizes.len(),
        });
    }

    let tenths = normalize_tenths(raw_sizes, snap_step)?;
    Ok(zone_keys
        .iter()
        .zip(tenths)
        .map(|(key, t)| (*key, format_tenths(t)))
        .collect())
}

/// Core of the normalizer: percentages in tenths, summing to exactly 1000.
pub fn normalize_tenths(raw_sizes: &[f64], snap_step: Option<f64>) -> LayoutResult<Vec<i64>> {
    if let Some((index, value)) = raw_sizes
        .iter()
        .copied()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || *v < 0.0)
    {
        return Err(LayoutError::InvalidSize { index, value });
    }

    // Scale by the largest size first so the sum cannot overflow.
    let largest = raw_sizes.iter().copied().fold(0.0_f64, f64::max);
    if largest <= 0.0 {
        return Err(LayoutError::DegenerateSizes);
    }
    let scaled: Vec<f64> = raw_sizes.iter().map(|size| size / largest).collect();
    let total: f64 = scaled.iter().sum();

    // Grid size in tenths; unsnapped output rounds to the display precision.
    let grid = snap_step
        .map(|step| (step * 10.0).round() as i64)
        .unwrap_or(1)
        .max(1);

    let mut tenths: Vec<i64> = scaled
        .iter()
        .map(|size| {
            let percent = size / total * 100.0;
            (percent * 10.0 / grid as f64).round() as i64 * grid
        })
        .collect();

    let residual = FULL_TENTHS - tenths.iter().sum::<i64>();
    if residual != 0 {
        let largest = largest_index(&tenths);
        tenths[largest] += residual;
        tracing::trace!(residual, zone = largest, "Folded rounding residual into largest zone");
    }

    Ok(tenths)
}

/// Index of the first maximum.
fn largest_index(values: &[i64]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = i;
        }
    }
    best
}

/// Format tenths of a percent as `"33.5%"`.
fn format_tenths(tenths: i64) -> String {
    let sign = if tenths < 0 { "-" } else { "" };
    let abs = tenths.abs();
    format!("{}{}.{}%", sign, abs / 10, abs % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_percent;

    const THREE: [ZoneKey; 3] = [ZoneKey::Top, ZoneKey::Middle, ZoneKey::Bottom];

    #[test]
    fn equal_thirds_sum_to_exactly_100() {
        let tenths = normalize_tenths(&[1.0, 1.0, 1.0], None).unwrap();
        assert_eq!(tenths.iter().sum::<i64>(), 1000);
        // Residual lands on the first of the tied largest zones.
        assert_eq!(tenths, vec![334, 333, 333]);

        let sizes = normalize(&[1.0, 1.0, 1.0], &THREE, false).unwrap();
        assert_eq!(sizes.get(ZoneKey::Top), Some("33.4%"));
        assert_eq!(sizes.get(ZoneKey::Middle), Some("33.3%"));
    }

    #[test]
    fn only_ratios_matter() {
        let small = normalize(&[1.0, 3.0], &[ZoneKey::Left, ZoneKey::Right], true).unwrap();
        let large = normalize(&[250.0, 750.0], &[ZoneKey::Left, ZoneKey::Right], true).unwrap();
        assert_eq!(small, large);
        assert_eq!(small.get(ZoneKey::Left), Some("25.0%"));
        assert_eq!(small.get(ZoneKey::Right), Some("75.0%"));
    }

    #[test]
    fn snapped_values_are_half_percent_multiples() {
        let inputs: [&[f64]; 5] = [
            &[1.0, 1.0, 1.0],
            &[33.33, 33.33, 33.34],
            &[12.7, 40.1, 47.2],
            &[0.3, 0.3, 99.4],
            &[7.0, 11.0, 13.0],
        ];
        for raw in inputs {
            let tenths = normalize_tenths(raw, Some(0.5)).unwrap();
            assert_eq!(tenths.iter().sum::<i64>(), 1000, "{:?}", raw);
            let off_grid = tenths.iter().filter(|t| *t % 5 != 0).count();
            assert!(off_grid <= 1, "{:?} -> {:?}", raw, tenths);
        }
    }

    #[test]
    fn snapping_moves_residual_to_largest() {
        // 30.3 / 30.3 / 39.4 snap to 30.5 / 30.5 / 39.5 = 100.5
        let tenths = normalize_tenths(&[30.3, 30.3, 39.4], Some(0.5)).unwrap();
        assert_eq!(tenths, vec![305, 305, 390]);
    }

    #[test]
    fn formatted_output_parses_back_to_100() {
        let sizes = normalize(&[12.7, 40.1, 47.2], &THREE, true).unwrap();
        let total: f64 = THREE
            .iter()
            .map(|k| parse_percent(sizes.get(*k).unwrap()).unwrap())
            .sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn huge_sizes_keep_their_ratios() {
        let keys = [ZoneKey::Left, ZoneKey::Right];
        let even = normalize(&[f64::MAX, f64::MAX], &keys, false).unwrap();
        assert_eq!(even.get(ZoneKey::Left), Some("50.0%"));
        assert_eq!(even.get(ZoneKey::Right), Some("50.0%"));

        let skewed = normalize_tenths(&[f64::MAX / 4.0, f64::MAX / 4.0 * 3.0], None).unwrap();
        assert_eq!(skewed, vec![250, 750]);

        let tiny = normalize_tenths(&[f64::MIN_POSITIVE, f64::MIN_POSITIVE], Some(0.5)).unwrap();
        assert_eq!(tiny, vec![500, 500]);
    }

    #[test]
    fn rejects_degenerate_input() {
        assert_eq!(
            normalize_tenths(&[0.0, 0.0], None),
            Err(LayoutError::DegenerateSizes)
        );
        assert_eq!(normalize_tenths(&[], None), Err(LayoutError::DegenerateSizes));
        assert!(matches!(
            normalize_tenths(&[1.0, -2.0], None),
            Err(LayoutError::InvalidSize { index: 1, .. })
        ));
        assert!(matches!(
            normalize_tenths(&[f64::NAN, 1.0], None),
            Err(LayoutError::InvalidSize { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = normalize(&[1.0, 1.0], &THREE, false).unwrap_err();
        assert_eq!(
            err,
            LayoutError::SizeCountMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn format_tenths_pads_single_digit() {
        assert_eq!(format_tenths(5), "0.5%");
        assert_eq!(format_tenths(1000), "100.0%");
    }
}
