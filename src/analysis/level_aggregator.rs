use crate::domain::LevelError;
use crate::models::{Fractal, FractalKind, Level, LevelSide, Representative};

#[allow(unused_imports)]
use crate::config::DEBUG_FLAGS;

/// Clusters fractal prices into levels, using the running mean as the
/// reported price. See `aggregate_with`.
pub fn aggregate(fractals: &[Fractal], tolerance: f64) -> Result<Vec<Level>, LevelError> {
    aggregate_with(fractals, tolerance, Representative::Mean)
}

/// Clusters fractal prices into levels.
///
/// 1. Splits fractals by kind: highs feed resistance, lows feed support. The
///    two sides never share a level.
/// 2. Sorts each side's prices ascending.
/// 3. Sweeps once: a price further than `tolerance` above the running mean of
///    the open cluster starts a new cluster, otherwise it joins and the mean
///    is updated.
///
/// Greedy and order-dependent, but the order is always ascending price, so
/// the same fractals always give the same levels. Single-member levels are
/// kept. Output is support levels then resistance levels, each ascending by
/// price.
pub fn aggregate_with(
    fractals: &[Fractal],
    tolerance: f64,
    representative: Representative,
) -> Result<Vec<Level>, LevelError> {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(LevelError::InvalidTolerance(tolerance));
    }

    let mut levels = Vec::new();
    for kind in [FractalKind::Low, FractalKind::High] {
        let mut members: Vec<(f64, usize)> = fractals
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| (f.price, f.index))
            .collect();
        members.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        levels.extend(cluster_side(&members, tolerance, kind.into(), representative));
    }

    Ok(levels)
}

/// `members` must already be sorted ascending by price
fn cluster_side(
    members: &[(f64, usize)],
    tolerance: f64,
    side: LevelSide,
    representative: Representative,
) -> Vec<Level> {
    if members.is_empty() {
        return Vec::new();
    }

    let mut levels = Vec::new();

    // Helper to finalize a cluster
    let mut finalize_cluster = |cluster: &[(f64, usize)]| {
        let member_prices: Vec<f64> = cluster.iter().map(|m| m.0).collect();
        let member_indices: Vec<usize> = cluster.iter().map(|m| m.1).collect();
        let level = Level {
            price: representative.of(&member_prices),
            side,
            strength: member_prices.len(),
            member_prices,
            member_indices,
        };

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_level_clusters {
            log::info!("Closed cluster: {}", level);
        }

        levels.push(level);
    };

    let mut cluster_start = 0;
    let mut running_sum = members[0].0;

    for (i, &(price, _)) in members.iter().enumerate().skip(1) {
        let cluster_len = (i - cluster_start) as f64;
        let running_mean = running_sum / cluster_len;

        if price - running_mean > tolerance {
            finalize_cluster(&members[cluster_start..i]);
            cluster_start = i;
            running_sum = price;
        } else {
            running_sum += price;
        }
    }

    // Finalize the last cluster
    finalize_cluster(&members[cluster_start..]);

    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fractal(index: usize, kind: FractalKind, price: f64) -> Fractal {
        Fractal {
            index,
            timestamp_ms: index as i64,
            kind,
            price,
        }
    }

    fn highs(prices: &[f64]) -> Vec<Fractal> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| fractal(i, FractalKind::High, p))
            .collect()
    }

    #[test]
    fn test_three_price_scenario() {
        let levels = aggregate(&highs(&[100.0, 100.4, 105.0]), 1.0).unwrap();

        assert_eq!(levels.len(), 2);
        assert!((levels[0].price - 100.2).abs() < 1e-9);
        assert_eq!(levels[0].strength, 2);
        assert_eq!(levels[0].member_prices, vec![100.0, 100.4]);
        assert_eq!(levels[1].price, 105.0);
        assert_eq!(levels[1].strength, 1);
        assert!(levels.iter().all(|l| l.side == LevelSide::Resistance));
    }

    #[test]
    fn test_sides_never_merge() {
        let fractals = vec![
            fractal(2, FractalKind::High, 50.0),
            fractal(5, FractalKind::Low, 50.0),
        ];
        let levels = aggregate(&fractals, 5.0).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].side, LevelSide::Support);
        assert_eq!(levels[1].side, LevelSide::Resistance);
        assert_eq!(levels[0].member_indices, vec![5]);
    }

    #[test]
    fn test_gap_measured_from_running_mean() {
        // 11 is exactly 1.0 above 10 and joins; 11.6 is 1.1 above the new mean of 10.5
        let levels = aggregate(&highs(&[10.0, 11.0, 11.6]), 1.0).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].member_prices, vec![10.0, 11.0]);
        assert_eq!(levels[1].member_prices, vec![11.6]);
    }

    #[test]
    fn test_unsorted_input_and_duplicates() {
        let a = aggregate(&highs(&[105.0, 100.0, 100.0, 100.4]), 1.0).unwrap();
        let b = aggregate(&highs(&[100.0, 100.4, 100.0, 105.0]), 1.0).unwrap();
        let strengths = |ls: &[Level]| ls.iter().map(|l| (l.strength, l.price)).collect::<Vec<_>>();
        assert_eq!(strengths(&a), strengths(&b));
        assert_eq!(a[0].strength, 3);
    }

    #[test]
    fn test_median_representative() {
        let levels =
            aggregate_with(&highs(&[100.0, 100.1, 101.0]), 1.0, Representative::Median).unwrap();
        assert_eq!(levels.len(), 1);
        assert!((levels[0].price - 100.1).abs() < 1e-9);
    }

    #[test]
    fn test_empty_and_invalid_tolerance() {
        assert!(aggregate(&[], 1.0).unwrap().is_empty());
        assert_eq!(
            aggregate(&highs(&[1.0]), 0.0),
            Err(LevelError::InvalidTolerance(0.0))
        );
        assert!(aggregate(&highs(&[1.0]), -2.0).is_err());
        assert!(aggregate(&highs(&[1.0]), f64::NAN).is_err());
    }

    #[test]
    fn test_strength_matches_members() {
        let levels = aggregate(&highs(&[1.0, 1.2, 1.4, 3.0, 3.1, 8.0]), 0.5).unwrap();
        for level in &levels {
            assert!(!level.member_prices.is_empty());
            assert_eq!(level.strength, level.member_prices.len());
            assert_eq!(level.strength, level.member_indices.len());
        }
        assert_eq!(levels.iter().map(|l| l.strength).sum::<usize>(), 6);
    }
}
