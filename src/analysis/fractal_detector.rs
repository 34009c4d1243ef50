use crate::domain::LevelError;
use crate::models::{BarSeries, Fractal, FractalKind};

#[allow(unused_imports)]
use crate::config::DEBUG_FLAGS;

/// Finds fractals: bars whose high (or low) strictly beats every bar within
/// `window` positions on both sides.
///
/// Bars closer than `window` to either end of the series have too few
/// neighbours and are skipped. Equal neighbours disqualify a bar, so a flat
/// top of two equal highs produces no fractal at all.
///
/// Output is ascending by index. A bar that qualifies on both sides (an
/// outside bar engulfing all its neighbours) yields a `High` record followed
/// by a `Low` one.
pub fn detect(series: &BarSeries, window: usize) -> Result<Vec<Fractal>, LevelError> {
    if window == 0 {
        return Err(LevelError::InvalidWindow { window, min: 1 });
    }

    let n = series.len();
    if n < 2 * window + 1 {
        return Ok(Vec::new());
    }

    let highs = &series.high_prices;
    let lows = &series.low_prices;
    let mut fractals = Vec::new();

    for i in window..n - window {
        let neighbours = (i - window..i).chain(i + 1..=i + window);

        let is_high = neighbours.clone().all(|j| highs[i] > highs[j]);
        let is_low = neighbours.clone().all(|j| lows[i] < lows[j]);

        if is_high {
            fractals.push(Fractal {
                index: i,
                timestamp_ms: series.timestamps_ms[i],
                kind: FractalKind::High,
                price: highs[i],
            });
        }
        if is_low {
            fractals.push(Fractal {
                index: i,
                timestamp_ms: series.timestamps_ms[i],
                kind: FractalKind::Low,
                price: lows[i],
            });
        }
    }

    #[cfg(debug_assertions)]
    if DEBUG_FLAGS.print_fractal_scan {
        let highs_found = fractals.iter().filter(|f| f.is_high()).count();
        log::info!(
            "Fractal scan for {}: {} bars, window {} → {} high / {} low",
            series.symbol_interval,
            n,
            window,
            highs_found,
            fractals.len() - highs_found
        );
    }

    Ok(fractals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, SymbolInterval};

    /// Bars from (high, low) pairs, open/close pinned to the low
    fn series_from(hl: &[(f64, f64)]) -> BarSeries {
        let bars: Vec<Bar> = hl
            .iter()
            .enumerate()
            .map(|(i, &(h, l))| Bar::new(i as i64, l, h, l, l))
            .collect();
        BarSeries::new(SymbolInterval::new("TEST", 1), &bars).unwrap()
    }

    #[test]
    fn test_five_bar_scenario() {
        let series = series_from(&[(10.0, 9.0), (12.0, 10.0), (9.0, 8.0), (13.0, 11.0), (8.0, 7.0)]);
        let fractals = detect(&series, 1).unwrap();

        let summary: Vec<(usize, FractalKind, f64)> =
            fractals.iter().map(|f| (f.index, f.kind, f.price)).collect();
        assert_eq!(
            summary,
            vec![
                (1, FractalKind::High, 12.0),
                (2, FractalKind::Low, 8.0),
                (3, FractalKind::High, 13.0),
            ]
        );
        // The last bar's low of 7 has no right neighbour
        assert!(fractals.iter().all(|f| f.index != 4));
    }

    #[test]
    fn test_short_series_is_empty_not_error() {
        let series = series_from(&[(10.0, 9.0), (12.0, 10.0), (9.0, 8.0), (8.0, 7.0)]);
        assert!(detect(&series, 2).unwrap().is_empty());
    }

    #[test]
    fn test_ties_disqualify() {
        let series = series_from(&[
            (10.0, 5.0),
            (11.0, 5.5),
            (12.0, 6.0),
            (12.0, 6.0),
            (11.0, 5.5),
            (10.0, 5.0),
        ]);
        let fractals = detect(&series, 1).unwrap();
        assert!(fractals.iter().all(|f| f.kind != FractalKind::High));
    }

    #[test]
    fn test_outside_bar_reports_both_kinds() {
        let series = series_from(&[(5.0, 5.0), (5.5, 5.5), (9.0, 3.0), (5.5, 5.5), (5.0, 5.0)]);
        let fractals = detect(&series, 1).unwrap();
        let kinds: Vec<(usize, FractalKind)> = fractals.iter().map(|f| (f.index, f.kind)).collect();
        assert_eq!(kinds, vec![(2, FractalKind::High), (2, FractalKind::Low)]);
        assert_eq!(fractals[0].price, 9.0);
        assert_eq!(fractals[1].price, 3.0);
    }

    #[test]
    fn test_window_zero_rejected() {
        let series = series_from(&[(10.0, 9.0)]);
        assert!(matches!(
            detect(&series, 0),
            Err(LevelError::InvalidWindow { window: 0, .. })
        ));
    }
}
