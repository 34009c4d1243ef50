use fractal_levels::analysis::{aggregate, detect, select_all, select_global};
use fractal_levels::models::{Fractal, FractalKind, LevelSide};
use fractal_levels::utils::TimeUtils;
use fractal_levels::{Bar, BarSeries, LevelMode, LevelParams, LevelResult, SymbolInterval, compute_levels};
use proptest::prelude::*;

fn arb_bar() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    // low, span, open and close as fractions of the span
    (1.0f64..100.0, 0.01f64..10.0, 0.0f64..=1.0, 0.0f64..=1.0)
}

fn series_from(raw: &[(f64, f64, f64, f64)]) -> BarSeries {
    let bars: Vec<Bar> = raw
        .iter()
        .enumerate()
        .map(|(i, &(low, span, o, c))| {
            let high = low + span;
            let open = (low + o * span).clamp(low, high);
            let close = (low + c * span).clamp(low, high);
            Bar::new(i as i64 * TimeUtils::MS_IN_D, open, high, low, close)
        })
        .collect();
    BarSeries::new(SymbolInterval::new("PROP", TimeUtils::MS_IN_D), &bars).unwrap()
}

fn arb_series(len: std::ops::Range<usize>) -> impl Strategy<Value = BarSeries> {
    proptest::collection::vec(arb_bar(), len).prop_map(|raw| series_from(&raw))
}

fn arb_fractal() -> impl Strategy<Value = Fractal> {
    (0usize..500, prop::bool::ANY, 50.0f64..60.0).prop_map(|(index, high, price)| Fractal {
        index,
        timestamp_ms: index as i64,
        kind: if high { FractalKind::High } else { FractalKind::Low },
        price,
    })
}

proptest! {
    #[test]
    fn short_series_has_no_fractals(window in 1usize..6, raw in proptest::collection::vec(arb_bar(), 1..11)) {
        prop_assume!(raw.len() < 2 * window + 1);
        let series = series_from(&raw);
        prop_assert!(detect(&series, window).unwrap().is_empty());
    }

    #[test]
    fn fractals_strictly_dominate_their_window(window in 1usize..4, series in arb_series(1..80)) {
        let fractals = detect(&series, window).unwrap();
        prop_assert!(fractals.windows(2).all(|w| w[0].index <= w[1].index));

        for f in &fractals {
            prop_assert!(f.index >= window && f.index + window < series.len());
            for j in f.index - window..=f.index + window {
                if j == f.index {
                    continue;
                }
                match f.kind {
                    FractalKind::High => prop_assert!(series.high_prices[j] < f.price),
                    FractalKind::Low => prop_assert!(series.low_prices[j] > f.price),
                }
            }
        }
    }

    #[test]
    fn duplicate_order_does_not_change_levels(
        fractals in proptest::collection::vec(arb_fractal(), 1..60),
        tolerance in 0.05f64..3.0,
    ) {
        let mut doubled = fractals.clone();
        doubled.extend(fractals.iter().copied());
        let mut reversed = doubled.clone();
        reversed.reverse();

        let a = aggregate(&doubled, tolerance).unwrap();
        let b = aggregate(&reversed, tolerance).unwrap();
        prop_assert_eq!(&a, &b);

        let total: usize = a.iter().map(|l| l.strength).sum();
        prop_assert_eq!(total, doubled.len());
    }

    #[test]
    fn reaggregating_members_reproduces_levels(
        fractals in proptest::collection::vec(arb_fractal(), 1..60),
        tolerance in 0.05f64..3.0,
    ) {
        let levels = aggregate(&fractals, tolerance).unwrap();
        let members: Vec<Fractal> = levels
            .iter()
            .flat_map(|level| {
                let kind = match level.side {
                    LevelSide::Resistance => FractalKind::High,
                    LevelSide::Support => FractalKind::Low,
                };
                level
                    .member_prices
                    .iter()
                    .zip(level.member_indices.iter())
                    .map(move |(&price, &index)| Fractal { index, timestamp_ms: index as i64, kind, price })
            })
            .collect();

        prop_assert_eq!(aggregate(&members, tolerance).unwrap(), levels);
    }

    #[test]
    fn global_pick_is_strongest_on_its_side(
        fractals in proptest::collection::vec(arb_fractal(), 0..60),
        tolerance in 0.05f64..3.0,
        last_close in 45.0f64..65.0,
    ) {
        let levels = aggregate(&fractals, tolerance).unwrap();
        let global = select_global(&levels, last_close);

        for (picked, side) in [
            (&global.strongest_support, LevelSide::Support),
            (&global.strongest_resistance, LevelSide::Resistance),
        ] {
            let on_side: Vec<_> = levels.iter().filter(|l| l.side == side).collect();
            match picked {
                Some(level) => {
                    prop_assert_eq!(level.side, side);
                    prop_assert!(on_side.iter().all(|l| level.strength >= l.strength));
                }
                None => prop_assert!(on_side.is_empty()),
            }
        }

        let ranked = select_all(&levels);
        prop_assert_eq!(ranked.len(), levels.len());
        prop_assert!(ranked.windows(2).all(|w| w[0].strength >= w[1].strength));
    }

    #[test]
    fn rising_series_has_no_resistance(start in 10.0f64..100.0, step in 0.1f64..5.0, len in 5usize..60) {
        let bars: Vec<Bar> = (0..len)
            .map(|i| {
                let low = start + i as f64 * step;
                Bar::new(i as i64 * TimeUtils::MS_IN_D, low + 0.2, low + 1.0, low, low + 0.8)
            })
            .collect();
        let series = BarSeries::new(SymbolInterval::new("UP", TimeUtils::MS_IN_D), &bars).unwrap();
        let params = LevelParams { mode: LevelMode::Global, ..LevelParams::default() };

        match compute_levels(&series, &params).unwrap() {
            LevelResult::Global(global) => prop_assert!(global.strongest_resistance.is_none()),
            other => prop_assert!(false, "unexpected result {:?}", other),
        }
    }
}
