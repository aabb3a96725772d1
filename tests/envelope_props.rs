use envelope_monitor::{
    compute_margin, envelope_bounds, ArrayEnvelopeChecker, ArrayEnvelopeConfig,
    EnvelopeArrayStatus, EnvelopeChecker, EnvelopeConfig, EnvelopeStatus, MarginMode,
};
use proptest::prelude::*;

fn mode_strategy() -> impl Strategy<Value = MarginMode> {
    prop_oneof![Just(MarginMode::Absolute), Just(MarginMode::Percent)]
}

fn config_strategy() -> impl Strategy<Value = EnvelopeConfig<f64>> {
    (
        mode_strategy(),
        0.0f64..1e4,
        0.0f64..1e4,
        0.0f64..1e3,
        -1e5f64..1e5,
        0.0f64..1e5,
    )
        .prop_map(|(mode, up, down, min_margin, clamp_lo, width)| EnvelopeConfig {
            mode,
            margin_upper: up,
            margin_lower: down,
            min_margin,
            clamp_min: clamp_lo,
            clamp_max: clamp_lo + width,
            violation_timeout: 0.0,
        })
}

proptest! {
    #[test]
    fn absolute_margin_is_independent_of_reference(
        r in -1e6f64..1e6,
        m in 0.0f64..1e3,
        floor in 0.0f64..1e3,
    ) {
        let cfg = EnvelopeConfig::absolute(m, m).with_min_margin(floor);
        prop_assert_eq!(compute_margin(r, m, &cfg), m.max(floor));
    }

    #[test]
    fn percent_margin_scales_with_reference_magnitude(
        r in -1e4f64..1e4,
        p in 0.0f64..200.0,
        floor in 0.0f64..10.0,
    ) {
        let cfg = EnvelopeConfig::percent(p, p).with_min_margin(floor);
        let expected = (r.abs() * p / 100.0).max(floor);
        prop_assert!((compute_margin(r, p, &cfg) - expected).abs() <= 1e-9 * expected.max(1.0));

        let unfloored = EnvelopeConfig::percent(p, p);
        let single = compute_margin(r, p, &unfloored);
        let doubled = compute_margin(2.0 * r, p, &unfloored);
        prop_assert!((doubled - 2.0 * single).abs() <= 1e-9 * single.max(1.0));
    }

    #[test]
    fn clamp_bounds_are_never_exceeded(
        cfg in config_strategy(),
        r in -1e6f64..1e6,
    ) {
        let b = envelope_bounds(r, &cfg);
        prop_assert!(b.lower >= cfg.clamp_min, "lower={} clamp_min={}", b.lower, cfg.clamp_min);
        prop_assert!(b.upper <= cfg.clamp_max, "upper={} clamp_max={}", b.upper, cfg.clamp_max);
    }

    #[test]
    fn scalar_check_is_idempotent(
        cfg in config_strategy(),
        r in -1e4f64..1e4,
        v in -1e5f64..1e5,
    ) {
        let mut c = EnvelopeChecker::new(cfg);
        c.set_reference(r);
        let first = c.check(v);
        let second = c.check(v);
        prop_assert_eq!(first, second);
        prop_assert_eq!(c.status(), first);
    }

    #[test]
    fn ok_check_restarts_timer_accumulation(
        dts in prop::collection::vec(0.0f64..10.0, 1..20),
        next_dt in 0.0f64..10.0,
    ) {
        let cfg = EnvelopeConfig::absolute(1.0, 1.0).with_violation_timeout(1e9);
        let mut c = EnvelopeChecker::new(cfg);
        c.set_reference(0.0);
        c.check(50.0);
        for dt in dts {
            c.update(dt);
        }

        prop_assert_eq!(c.check(0.0), EnvelopeStatus::Ok);
        c.update(next_dt);
        prop_assert_eq!(c.violation_timer(), 0.0);

        c.check(-50.0);
        c.update(next_dt);
        prop_assert_eq!(c.violation_timer(), next_dt);
    }

    #[test]
    fn array_status_agrees_with_failed_indices(
        pairs in prop::collection::vec((-100.0f64..100.0, -120.0f64..120.0), 1..64),
        ratio in 0.0f64..=1.0,
        cfg in config_strategy(),
    ) {
        let mut reference: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let sample: Vec<f64> = pairs.iter().map(|p| p.1).collect();
        let n = sample.len();

        let mut c = ArrayEnvelopeChecker::new(ArrayEnvelopeConfig::new(cfg, ratio));
        c.bind_reference_buffer(&mut reference);
        let status = c.check(&sample);
        let (above, below) = c.counts();
        let failed = c.failed_bin_indices(&sample).unwrap();

        prop_assert_eq!(failed.len(), above + below);
        prop_assert!(failed.windows(2).all(|w| w[0] < w[1]));

        let fail_ratio = (above + below) as f64 / n as f64;
        match status {
            EnvelopeArrayStatus::Ok => prop_assert!(fail_ratio <= ratio),
            EnvelopeArrayStatus::AnyAboveUpperLimit => {
                prop_assert!(fail_ratio > ratio);
                prop_assert!(above >= below);
            }
            EnvelopeArrayStatus::AnyBelowLowerLimit => {
                prop_assert!(fail_ratio > ratio);
                prop_assert!(below > above);
            }
            other => prop_assert!(false, "unexpected status {other:?}"),
        }

        let (ra, rb) = c.failure_ratio();
        prop_assert!((ra + rb - fail_ratio).abs() <= 1e-12);
    }

    #[test]
    fn array_envelope_matches_scalar_bounds(
        refs in prop::collection::vec(-1e3f64..1e3, 1..32),
        cfg in config_strategy(),
    ) {
        let mut reference = refs.clone();
        let c = {
            let mut c = ArrayEnvelopeChecker::new(ArrayEnvelopeConfig::new(cfg, 0.0));
            c.bind_reference_buffer(&mut reference);
            c
        };
        let mut hi = vec![0.0; refs.len()];
        let mut lo = vec![0.0; refs.len()];
        c.envelope(&mut hi, &mut lo).unwrap();

        for (i, &r) in refs.iter().enumerate() {
            let mut s = EnvelopeChecker::new(cfg);
            s.set_reference(r);
            prop_assert_eq!(s.envelope_bounds(), (lo[i], hi[i]));
        }
    }
}
