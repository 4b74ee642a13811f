use super::*;

fn coarse() -> ExpandOpts {
    ExpandOpts {
        max_theta_delta: 0.1,
        max_rho_delta: 0.01,
        ..ExpandOpts::default()
    }
}

fn p(theta: f64, rho: f64) -> PolarPosition {
    PolarPosition::new(theta, rho)
}

#[test]
fn empty_input_gives_empty_output() {
    assert!(expand_sequence(&[], &coarse()).is_empty());
}

#[test]
fn single_point_is_kept() {
    assert_eq!(expand_sequence(&[p(1.0, 2.0)], &coarse()), vec![p(1.0, 2.0)]);
}

#[test]
fn radial_step_is_left_alone() {
    let input = [p(1.0, 2.0), p(1.0, 2.02)];
    let out = expand_sequence(&input, &coarse());
    assert_eq!(out, input.to_vec());
}

#[test]
fn arc_is_subdivided_within_theta_threshold() {
    let input = [p(0.0, 1.0), p(2.0, 1.0)];
    let opts = coarse();
    let out = expand_sequence(&input, &opts);

    assert!(out.len() > input.len());
    assert_eq!(out.first(), Some(&p(0.0, 1.0)));
    assert_eq!(out.last(), Some(&p(2.0, 1.0)));
    for w in out.windows(2) {
        let d_theta = (w[1].theta - w[0].theta).abs();
        assert!(d_theta <= opts.max_theta_delta + 1e-9, "step {d_theta}");
        assert!(w[1].theta > w[0].theta, "no duplicate or backwards points");
        assert_eq!(w[1].rho, 1.0);
    }
}

#[test]
fn spiral_segment_respects_both_thresholds() {
    let opts = coarse();
    let out = expand_sequence(&[p(0.0, 0.0), p(0.5, 1.0)], &opts);
    assert_eq!(out.len(), 101);
    for w in out.windows(2) {
        assert!((w[1].theta - w[0].theta).abs() <= opts.max_theta_delta + 1e-9);
        assert!((w[1].rho - w[0].rho).abs() <= opts.max_rho_delta + 1e-9);
    }
}

#[test]
fn centre_rotation_is_subdivided() {
    let out = expand_sequence(&[p(0.0, 0.0), p(3.14, 0.0)], &coarse());
    assert!(out.len() > 2);
    assert_eq!(out.first(), Some(&p(0.0, 0.0)));
    assert_eq!(out.last(), Some(&p(3.14, 0.0)));
}

#[test]
fn small_steps_pass_through() {
    let input = [p(0.0, 0.5), p(0.05, 0.505), p(0.1, 0.51)];
    assert_eq!(expand_sequence(&input, &coarse()), input.to_vec());
}

#[test]
fn segment_points_guards_single_point() {
    let opts = coarse();
    assert_eq!(opts.segment_points(p(0.0, 0.3), p(0.0, 0.9)), 1);
    assert_eq!(opts.segment_points(p(0.0, 0.3), p(0.05, 0.3)), 1);
    assert_eq!(opts.segment_points(p(0.0, 0.3), p(0.35, 0.3)), 4);
}

#[test]
fn validate_rejects_non_positive_thresholds() {
    assert!(ExpandOpts::default().validate().is_ok());
    let bad = ExpandOpts {
        max_theta_delta: 0.0,
        ..ExpandOpts::default()
    };
    assert!(bad.validate().is_err());
    let bad = ExpandOpts {
        max_rho_delta: -1.0,
        ..ExpandOpts::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn cleaning_track_spirals_out_then_laps_the_rim() {
    let track = build_cleaning_track(CLEANING_TURNS);
    assert_eq!(track.len(), 3);
    assert_eq!(track[0], PolarPosition::ORIGIN);
    assert_eq!(track[1], p(200.0 * PI, 1.0));
    assert_eq!(track[2], p(202.0 * PI, 1.0));
}
