use super::*;

#[test]
fn defaults_are_valid() {
    let p = SimulationParameters::default();
    p.validate().unwrap();
    let g = p.geometry().unwrap();
    assert_eq!(g.max_radius(), 30.0);
    assert!((p.step_arc_length(&g) - 0.5 / 30.0).abs() < 1e-12);
    assert!(p.expand_opts().is_some());
}

#[test]
fn explicit_step_overrides_derived_one() {
    let p = SimulationParameters {
        step_arc_length: Some(0.02),
        ..SimulationParameters::default()
    };
    let g = p.geometry().unwrap();
    assert_eq!(p.step_arc_length(&g), 0.02);
}

#[test]
fn expansion_can_be_disabled() {
    let p = SimulationParameters {
        expand_sequences: false,
        ..SimulationParameters::default()
    };
    assert!(p.expand_opts().is_none());
}

#[test]
fn validate_rejects_bad_values() {
    let base = SimulationParameters::default();
    let cases = [
        SimulationParameters {
            ball_radius: 0,
            ..base.clone()
        },
        SimulationParameters {
            redistribution_rate: 0.75,
            ..base.clone()
        },
        SimulationParameters {
            redistribution_rate: 0.5,
            ..base.clone()
        },
        SimulationParameters {
            redistribution_rate: 0.0,
            ..base.clone()
        },
        SimulationParameters {
            relax_margin_factor: 1.0,
            ..base.clone()
        },
        SimulationParameters {
            initial_sand_depth: -1.0,
            ..base.clone()
        },
        SimulationParameters {
            max_relax_sweeps: 0,
            ..base.clone()
        },
        SimulationParameters {
            step_arc_length: Some(0.0),
            ..base.clone()
        },
        SimulationParameters {
            table_diameter: 30,
            ..base.clone()
        },
    ];
    for (i, p) in cases.iter().enumerate() {
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("validation error:"), "case {i}");
    }
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let dir = std::path::PathBuf::from("target").join("unit_sim_params");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("params.json");
    std::fs::write(
        &path,
        r#"{ "table_diameter": 200, "use_second_ball": true, "expand": { "max_theta_delta": 0.02 } }"#,
    )
    .unwrap();

    let p = SimulationParameters::from_json_file(&path).unwrap();
    assert_eq!(p.table_diameter, 200);
    assert!(p.use_second_ball);
    assert_eq!(p.ball_radius, 5);
    assert_eq!(p.expand.max_theta_delta, 0.02);
    assert_eq!(p.expand.max_rho_delta, 0.01);
}

#[test]
fn json_round_trips_through_serde() {
    let p = SimulationParameters {
        step_arc_length: Some(0.01),
        ..SimulationParameters::default()
    };
    let text = serde_json::to_string(&p).unwrap();
    let back: SimulationParameters = serde_json::from_str(&text).unwrap();
    assert_eq!(back, p);
}

#[test]
fn malformed_json_is_reported() {
    let dir = std::path::PathBuf::from("target").join("unit_sim_params");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = SimulationParameters::from_json_file(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}
