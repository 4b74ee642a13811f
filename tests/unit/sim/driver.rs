use std::f64::consts::PI;
use std::sync::{Arc, Mutex};

use super::*;
use crate::foundation::error::SandError;

#[derive(Debug, Default)]
struct Log {
    config: Option<SinkConfig>,
    frames: Vec<u64>,
    ended: bool,
}

#[derive(Clone, Debug, Default)]
struct Recorder(Arc<Mutex<Log>>);

impl FrameSink for Recorder {
    fn begin(&mut self, cfg: SinkConfig) -> SandResult<()> {
        self.0.lock().unwrap().config = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SandResult<()> {
        let mut log = self.0.lock().unwrap();
        let cfg = log.config.clone().unwrap();
        assert_eq!((frame.width, frame.height), (cfg.width, cfg.height));
        log.frames.push(idx.0);
        Ok(())
    }

    fn end(&mut self) -> SandResult<()> {
        self.0.lock().unwrap().ended = true;
        Ok(())
    }
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9 * b.abs().max(1.0), "{a} != {b}");
}

fn radial_track(n: usize) -> Vec<PolarPosition> {
    (0..n)
        .map(|i| PolarPosition::new(0.0, i as f64 / n as f64 * 0.5))
        .collect()
}

#[test]
fn single_ball_starts_at_the_centre() {
    let sim = Simulation::new(SimulationParameters::default()).unwrap();
    assert_eq!(sim.balls().len(), 1);
    assert_eq!(sim.primary().name(), PRIMARY_BALL);
    assert_eq!(sim.primary().position(), PolarPosition::ORIGIN);
    assert!(sim.at_target());
    assert!((sim.step() - 0.5 / 30.0).abs() < 1e-12);
}

#[test]
fn second_ball_is_smaller_and_mirrored() {
    let params = SimulationParameters {
        use_second_ball: true,
        ..SimulationParameters::default()
    };
    let mut sim = Simulation::new(params).unwrap();
    let second = &sim.balls()[1];
    assert_eq!(second.name(), SECONDARY_BALL);
    assert_eq!(second.radius(), 4);
    assert_eq!(second.position(), PolarPosition::new(PI, 1.0));

    sim.set_target(PolarPosition::new(0.5, 0.25));
    let second = &sim.balls()[1];
    assert!((second.target().theta - (0.5 + PI)).abs() < 1e-12);
    assert!((second.target().rho - 0.75).abs() < 1e-12);
}

#[test]
fn tiny_second_ball_keeps_a_radius_of_one() {
    let params = SimulationParameters {
        use_second_ball: true,
        ball_radius: 1,
        ..SimulationParameters::default()
    };
    let sim = Simulation::new(params).unwrap();
    assert_eq!(sim.balls()[1].radius(), 1);
}

#[test]
fn move_to_ticks_until_arrival_and_keeps_mass() {
    let mut sim = Simulation::new(SimulationParameters::default()).unwrap();
    let before = sim.grid().total_mass();
    let report = sim.move_to(PolarPosition::new(0.0, 0.5)).unwrap();

    assert!(report.ticks > 20, "{report:?}");
    assert!(report.max_sweeps >= 1);
    assert!(sim.at_target());
    assert_eq!(sim.primary().position(), PolarPosition::new(0.0, 0.5));
    assert_close(sim.grid().total_mass(), before);
    assert!(sim.grid().heights().iter().all(|h| *h >= 0.0));
}

#[test]
fn ball_leaves_troughs_and_ridges() {
    let mut sim = Simulation::new(SimulationParameters::default()).unwrap();
    sim.move_to(PolarPosition::new(0.0, 0.5)).unwrap();
    let heights = sim.grid().heights();
    let lowest = heights.iter().copied().fold(f64::INFINITY, f64::min);
    let highest = heights.iter().copied().fold(0.0, f64::max);
    assert!(lowest < 2.0, "{lowest}");
    assert!(highest > 2.0, "{highest}");
}

#[test]
fn two_ball_waypoint_waits_for_both() {
    let params = SimulationParameters {
        use_second_ball: true,
        ..SimulationParameters::default()
    };
    let mut sim = Simulation::new(params).unwrap();
    sim.place(PolarPosition::new(0.0, 0.0));
    sim.move_to(PolarPosition::new(0.0, 0.3)).unwrap();
    assert!(sim.balls().iter().all(|b| b.at_target()));
    assert_eq!(sim.balls()[1].position(), mirror(PolarPosition::new(0.0, 0.3)));
}

#[test]
fn run_track_pushes_frames_on_cadence() {
    let mut sim = Simulation::new(SimulationParameters::default()).unwrap();
    let recorder = Recorder::default();
    let mut sinks: Vec<Box<dyn FrameSink>> = vec![Box::new(recorder.clone())];
    let render = RenderOptions {
        image_skip_count: 3,
        ..RenderOptions::default()
    };

    let track = radial_track(10);
    let stats = sim.run_track("radial", &track, &render, &mut sinks).unwrap();

    assert_eq!(stats.waypoints, 10);
    assert_eq!(stats.frames, 4);
    assert!(stats.ticks > 0);
    let log = recorder.0.lock().unwrap();
    assert_eq!(log.frames, vec![0, 1, 2, 3]);
    assert!(log.ended);
    let cfg = log.config.clone().unwrap();
    assert_eq!((cfg.width, cfg.height), (100, 100));
}

#[test]
fn run_track_starts_on_the_first_waypoint() {
    let mut sim = Simulation::new(SimulationParameters::default()).unwrap();
    let track = vec![PolarPosition::new(1.0, 1.0), PolarPosition::new(1.0, 0.9)];
    let stats = sim
        .run_track("rim", &track, &RenderOptions::default(), &mut [])
        .unwrap();
    assert_eq!(stats.frames, 0);
    assert_eq!(sim.primary().start(), PolarPosition::new(1.0, 1.0));
    assert_eq!(sim.primary().position(), PolarPosition::new(1.0, 0.9));
}

#[test]
fn empty_track_still_opens_and_closes_sinks() {
    let mut sim = Simulation::new(SimulationParameters::default()).unwrap();
    let recorder = Recorder::default();
    let mut sinks: Vec<Box<dyn FrameSink>> = vec![Box::new(recorder.clone())];
    let stats = sim
        .run_track("empty", &[], &RenderOptions::default(), &mut sinks)
        .unwrap();
    assert_eq!(stats, TrackStats {
        elapsed: stats.elapsed,
        ..TrackStats::default()
    });
    assert!(recorder.0.lock().unwrap().ended);
}

#[test]
fn unsettled_sand_aborts_the_track_but_closes_sinks() {
    let params = SimulationParameters {
        max_relax_sweeps: 1,
        ..SimulationParameters::default()
    };
    let mut sim = Simulation::new(params).unwrap();
    let recorder = Recorder::default();
    let mut sinks: Vec<Box<dyn FrameSink>> = vec![Box::new(recorder.clone())];

    let err = sim
        .run_track(
            "steep",
            &radial_track(10),
            &RenderOptions::default(),
            &mut sinks,
        )
        .unwrap_err();
    assert!(matches!(err, SandError::Unsettled { sweeps: 1, .. }));
    assert!(recorder.0.lock().unwrap().ended);
}

#[test]
fn invalid_render_options_are_rejected_up_front() {
    let mut sim = Simulation::new(SimulationParameters::default()).unwrap();
    let render = RenderOptions {
        image_skip_count: 0,
        ..RenderOptions::default()
    };
    assert!(sim.run_track("x", &radial_track(2), &render, &mut []).is_err());
}
