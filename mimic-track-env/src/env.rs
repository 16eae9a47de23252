//! The track environment.
use crate::TrackEnvConfig;
use anyhow::Result;
use log::trace;
use mimic_core::{DriveAction, Env, Frame, Step};
use ndarray::Array3;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// A car on a circular track.
///
/// The state is the progress angle along the centerline, the signed
/// lateral offset and the heading error relative to the track tangent.
/// The seed only perturbs the initial lateral offset, so identical
/// `(config, seed)` pairs give identical rollouts.
pub struct TrackEnv {
    config: TrackEnvConfig,
    init_offset: f64,
    progress: f64,
    offset: f64,
    heading: f64,
}

impl TrackEnv {
    /// Effective speed for a clamped action.
    fn speed_of(&self, act: &DriveAction) -> f64 {
        self.config.speed * (0.2 + 0.8 * act.throttle as f64) * (1.0 - act.brake as f64)
    }

    /// The reference action for the current state: curvature feed-forward
    /// plus a PD correction of the lateral offset, constant throttle and
    /// no brake.
    fn expert(&self) -> DriveAction {
        let c = &self.config;
        let v = c.speed * (0.2 + 0.8 * 0.5);
        let feed_forward = v / (c.track_radius * c.steer_gain);
        let correction = -(c.kp * self.offset + c.kd * self.heading) / c.steer_gain;
        DriveAction {
            steer: (feed_forward + correction).clamp(-1.0, 1.0) as f32,
            throttle: 0.5,
            brake: 0.0,
        }
    }

    /// Renders a bird's-eye strip of the road ahead.
    ///
    /// Each row is a lookahead distance; the road band and the bright
    /// centerline are drawn at the lateral position implied by the current
    /// offset and heading error.
    fn observe(&self) -> Frame {
        let c = &self.config;
        let (h, w) = (c.obs_height, c.obs_width);
        let span = 4.0 * c.half_width;
        let v = c.speed;
        let mut data = Array3::zeros((h, w, 3));

        for row in 0..h {
            let ahead = (h - 1 - row) as f64 * c.dt * v;
            let center = -(self.offset + ahead * self.heading.sin());
            for col in 0..w {
                let lateral = ((col as f64 + 0.5) / w as f64 - 0.5) * span;
                let distance = (lateral - center).abs();
                let value = if distance <= 0.08 * c.half_width {
                    255
                } else if distance <= c.half_width {
                    128
                } else {
                    32
                };
                for channel in 0..3 {
                    data[[row, col, channel]] = value;
                }
            }
        }
        Frame::new(data)
    }
}

impl Env for TrackEnv {
    type Config = TrackEnvConfig;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed as u64);
        // cars start slightly off the centerline
        let init_offset = (rng.gen::<f64>() - 0.5) * config.half_width * 0.5;
        Ok(Self {
            config: config.clone(),
            init_offset,
            progress: 0.0,
            offset: init_offset,
            heading: 0.0,
        })
    }

    fn reset(&mut self) -> Result<Frame> {
        self.progress = 0.0;
        self.offset = self.init_offset;
        self.heading = 0.0;
        Ok(self.observe())
    }

    fn step(&mut self, act: &DriveAction) -> Result<Step<Self>> {
        let c = self.config.clone();
        let act = act.clamped();
        let v = self.speed_of(&act);
        let yaw_rate = act.steer as f64 * c.steer_gain;

        // the heading error integrates the commanded yaw rate minus the
        // rotation of the track tangent
        self.heading += (yaw_rate - v / c.track_radius) * c.dt;
        self.offset += v * self.heading.sin() * c.dt;
        self.progress += v * self.heading.cos() / (c.track_radius + self.offset) * c.dt;
        trace!(
            "progress = {:.4}, offset = {:.4}, heading = {:.4}",
            self.progress,
            self.offset,
            self.heading
        );

        let off_track = self.offset.abs() > c.half_width;
        let lap_done = self.progress >= c.laps * std::f64::consts::TAU;
        Ok(Step {
            obs: self.observe(),
            expert: self.expert(),
            reward: -(self.offset.abs() as f32),
            done: off_track || lap_done,
            cte: self.offset as f32,
            info: (),
        })
    }
}
