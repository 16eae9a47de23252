//! Configuration of [`TrackEnv`](crate::TrackEnv).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TrackEnv`](crate::TrackEnv).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrackEnvConfig {
    /// Track centerline radius in meters.
    pub track_radius: f64,

    /// Half the road width in meters; beyond it the episode ends.
    pub half_width: f64,

    /// Speed at full throttle, in meters per second.
    pub speed: f64,

    /// Integration step in seconds.
    pub dt: f64,

    /// Yaw rate at full steering lock, in radians per second.
    pub steer_gain: f64,

    /// Proportional gain of the reference controller on lateral offset.
    pub kp: f64,

    /// Damping gain of the reference controller on heading error.
    pub kd: f64,

    /// Lap fraction after which the episode ends.
    pub laps: f64,

    /// Rendered observation height in pixels.
    pub obs_height: usize,

    /// Rendered observation width in pixels.
    pub obs_width: usize,
}

impl Default for TrackEnvConfig {
    fn default() -> Self {
        Self {
            track_radius: 50.0,
            half_width: 4.0,
            speed: 10.0,
            dt: 0.05,
            steer_gain: 1.5,
            kp: 0.4,
            kd: 1.2,
            laps: 1.0,
            obs_height: 32,
            obs_width: 32,
        }
    }
}

impl TrackEnvConfig {
    /// Sets the track radius.
    pub fn track_radius(mut self, v: f64) -> Self {
        self.track_radius = v;
        self
    }

    /// Sets the half road width.
    pub fn half_width(mut self, v: f64) -> Self {
        self.half_width = v;
        self
    }

    /// Sets the full-throttle speed.
    pub fn speed(mut self, v: f64) -> Self {
        self.speed = v;
        self
    }

    /// Sets the integration step.
    pub fn dt(mut self, v: f64) -> Self {
        self.dt = v;
        self
    }

    /// Sets the episode length in laps.
    pub fn laps(mut self, v: f64) -> Self {
        self.laps = v;
        self
    }

    /// Sets the rendered observation dimensions.
    pub fn obs_dims(mut self, height: usize, width: usize) -> Self {
        self.obs_height = height;
        self.obs_width = width;
        self
    }

    /// Loads [`TrackEnvConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrackEnvConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
