//! Engine configuration.
//!
//! A [`FieldConfig`] is fixed for the lifetime of an engine. Build one with the `with_*`
//! methods, or load it from JSON using the same camelCase keys a page would pass as an options
//! object (`count`, `linkDist`, `mouseRadius`, `speed`, `color`). Missing keys fall back to the
//! defaults and values are accepted as given.
//!
//! ```ignore
//! let config = FieldConfig::new()
//!     .with_count(80)
//!     .with_color(Rgb::new(255, 0, 128));
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// An 8-bit RGB color. Serializes as a `[r, g, b]` array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// The default particle color.
    pub const CYAN: Rgb = Rgb([0, 240, 255]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Normalized RGBA with the given alpha, as consumed by the GPU batches.
    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.0;
        [
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            alpha,
        ]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::CYAN
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "{},{},{}", r, g, b)
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    /// Parses `r,g,b` with each channel in `0..=255`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let channels: Vec<u8> = s
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| ConfigError::Color(s.to_string()))?;

        match channels.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(ConfigError::Color(s.to_string())),
        }
    }
}

/// Configuration for a particle field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
    /// Number of particles. Fixed for the engine's lifetime.
    pub count: usize,
    /// Link threshold in pixels. Also the edge length of a spatial grid cell.
    pub link_dist: f32,
    /// Radius of pointer influence in pixels, for both attraction and highlighting.
    pub mouse_radius: f32,
    /// Scale of the initial velocity of each particle.
    pub speed: f32,
    /// Color for particles and links.
    pub color: Rgb,
    /// Seed for particle placement. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 50,
            link_dist: 110.0,
            mouse_radius: 160.0,
            speed: 0.4,
            color: Rgb::CYAN,
            seed: None,
        }
    }
}

impl FieldConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of particles.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Set the link distance (and grid cell size).
    pub fn with_link_dist(mut self, link_dist: f32) -> Self {
        self.link_dist = link_dist;
        self
    }

    /// Set the pointer influence radius.
    pub fn with_mouse_radius(mut self, mouse_radius: f32) -> Self {
        self.mouse_radius = mouse_radius;
        self
    }

    /// Set the initial velocity scale.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the particle and link color.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Seed particle placement for reproducible fields.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a configuration from a JSON object. Unknown keys are ignored.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
