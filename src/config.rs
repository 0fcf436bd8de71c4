use std::path::PathBuf;

use thiserror::Error;

use crate::color::{Color, ColorError, Palette};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid color: {0}")]
    Color(#[from] ColorError),
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[cfg(feature = "serde")]
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("`serde` cargo feature is required to load config files")]
    SerdeDisabled,
}

/// Everything that shapes a particle field. Fixed for the lifetime of a mount.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ParticleConfig {
    pub particle_count: usize,
    pub particle_spread: f32,
    pub speed: f32,
    pub particle_colors: Palette,
    pub move_particles_on_hover: bool,
    pub particle_hover_factor: f32,
    pub alpha_particles: bool,
    pub particle_base_size: f32,
    pub size_randomness: f32,
    pub camera_distance: f32,
    pub disable_rotation: bool,
    /// Multiplier applied to every sprite's final alpha.
    pub opacity: f32,
    /// Fixes the generated field when set.
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            particle_count: 300,
            particle_spread: 15.0,
            speed: 0.1,
            particle_colors: Palette::default(),
            move_particles_on_hover: false,
            particle_hover_factor: 1.0,
            alpha_particles: true,
            particle_base_size: 80.0,
            size_randomness: 1.5,
            camera_distance: 20.0,
            disable_rotation: true,
            opacity: 1.0,
            seed: None,
        }
    }
}

impl ParticleConfig {
    /// The full-page snow backdrop.
    pub fn background() -> Self {
        let particle_colors = Palette::new(
            [0xffffff, 0xf0f9ff, 0xe0f2fe, 0xbae6fd, 0xccfbff]
                .into_iter()
                .map(Color::from_rgb_hex)
                .collect(),
        );

        Self {
            particle_count: 400,
            particle_spread: 20.0,
            speed: 0.08,
            particle_colors,
            move_particles_on_hover: false,
            particle_hover_factor: 0.0,
            alpha_particles: true,
            particle_base_size: 100.0,
            size_randomness: 2.0,
            camera_distance: 25.0,
            disable_rotation: true,
            opacity: 0.6,
            seed: None,
        }
    }

    #[cfg(feature = "serde")]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[cfg(not(feature = "serde"))]
    pub fn load(_path: &std::path::Path) -> Result<Self, ConfigError> {
        Err(ConfigError::SerdeDisabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    #[default]
    Default,
    Background,
}

impl Preset {
    pub fn config(self) -> ParticleConfig {
        match self {
            Preset::Default => ParticleConfig::default(),
            Preset::Background => ParticleConfig::background(),
        }
    }
}

#[derive(Debug, clap::Parser)]
#[command(name = "snowfall", about = "Falling snow particle field")]
pub struct Args {
    /// Window width
    #[arg(long, default_value = "1600")]
    pub width: u32,
    /// Window height
    #[arg(long, default_value = "900")]
    pub height: u32,
    /// Window clear color
    #[arg(long, default_value = "#0f172a")]
    pub background: String,
    /// Starting configuration, before any overrides
    #[arg(long, value_enum, default_value_t = Preset::Default)]
    pub preset: Preset,
    /// JSON config file, replaces the preset (requires `serde` feature)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of particles
    #[arg(long)]
    pub count: Option<usize>,
    /// Size of the volume the particles fall through
    #[arg(long)]
    pub spread: Option<f32>,
    /// Fall rate multiplier
    #[arg(long)]
    pub speed: Option<f32>,
    /// Comma separated hex colors, e.g. `#fff,#bae6fd`
    #[arg(long, value_delimiter = ',')]
    pub colors: Option<Vec<String>>,
    /// Shift the field away from the cursor
    #[arg(long)]
    pub hover: bool,
    #[arg(long)]
    pub hover_factor: Option<f32>,
    /// Draw every surviving sprite pixel fully opaque
    #[arg(long)]
    pub no_alpha: bool,
    #[arg(long)]
    pub base_size: Option<f32>,
    #[arg(long)]
    pub size_randomness: Option<f32>,
    #[arg(long)]
    pub camera_distance: Option<f32>,
    /// Slowly spin the field around the vertical axis
    #[arg(long)]
    pub rotate: bool,
    #[arg(long)]
    pub opacity: Option<f32>,
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    pub fn background_color(&self) -> Result<Color, ConfigError> {
        Ok(Color::from_hex_str(&self.background)?)
    }

    pub fn particle_config(&self) -> Result<ParticleConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ParticleConfig::load(path)?,
            None => self.preset.config(),
        };

        if let Some(count) = self.count {
            config.particle_count = count;
        }
        if let Some(spread) = self.spread {
            config.particle_spread = spread;
        }
        if let Some(speed) = self.speed {
            config.speed = speed;
        }
        if let Some(colors) = &self.colors {
            config.particle_colors = Palette::from_hex_list(colors)?;
        }
        if self.hover {
            config.move_particles_on_hover = true;
        }
        if let Some(factor) = self.hover_factor {
            config.particle_hover_factor = factor;
        }
        if self.no_alpha {
            config.alpha_particles = false;
        }
        if let Some(size) = self.base_size {
            config.particle_base_size = size;
        }
        if let Some(randomness) = self.size_randomness {
            config.size_randomness = randomness;
        }
        if let Some(distance) = self.camera_distance {
            config.camera_distance = distance;
        }
        if self.rotate {
            config.disable_rotation = false;
        }
        if let Some(opacity) = self.opacity {
            config.opacity = opacity;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["snowfall"])?;
        assert_eq!(args.width, 1600);
        assert_eq!(args.height, 900);
        assert_eq!(args.particle_config()?, ParticleConfig::default());
        assert_eq!(args.background_color()?, Color::from_rgb_hex(0x0f172a));
        Ok(())
    }

    #[test]
    fn test_overrides_apply_on_top_of_preset() -> anyhow::Result<()> {
        let args = Args::try_parse_from([
            "snowfall",
            "--preset",
            "background",
            "--count",
            "12",
            "--colors",
            "#000,#ffffff",
            "--hover",
            "--rotate",
            "--seed",
            "7",
        ])?;
        let config = args.particle_config()?;

        assert_eq!(config.particle_count, 12);
        assert_eq!(
            config.particle_colors.colors(),
            &[Color::BLACK, Color::WHITE]
        );
        assert!(config.move_particles_on_hover);
        assert!(!config.disable_rotation);
        assert_eq!(config.seed, Some(7));
        // untouched preset values survive
        assert_eq!(config.particle_spread, 20.0);
        assert_eq!(config.opacity, 0.6);
        Ok(())
    }

    #[test]
    fn test_bad_color_is_rejected() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["snowfall", "--colors", "#12345"])?;
        assert!(matches!(
            args.particle_config(),
            Err(ConfigError::Color(ColorError::InvalidLength(_)))
        ));
        Ok(())
    }

    #[cfg(not(feature = "serde"))]
    #[test]
    fn test_config_file_requires_serde() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["snowfall", "--config", "snow.json"])?;
        assert!(matches!(
            args.particle_config(),
            Err(ConfigError::SerdeDisabled)
        ));
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json_uses_defaults() -> anyhow::Result<()> {
        let config: ParticleConfig = serde_json::from_str(
            r##"{ "particle_count": 5, "particle_colors": ["#fff", "#e0f2fe"] }"##,
        )?;
        assert_eq!(config.particle_count, 5);
        assert_eq!(config.particle_colors.colors()[0], Color::WHITE);
        assert_eq!(config.camera_distance, 20.0);
        Ok(())
    }
}
