//! Command-line argument parsing for the Terra viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Terra command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "terra", about = "Planet scattering and orbit camera demo")]
pub struct CliArgs {
    /// Viewport width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Viewport height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(frames) = args.frames {
            self.debug.demo_frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs {
            width: None,
            height: None,
            frames: None,
            log_level: None,
            config: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            frames: Some(10),
            ..empty_args()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.debug.demo_frames, 10);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&empty_args());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["terra", "--height", "600", "--log-level", "debug"]);
        assert_eq!(args.height, Some(600));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }
}
