// cli.rs - Command-line interface configuration
use std::path::PathBuf;
use clap::Parser;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "cube-scene")]
#[command(about = "Shaded cubes, an orbiting light and an orbit camera", long_about = None)]
pub struct Cli {
    /// Hide the frame-rate overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Initial window width in logical pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height in logical pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// JSON settings file; flags given here override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable multisample antialiasing
    #[arg(long = "no-antialias", default_value = "false")]
    pub no_antialias: bool,

    /// Shadow map resolution per side, a power of two
    #[arg(long, value_name = "TEXELS")]
    pub shadow_map_size: Option<u32>,
}
