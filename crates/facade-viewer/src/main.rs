//! Facade desktop viewer

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::{Context, Result};
    use clap::Parser;
    use facade_core::{ThemeName, ViewerConfig};
    use facade_viewer::ViewerOptions;
    use std::path::PathBuf;

    #[derive(Parser, Debug)]
    #[command(name = "facade-viewer")]
    #[command(about = "Interactive 3D building viewer")]
    struct Args {
        /// Configuration file path
        #[arg(short, long, default_value = "facade.toml")]
        config: PathBuf,

        /// Directory model files are loaded from (overrides config)
        #[arg(short, long)]
        models: Option<PathBuf>,

        /// Building id to show first
        #[arg(short, long)]
        building: Option<String>,

        /// Initial theme (day or night)
        #[arg(short, long)]
        theme: Option<ThemeName>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long, default_value = "info")]
        log_level: bevy::log::Level,
    }

    pub fn main() -> Result<()> {
        let args = Args::parse();

        let mut config = ViewerConfig::load(&args.config)
            .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
        if let Some(models) = args.models {
            config.models.path = models;
        }
        if let Some(theme) = args.theme {
            config.theme.initial = theme;
        }

        let mut options = ViewerOptions::from_config(config).context("Invalid configuration")?;
        if let Some(building) = args.building {
            anyhow::ensure!(
                options.catalog.find(&building).is_some(),
                "Unknown building '{}'",
                building
            );
            options.building = Some(building);
        }
        options.log_level = Some(args.log_level);

        facade_viewer::run(options);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

// The browser build starts from the library's wasm entry point
#[cfg(target_arch = "wasm32")]
fn main() {}
