// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::sync::Arc;
use whistle_meme::app::{AppModel, Flags};
use whistle_meme::backends::camera::{PipeWireCamera, PipeWireRemote};
use whistle_meme::backends::permission::PortalPermissionGate;
use whistle_meme::backends::sound::GstSoundCue;
use whistle_meme::config::Config;
use whistle_meme::constants::ui;
use whistle_meme::i18n;

mod cli;

#[derive(Parser)]
#[command(name = "whistle-meme")]
#[command(about = "Take a photo, get a meme and a whistle")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// PipeWire target (object serial) or name of the camera to open
    #[arg(short, long, global = true)]
    camera: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=whistle_meme=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let (config_handler, config) = Config::load(<AppModel as cosmic::Application>::APP_ID);

    // The command line wins over the saved preference
    let preferred = cli.camera.or_else(|| config.camera_path.clone());

    match cli.command {
        Some(Commands::List) => cli::list_cameras(preferred.as_deref()),
        None => run_gui(preferred, config_handler, config),
    }
}

fn run_gui(
    preferred: Option<String>,
    config_handler: Option<cosmic::cosmic_config::Config>,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    // Filled by the portal when sandboxed, read by the camera when binding
    let remote = PipeWireRemote::default();

    let flags = Flags {
        permission: Arc::new(PortalPermissionGate::new(remote.clone())),
        camera: Arc::new(PipeWireCamera::detect(preferred.as_deref(), remote)),
        sound: Arc::new(GstSoundCue::new()),
        config,
        config_handler,
    };

    // Settings for configuring the application window and iced runtime.
    let settings = cosmic::app::Settings::default().size_limits(
        cosmic::iced::Limits::NONE
            .min_width(ui::MIN_WINDOW_WIDTH)
            .min_height(ui::MIN_WINDOW_HEIGHT),
    );

    cosmic::app::run::<AppModel>(settings, flags)?;

    Ok(())
}
