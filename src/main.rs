use anyhow::{Context, Result};
use clap::Parser;

use osceleton_receiver::config::Config;
use osceleton_receiver::receiver::is_timeout;
use osceleton_receiver::{CoordinateMode, Joint, Skeleton, SkeletonServer};

/// OSCeleton skeleton receiver.
#[derive(Parser, Debug)]
#[command(name = "osceleton-receiver", version = env!("GIT_VERSION"), about = "Receive OSCeleton joint messages and print completed skeletons")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// UDP port to listen on (overrides the config file).
    #[arg(long, short)]
    port: Option<u16>,

    /// Convert joints to millimetres instead of normalized coordinates.
    #[arg(long)]
    real_world: bool,

    /// Print every joint of each completed skeleton.
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config);
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.real_world {
        config.coordinates.mode = CoordinateMode::PhysicalMillimeters;
    }

    tracing::info!("OSCeleton receiver ({})", env!("GIT_VERSION"));
    tracing::info!("Coordinates: {:?}", config.coordinates.mode);

    let mut server = SkeletonServer::bind(&config)
        .with_context(|| format!("cannot listen on {}", config.server.listen_addr()))?;

    loop {
        match server.process_one_event() {
            Ok(_) => {}
            Err(e) if is_timeout(&e) => continue,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        }

        for skel in server.drain_new_skeletons() {
            print_skeleton(&skel, cli.verbose);
        }
    }
}

fn print_skeleton(skel: &Skeleton, verbose: bool) {
    match skel.joint(Joint::Torso.as_str()) {
        Ok(torso) => println!("user {}: {} joints, torso {}", skel.id, skel.joints.len(), torso),
        Err(_) => println!("user {}: {} joints", skel.id, skel.joints.len()),
    }
    if verbose {
        for joint in Joint::ALL {
            if let Ok(point) = skel.joint(joint.as_str()) {
                println!("  {:<12} {}", joint.as_str(), point);
            }
        }
    }
}
