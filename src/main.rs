// src/main.rs
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use pendulum_sim::{ui, SimConfig, Simulation};

#[derive(Parser, Debug)]
#[command(version, about = "Interactive single and double pendulum simulation")]
struct Args {
    /// JSON configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Directory holding the browser front end
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,

    /// Frame pacing period in milliseconds
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,
}

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SimConfig::default(),
    };
    let simulation = Simulation::from_config(&config)?;
    info!(
        "clock: sub-step {}s, trail sample every {}s",
        simulation.clock().fixed_sub_step(),
        simulation.clock().trail_sample_interval()
    );
    let state = web::Data::new(Mutex::new(simulation));

    actix_web::rt::spawn(ui::drive_frames(
        state.clone(),
        Duration::from_millis(args.frame_ms),
    ));

    info!("serving on http://{}:{}", args.host, args.port);
    let static_dir = args.static_dir.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(ui::configure)
            .service(Files::new("/", static_dir.clone()).index_file("index.html"))
    })
    .bind((args.host.as_str(), args.port))?
    .run()
    .await?;

    Ok(())
}
