use clap::Parser;
use client::app::{App, LoopHandle};
use client::config::ClientConfig;
use client::network::ConnectionHandle;
use log::info;
use macroquad::prelude::Conf;
use shared::{DEFAULT_ROOM, DEFAULT_SERVER_URL, MOVE_STEP, PROXIMITY_THRESHOLD};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket endpoint of the world-state server
    #[arg(short = 's', long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Room to join
    #[arg(short = 'r', long, default_value = DEFAULT_ROOM)]
    room: String,

    /// Distance under which other players count as nearby
    #[arg(short = 't', long, default_value_t = PROXIMITY_THRESHOLD)]
    threshold: f64,

    /// Distance requested per key press
    #[arg(long, default_value_t = MOVE_STEP)]
    step: f64,

    /// Disable proximity highlighting
    #[arg(long)]
    no_proximity: bool,

    /// Simulate network latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    fake_ping: u64,

    /// Window width
    #[arg(short = 'w', long, default_value = "800")]
    width: usize,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "600")]
    height: usize,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        ClientConfig {
            server_url: args.server,
            room: args.room,
            proximity_threshold: args.threshold,
            proximity_enabled: !args.no_proximity,
            move_step: args.step,
            fake_ping_ms: args.fake_ping,
            width: args.width,
            height: args.height,
        }
    }
}

fn window_conf(config: &ClientConfig) -> Conf {
    Conf {
        window_title: format!("presence - {}", config.room),
        window_width: config.width as i32,
        window_height: config.height as i32,
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ClientConfig::from(Args::parse());
    config.validate()?;

    info!("Starting client...");
    info!("Connecting to: {}", config.endpoint());
    if config.fake_ping_ms > 0 {
        info!("Simulating {}ms latency", config.fake_ping_ms);
    }
    info!("Controls: arrows/WASD to move, P proximity, H hud, R reconnect, Esc quit");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    let connection =
        ConnectionHandle::spawn(runtime.handle(), config.endpoint(), config.fake_ping_ms);
    let app = App::new(&config, connection);
    let handle = LoopHandle::new();

    macroquad::Window::from_config(window_conf(&config), async move {
        let connection = app.run(handle).await;
        connection.close();
        runtime.shutdown_timeout(Duration::from_millis(500));
        info!("Client stopped");
    });

    Ok(())
}
