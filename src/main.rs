use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::event::EventStream;
use tracing::error;

use clf_dashboard::render;
use clf_dashboard::ui::Theme;
use clf_dashboard::{logging, session, transport, App, Overrides, Settings};

#[derive(Parser, Debug)]
#[command(name = "clf-dashboard")]
#[command(about = "Terminal dashboard for live web-traffic analytics")]
struct Args {
    /// Server address (host:port)
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Redraw interval (e.g., "1s", "250ms")
    #[arg(short, long)]
    refresh: Option<String>,

    /// How long to wait for close confirmations on shutdown
    #[arg(long)]
    close_timeout: Option<String>,

    /// Acknowledge every decoded batch
    #[arg(long)]
    ack: bool,

    /// Log file (defaults to clf-dashboard.log in the temp directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            addr: self.addr.clone(),
            refresh: self.refresh.clone(),
            close_timeout: self.close_timeout.clone(),
            acknowledge: self.ack.then_some(true),
            log_file: self.log_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;
    logging::init(&settings)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(settings))
}

async fn run(settings: Settings) -> Result<()> {
    // Detect the theme before raw mode swallows the terminal's reply
    let theme = Theme::auto_detect();
    let terminal = render::setup_terminal()?;

    let outcome = session::run(
        &settings,
        terminal,
        App::new(theme),
        transport::connect_all(&settings),
        EventStream::new(),
        tokio::signal::ctrl_c(),
    )
    .await;
    let restored = render::restore_terminal();

    if let Err(err) = &outcome {
        error!(error = %err, "dashboard failed");
    }
    outcome?;
    restored
}
