use clap::Parser;
use lectern::core::config::{self, CliOverrides, LecternConfig};
use lectern::tui;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "lectern", about = "Ask questions about your course materials")]
struct Args {
    /// Backend base URL (overrides config file and LECTERN_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Apply and remember a theme: dark, light or terminal
    #[arg(long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // The logger isn't up yet, so config problems go to stderr before the TUI starts
    let file_config = config::load_config().unwrap_or_else(|e| {
        eprintln!("lectern: {e}; using defaults");
        LecternConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            base_url: args.base_url,
            theme: args.theme,
        },
    );
    for warning in &resolved.warnings {
        eprintln!("lectern: {warning}");
    }

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    log::info!("Lectern starting up against {}", resolved.base_url);
    for warning in &resolved.warnings {
        log::warn!("{}", warning);
    }

    tui::run(resolved)
}
