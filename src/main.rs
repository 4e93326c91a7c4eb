use std::path::PathBuf;

use clap::{Parser, Subcommand};
use webex_update_notifier::config::{BotConfig, log_dir};

#[derive(Parser)]
#[command(name = "webex-update-notifier")]
#[command(version, about = "Chat bot announcing new Webex Teams desktop releases")]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Write the log file as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve webhooks and watch for new versions (default)
    Run,
    /// Print the currently released versions and exit
    Versions,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = BotConfig::load(cli.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let logs = log_dir(&config.resolved_data_dir());
            let _guard = webex_update_notifier::logging::init(&logs, cli.json_logs)?;
            runtime.block_on(webex_update_notifier::app::run(config))
        }
        Command::Versions => runtime.block_on(webex_update_notifier::app::print_versions(&config)),
    }
}
