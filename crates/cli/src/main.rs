use clap::Parser;

use invoicer_cli::{app, args::Cli};
use invoicer_infra::Settings;

fn main() -> anyhow::Result<()> {
    invoicer_observability::init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    settings.ensure_directories()?;
    tracing::debug!(data_dir = %settings.data_dir.display(), "settings loaded");

    let now = chrono::Local::now().naive_local();
    let stdout = std::io::stdout();
    app::run(cli.command, &settings, &mut stdout.lock(), now)
}
