use clap::Parser;
use scui::cli::{commands, Cli, Commands, StartupError, Verbosity};
use scui::config::Config;
use scui::ui::formatter::Formatter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const USAGE_EXIT_CODE: i32 = -1;

fn initialize_tracing(verbosity: Verbosity) {
    let log_level = verbosity.to_log_level();
    let fallback_filter = format!("scui={}", log_level);

    let use_json = std::env::var("SCUI_LOG_JSON").is_ok();

    if use_json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| fallback_filter.clone().into()),
            )
            .with(json_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| fallback_filter.into()),
            )
            .with(fmt_layer)
            .init();
    }
}

async fn run(cli: Cli, config: Config) -> Result<(), StartupError> {
    match cli.command {
        Commands::Console(args) => commands::console(args, &config).await,
        Commands::Deploy(args) => commands::deploy(args, &config).await,
        Commands::Completions(args) => {
            commands::completions(args);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    Formatter::configure_colors_from_env();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { USAGE_EXIT_CODE } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    initialize_tracing(cli.verbosity());

    let config = Config::load_or_default();
    if let Some(color) = config.console.color {
        Formatter::configure_colors(color);
    }

    if let Err(e) = run(cli, config).await {
        eprintln!("{}", Formatter::error(e.to_string()));
        std::process::exit(e.exit_code());
    }
}
