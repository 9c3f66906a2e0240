use clap::{arg, command};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use abi::config::{Config, LogConfig, LogOutput};

const DEFAULT_CONFIG: &str = "./abi/fixtures/intro.yml";

/// `RUST_LOG` wins over the configured level. The guard flushes the file
/// writer and must outlive the server.
fn init_tracing(log: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_line_number(true);

    match log.output {
        LogOutput::Console => {
            builder.init();
            None
        }
        LogOutput::File => {
            let appender = tracing_appender::rolling::daily(&log.dir, &log.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            builder.with_writer(writer).with_ansi(false).init();
            Some(guard)
        }
    }
}

#[tokio::main]
async fn main() {
    let matches = command!()
        .arg(arg!(-c --config <FILE> "path to the yaml config").default_value(DEFAULT_CONFIG))
        .get_matches();
    let path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG);

    let config = match Config::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load config {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let _guard = init_tracing(&config.log);
    info!("config loaded from {}, store: {:?}", path, config.db.store);

    if let Err(e) = api::start(config).await {
        error!("server stopped: {}", e);
        std::process::exit(1);
    }
}
