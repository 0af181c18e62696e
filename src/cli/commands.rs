use crate::{
    config::RuntimeConfig,
    dispatcher::Dispatcher,
    middleware::{MetricsMiddleware, TracingMiddleware},
    registry,
    router::Router,
    server::{AppService, HttpServer},
    session::SessionManager,
    state::AppState,
    store::{JsonFileStore, MemoryStore, ParticipantStore},
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Command-line interface for the tallyboard server.
#[derive(Parser)]
#[command(name = "tallyboard")]
#[command(about = "Drink tally board with a live leaderboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server
    Serve {
        /// Address and port to bind the server to
        #[arg(long, env = "TALLY_ADDR", default_value = "0.0.0.0:5001")]
        addr: String,

        /// Count storage backend
        #[arg(long, value_enum, default_value = "json")]
        store: StoreBackend,

        /// Backing document for the json backend
        #[arg(long, env = "TALLY_DATA_FILE", default_value = "data.json")]
        data_file: PathBuf,

        /// Directory holding the page templates
        #[arg(long, default_value = "templates")]
        template_dir: PathBuf,

        /// Directory holding static assets (stylesheet, scripts)
        #[arg(long, default_value = "static_site")]
        static_dir: PathBuf,
    },
    /// Print the current standings from a data file and exit
    Standings {
        /// Backing document to read
        #[arg(long, env = "TALLY_DATA_FILE", default_value = "data.json")]
        data_file: PathBuf,
    },
}

/// Count storage backends selectable at startup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Durable: whole mapping persisted to a JSON document on every mutation
    Json,
    /// Volatile: counts reset when the process exits
    Memory,
}

/// Parse arguments and run the selected command.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            addr,
            store,
            data_file,
            template_dir,
            static_dir,
        } => serve(&addr, store, data_file, template_dir, static_dir),
        Commands::Standings { data_file } => standings(data_file),
    }
}

fn serve(
    addr: &str,
    backend: StoreBackend,
    data_file: PathBuf,
    template_dir: PathBuf,
    static_dir: PathBuf,
) -> anyhow::Result<()> {
    let runtime = RuntimeConfig::from_env();
    may::config().set_stack_size(runtime.stack_size);

    let store: Arc<dyn ParticipantStore> = match backend {
        StoreBackend::Json => {
            info!(path = %data_file.display(), "Using json count store");
            Arc::new(JsonFileStore::new(data_file))
        }
        StoreBackend::Memory => {
            info!("Using in-memory count store, counts reset on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let sessions = Arc::new(match runtime.session_secret {
        Some(secret) => SessionManager::with_secret(secret),
        None => SessionManager::new(),
    });

    let state = AppState::new(store, sessions, template_dir);

    let router = Router::new(registry::routes());
    info!(route_count = router.len(), "Route table built");
    let router = Arc::new(RwLock::new(router));

    let mut dispatcher = Dispatcher::new();
    let metrics = Arc::new(MetricsMiddleware::new());
    dispatcher.add_middleware(metrics.clone());
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    // SAFETY: the may runtime is configured above; handlers answer every
    // request through their reply channel.
    unsafe {
        registry::register_all(&mut dispatcher, &state);
    }
    let dispatcher = Arc::new(RwLock::new(dispatcher));

    let mut service = AppService::new(router, dispatcher, Some(static_dir));
    service.set_metrics_middleware(metrics);

    let handle = HttpServer(service).start(addr)?;
    handle.wait_ready()?;
    info!(addr = %addr, stack_size = runtime.stack_size, "tallyboard listening");

    #[cfg(unix)]
    {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        if let Some(signal) = signals.forever().next() {
            info!(signal, "Shutdown signal received, stopping server");
        }
        handle.stop();
        Ok(())
    }

    #[cfg(not(unix))]
    {
        handle
            .join()
            .map_err(|e| anyhow::anyhow!("server failed: {e:?}"))?;
        Ok(())
    }
}

fn standings(data_file: PathBuf) -> anyhow::Result<()> {
    let store = JsonFileStore::new(data_file);
    let rows = store.list_sorted();
    if rows.is_empty() {
        println!("No participants yet.");
        return Ok(());
    }
    let widest = rows.iter().map(|p| p.name.len()).max().unwrap_or(4);
    for (place, row) in rows.iter().enumerate() {
        println!(
            "{:>3}. {:<width$}  {}",
            place + 1,
            row.name,
            row.count,
            width = widest
        );
    }
    Ok(())
}
