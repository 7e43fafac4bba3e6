use clap::Parser;
use std::sync::Arc;

use devserve::cli::Cli;
use devserve::config::{AppState, Config};
use devserve::{logger, server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(cli.config.as_deref(), &cli.overrides())?;

    if cli.print_config {
        print!("{}", cfg.to_toml()?);
        return Ok(());
    }

    logger::init(&cfg)?;

    // Worker thread count follows `server.workers`, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::new(cfg)?);
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&listener.local_addr()?, &state);

    server::serve(listener, state, server::shutdown_signal()).await;

    logger::log_stopped();
    Ok(())
}
