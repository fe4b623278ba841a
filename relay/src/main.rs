use clap::Parser;
use tracing::{error, info};

use relay::{
    cli::Cli,
    client,
    config::{Role, ServerConfig},
    server::EventLoop,
    termination,
};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let (terminator, interrupt_rx) = termination::create_termination();
    let listener = config.bind().await?;
    let event_loop = EventLoop::new(listener, interrupt_rx);

    info!("Server listening to port: {} ...", config.port);
    termination::terminate_by_operator_input(terminator);

    if let Err(e) = event_loop.start().await {
        error!(error = ?e, "relay stopped with an error");
        return Err(e);
    }

    info!("Server shut down");

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.role() {
        Role::Server(config) => run_server(config).await?,
        Role::Client(config) => client::run(config).await?,
    }

    Ok(())
}
