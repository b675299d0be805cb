use clap::Parser;
use log::{error, info};
use server::coordinator::Coordinator;
use server::network;
use server::rules::StandardRules;
use std::time::Duration;
use tokio::net::TcpListener;

/// Main-method of the application.
/// Parses command-line arguments, then runs the network accept loop and the
/// session coordinator until one of them stops or Ctrl+C arrives.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value = "3000")]
        port: u16,
        /// Seconds an abandoned game is kept before deletion
        #[clap(short, long, default_value = "60")]
        grace_secs: u64,
    }

    env_logger::init();

    // Parse command line arguments
    let args = Args::parse();

    let mut coordinator = Coordinator::new(
        Box::new(StandardRules),
        Duration::from_secs(args.grace_secs),
    );
    let command_tx = coordinator.command_sender();

    let address = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server listening on {}", address);

    // Spawn network accept loop
    let network_handle = tokio::spawn(async move {
        network::serve(listener, command_tx).await;
    });

    // Spawn coordinator loop
    let coordinator_handle = tokio::spawn(async move {
        coordinator.run().await;
    });

    // Handle shutdown gracefully
    tokio::select! {
        result = network_handle => {
            if let Err(e) = result {
                error!("Network task panicked: {}", e);
            }
        }
        result = coordinator_handle => {
            if let Err(e) = result {
                error!("Coordinator task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
