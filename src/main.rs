use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;
use wordsearch_state::config::ServerConfig;
use wordsearch_state::transport::serve;
use wordsearch_state::{SessionDirectory, WordSource};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();

    let words = WordSource::load(&config.words)?;
    info!(
        "Loaded {} words from {}",
        words.len(),
        config.words.display()
    );

    let directory = Arc::new(SessionDirectory::new(words));
    let address = config.address();
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on {}", address);

    tokio::select! {
        result = serve(listener, directory, config.outbound_capacity) => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
