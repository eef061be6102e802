//! Server configuration from the command line and environment.

use crate::state::DEFAULT_OUTBOUND_CAPACITY;
use clap::Parser;
use std::path::PathBuf;

/// Two-player word-search server
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[clap(author, version, about)]
pub struct ServerConfig {
    /// Address to bind to
    #[clap(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[clap(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Word list, one word per line
    #[clap(short, long, env = "WORDS_PATH", default_value = "config/words.txt")]
    pub words: PathBuf,

    /// Outbound messages queued per player before it is dropped
    #[clap(long, default_value_t = DEFAULT_OUTBOUND_CAPACITY)]
    pub outbound_capacity: usize,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
