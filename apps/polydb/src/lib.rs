//! PolyDB
//!
//! One binary for the offline and online halves of the tokenizer:
//!
//! ```text
//! polydb train ──▶ merges.json ──▶ polydb serve
//!                                     │
//!          ┌──────────────────────────┼──────────────────────────┐
//!          ▼                          ▼                          ▼
//!   HTTP /insert, /find_similar   HTTP /encode, /decode   gRPC tokenizer.Tokenizer
//!          │ IngestDispatcher
//!          ▼
//!   embeddings.Embeddings (external)
//! ```
//!
//! ## Modules
//!
//! - `cli`: clap argument definitions
//! - `commands`: train / vocab-size / encode / decode
//! - `server`: HTTP and gRPC startup and shutdown
//! - `api`, `openapi`, `state`, `config`: serving plumbing

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod openapi;
pub mod server;
pub mod state;

use std::io::{self, Write};

use eyre::Result;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use state::AppState;

/// Execute a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve => server::serve(Config::from_env()?).await,
        command => run_offline(command, &mut io::stdout().lock()),
    }
}

fn run_offline(command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Train(args) => commands::train(&args, out).map(|_| ()),
        Commands::VocabSize(args) => commands::vocab_size(&args.vocabulary, out),
        Commands::Encode { vocabulary, text } => {
            commands::encode(&vocabulary.vocabulary, &text, out)
        }
        Commands::Decode { vocabulary, tokens } => {
            commands::decode(&vocabulary.vocabulary, &tokens, out)
        }
        Commands::Serve => Err(eyre::eyre!("serve is not an offline command")),
    }
}
