use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use domain_tokenizer::{DEFAULT_COMPRESSION_THRESHOLD, DEFAULT_VOCABULARY_PATH, TokenId};

#[derive(Debug, Parser)]
#[command(name = "polydb", version)]
#[command(about = "Multilingual BPE tokenizer and ingestion server for the PolyDB vector store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Learn a merge table from corpus files
    Train(TrainArgs),

    /// Print the vocabulary size of a merge table
    VocabSize(VocabularyArgs),

    /// Encode text into token ids
    Encode {
        #[command(flatten)]
        vocabulary: VocabularyArgs,

        /// Text to encode
        text: String,
    },

    /// Decode token ids back into text
    Decode {
        #[command(flatten)]
        vocabulary: VocabularyArgs,

        /// Token ids to decode
        #[arg(required = true)]
        tokens: Vec<TokenId>,
    },

    /// Run the HTTP API and the tokenizer gRPC service
    Serve,
}

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// Corpus files, one sentence per line
    #[arg(short, long, required = true, num_args = 1..)]
    pub corpus: Vec<PathBuf>,

    /// Where to write the merge table
    #[arg(short, long, default_value = DEFAULT_VOCABULARY_PATH)]
    pub output: PathBuf,

    /// Stop once the compression ratio exceeds this value
    #[arg(short, long, default_value_t = DEFAULT_COMPRESSION_THRESHOLD)]
    pub threshold: f64,

    /// Stop after this many merges even if the threshold is not reached
    #[arg(long)]
    pub max_merges: Option<usize>,
}

#[derive(Debug, Args)]
pub struct VocabularyArgs {
    /// Merge table file
    #[arg(short, long, env = "VOCABULARY_PATH", default_value = DEFAULT_VOCABULARY_PATH)]
    pub vocabulary: PathBuf,
}
