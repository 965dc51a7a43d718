//! Offline tokenizer commands: train, inspect, encode, decode.
//!
//! Each command writes its result to `out` so the binary can print to stdout
//! while tests capture a buffer. Logs go to stderr.

use std::io::Write;
use std::path::Path;

use domain_tokenizer::{Corpus, MergeTable, TokenId, Trainer, TrainingConfig, TrainingReport};
use eyre::{Result, WrapErr};
use tracing::info;

use crate::cli::TrainArgs;

fn load_table(path: &Path) -> Result<MergeTable> {
    MergeTable::load(path)
        .wrap_err_with(|| format!("Failed to load vocabulary from {}", path.display()))
}

/// Train a merge table and persist it to `args.output`
pub fn train(args: &TrainArgs, out: &mut impl Write) -> Result<TrainingReport> {
    let mut config = TrainingConfig::new(args.threshold);
    if let Some(max_merges) = args.max_merges {
        config = config.with_max_merges(max_merges);
    }
    // Reject bad parameters before reading any corpus file
    config.validate()?;

    let corpus = Corpus::from_files(&args.corpus).wrap_err("Failed to load corpus")?;
    info!(
        files = args.corpus.len(),
        sentences = corpus.len(),
        "Corpus loaded"
    );

    let (table, report) = Trainer::new(config)
        .train(corpus)
        .wrap_err("Training failed")?;
    table
        .save(&args.output)
        .wrap_err_with(|| format!("Failed to save vocabulary to {}", args.output.display()))?;

    writeln!(out, "merges:            {}", report.merges)?;
    writeln!(out, "original length:   {}", report.original_length)?;
    writeln!(out, "final length:      {}", report.final_length)?;
    writeln!(out, "compression ratio: {:.3}", report.ratio)?;
    writeln!(out, "vocabulary size:   {}", table.vocabulary_size())?;
    writeln!(out, "saved to:          {}", args.output.display())?;

    Ok(report)
}

pub fn vocab_size(vocabulary: &Path, out: &mut impl Write) -> Result<()> {
    let table = load_table(vocabulary)?;
    writeln!(out, "{}", table.vocabulary_size())?;
    Ok(())
}

/// Print token ids on the first line and a JSON array of token texts on the second
pub fn encode(vocabulary: &Path, text: &str, out: &mut impl Write) -> Result<()> {
    let table = load_table(vocabulary)?;
    let tokens = table.encode(text);
    let token_texts = table.token_texts(&tokens)?;

    let ids: Vec<String> = tokens.iter().map(ToString::to_string).collect();
    writeln!(out, "{}", ids.join(" "))?;
    writeln!(out, "{}", serde_json::to_string(&token_texts)?)?;
    Ok(())
}

pub fn decode(vocabulary: &Path, tokens: &[TokenId], out: &mut impl Write) -> Result<()> {
    let table = load_table(vocabulary)?;
    let text = table.decode(tokens)?;
    writeln!(out, "{}", text)?;
    Ok(())
}
