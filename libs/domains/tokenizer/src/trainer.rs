//! Merge-vocabulary training.
//!
//! Each round counts every adjacent pair across the corpus, merges the most
//! frequent one into a freshly minted id and rewrites all sentences. Training
//! stops once `original_length / current_length` exceeds the configured
//! compression threshold.
//!
//! Ties between equally frequent pairs go to the pair seen first in a single
//! left-to-right, top-to-bottom scan, so identical corpora always produce
//! identical tables.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::corpus::Corpus;
use crate::error::{TokenizerError, TokenizerResult};
use crate::table::MergeTable;
use crate::types::{MergeRule, TokenId, TokenPair, replace_pair};

/// Default compression ratio at which training stops.
pub const DEFAULT_COMPRESSION_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Stop once `original_length / current_length` exceeds this value
    pub compression_threshold: f64,
    /// Optional hard cap on the number of merges
    pub max_merges: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
            max_merges: None,
        }
    }
}

impl TrainingConfig {
    pub fn new(compression_threshold: f64) -> Self {
        Self {
            compression_threshold,
            ..Default::default()
        }
    }

    pub fn with_max_merges(mut self, max_merges: usize) -> Self {
        self.max_merges = Some(max_merges);
        self
    }

    pub fn validate(&self) -> TokenizerResult<()> {
        if !self.compression_threshold.is_finite() || self.compression_threshold < 1.0 {
            return Err(TokenizerError::InvalidConfig(format!(
                "compression threshold must be a finite number >= 1.0, got {}",
                self.compression_threshold
            )));
        }
        if self.max_merges == Some(0) {
            return Err(TokenizerError::InvalidConfig(
                "max merges must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pair counts for one training round, plus the winning pair.
#[derive(Debug, Default)]
pub struct PairStatistics {
    counts: HashMap<TokenPair, usize>,
    best: Option<(TokenPair, usize)>,
}

impl PairStatistics {
    /// Count every adjacent pair in scan order.
    ///
    /// A pair only replaces the current best when its count strictly exceeds
    /// the best count, which keeps the earliest-seen pair on ties.
    pub fn collect(sentences: &[Vec<TokenId>]) -> Self {
        let mut counts: HashMap<TokenPair, usize> = HashMap::new();
        let mut first_seen: Vec<TokenPair> = Vec::new();

        for sentence in sentences {
            for window in sentence.windows(2) {
                let pair = TokenPair::new(window[0], window[1]);
                let count = counts.entry(pair).or_insert_with(|| {
                    first_seen.push(pair);
                    0
                });
                *count += 1;
            }
        }

        let mut best: Option<(TokenPair, usize)> = None;
        for pair in first_seen {
            let count = counts[&pair];
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((pair, count));
            }
        }

        Self { counts, best }
    }

    pub fn count(&self, pair: TokenPair) -> usize {
        self.counts.get(&pair).copied().unwrap_or(0)
    }

    pub fn best(&self) -> Option<(TokenPair, usize)> {
        self.best
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Summary of a finished training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub merges: usize,
    pub original_length: usize,
    pub final_length: usize,
    pub ratio: f64,
    /// Total corpus length after each merge, in order
    pub length_history: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Learn a merge table from `corpus`.
    ///
    /// Fails with `NoMergeablePairs` when no adjacent pair occurs at least
    /// twice before the threshold is reached.
    pub fn train(&self, corpus: Corpus) -> TokenizerResult<(MergeTable, TrainingReport)> {
        self.config.validate()?;

        let original_length = corpus.total_len();
        let Some(max_symbol) = corpus.max_symbol() else {
            return Err(TokenizerError::EmptyCorpus);
        };

        let mut next_id = max_symbol
            .checked_add(1)
            .ok_or_else(|| TokenizerError::InvalidConfig("symbol id space exhausted".to_string()))?;
        let mut sentences = corpus.into_sentences();
        let mut rules: Vec<MergeRule> = Vec::new();
        let mut length_history = Vec::new();
        let mut current_length = original_length;
        let mut ratio = 1.0;

        info!(
            sentences = sentences.len(),
            symbols = original_length,
            threshold = self.config.compression_threshold,
            "Starting BPE training"
        );

        while ratio <= self.config.compression_threshold {
            if self.config.max_merges.is_some_and(|max| rules.len() >= max) {
                info!(merges = rules.len(), "Reached merge cap");
                break;
            }

            let stats = PairStatistics::collect(&sentences);
            let (pair, count) = match stats.best() {
                Some(best) if best.1 >= 2 => best,
                _ => {
                    return Err(TokenizerError::NoMergeablePairs {
                        merges: rules.len(),
                        ratio,
                    });
                }
            };

            let id = next_id;
            for sentence in sentences.iter_mut() {
                *sentence = replace_pair(sentence, pair, id);
            }
            rules.push(MergeRule::new(pair, id));

            current_length = sentences.iter().map(Vec::len).sum();
            length_history.push(current_length);
            ratio = original_length as f64 / current_length as f64;

            debug!(
                left = pair.left,
                right = pair.right,
                id,
                count,
                length = current_length,
                ratio,
                "Merged pair"
            );

            next_id = id
                .checked_add(1)
                .ok_or_else(|| TokenizerError::InvalidConfig("token id space exhausted".to_string()))?;
        }

        let report = TrainingReport {
            merges: rules.len(),
            original_length,
            final_length: current_length,
            ratio,
            length_history,
        };

        info!(
            merges = report.merges,
            original_length = report.original_length,
            final_length = report.final_length,
            ratio = report.ratio,
            "BPE training complete"
        );

        let table = MergeTable::from_rules(rules)?;
        Ok((table, report))
    }
}
