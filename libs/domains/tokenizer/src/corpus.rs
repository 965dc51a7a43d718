//! Training corpus: ordered sentences of base symbol ids.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{TokenizerError, TokenizerResult};
use crate::types::{TokenId, base_symbols};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    sentences: Vec<Vec<TokenId>>,
}

impl Corpus {
    /// Build a corpus from individual sentences. Blank lines are skipped.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sentences = lines
            .into_iter()
            .filter_map(|line| {
                let line = line.as_ref().trim_end_matches('\r');
                if line.trim().is_empty() {
                    None
                } else {
                    Some(base_symbols(line))
                }
            })
            .collect();

        Self { sentences }
    }

    /// Read UTF-8 text files holding one sentence per line.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> TokenizerResult<Self> {
        let mut corpus = Corpus::default();

        for path in paths {
            let path = path.as_ref();
            let content =
                fs::read_to_string(path).map_err(|e| TokenizerError::io(path, e))?;
            let before = corpus.sentences.len();
            corpus.extend(Corpus::from_lines(content.lines()));
            debug!(
                path = %path.display(),
                sentences = corpus.sentences.len() - before,
                "Loaded corpus file"
            );
        }

        if corpus.is_empty() {
            return Err(TokenizerError::EmptyCorpus);
        }

        info!(
            files = paths.len(),
            sentences = corpus.len(),
            symbols = corpus.total_len(),
            "Corpus loaded"
        );
        Ok(corpus)
    }

    pub fn extend(&mut self, other: Corpus) {
        self.sentences.extend(other.sentences);
    }

    pub fn sentences(&self) -> &[Vec<TokenId>] {
        &self.sentences
    }

    pub(crate) fn into_sentences(self) -> Vec<Vec<TokenId>> {
        self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Total number of symbols across all sentences.
    pub fn total_len(&self) -> usize {
        self.sentences.iter().map(Vec::len).sum()
    }

    /// Highest symbol id present, if any.
    pub fn max_symbol(&self) -> Option<TokenId> {
        self.sentences.iter().flatten().copied().max()
    }
}
