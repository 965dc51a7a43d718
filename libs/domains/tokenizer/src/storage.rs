//! JSON persistence for merge tables.
//!
//! Format:
//!
//! ```json
//! { "version": 1, "merges": [ { "left": 97, "right": 97, "id": 100 } ] }
//! ```
//!
//! Rules are written in training order. Loading re-runs the same validation
//! as [`MergeTable::from_rules`].

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{TokenizerError, TokenizerResult};
use crate::table::MergeTable;
use crate::types::MergeRule;

pub const VOCABULARY_FORMAT_VERSION: u32 = 1;

/// Default location written by training and read at serve start.
pub const DEFAULT_VOCABULARY_PATH: &str = "artifacts/merges.json";

#[derive(Debug, Serialize, Deserialize)]
struct VocabularyFile {
    version: u32,
    merges: Vec<MergeRule>,
}

impl MergeTable {
    pub fn to_json(&self) -> TokenizerResult<String> {
        let file = VocabularyFile {
            version: VOCABULARY_FORMAT_VERSION,
            merges: self.rules().to_vec(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn from_json(json: &str) -> TokenizerResult<Self> {
        let file: VocabularyFile = serde_json::from_str(json)
            .map_err(|e| TokenizerError::corrupt(format!("malformed vocabulary file: {}", e)))?;
        Self::from_file_contents(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> TokenizerResult<Self> {
        let file: VocabularyFile = serde_json::from_reader(reader)
            .map_err(|e| TokenizerError::corrupt(format!("malformed vocabulary file: {}", e)))?;
        Self::from_file_contents(file)
    }

    fn from_file_contents(file: VocabularyFile) -> TokenizerResult<Self> {
        if file.version != VOCABULARY_FORMAT_VERSION {
            return Err(TokenizerError::corrupt(format!(
                "unsupported vocabulary version {} (expected {})",
                file.version, VOCABULARY_FORMAT_VERSION
            )));
        }
        MergeTable::from_rules(file.merges)
    }

    /// Write the table to `path`, replacing any existing file atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> TokenizerResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TokenizerError::io(parent, e))?;
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, self.to_json()?).map_err(|e| TokenizerError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| TokenizerError::io(path, e))?;

        info!(path = %path.display(), merges = self.len(), "Vocabulary saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> TokenizerResult<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|e| TokenizerError::io(path, e))?;
        let table = Self::from_reader(std::io::BufReader::new(file))?;

        info!(
            path = %path.display(),
            merges = table.len(),
            vocabulary_size = table.vocabulary_size(),
            "Vocabulary loaded"
        );
        Ok(table)
    }
}
