//! Shared value types for training, encoding and persistence.

use serde::{Deserialize, Serialize};

/// A token identifier.
///
/// Ids below the first minted id are base symbols (Unicode code points).
/// Every merge mints the next id above the highest id seen so far.
pub type TokenId = u32;

/// An ordered pair of adjacent token ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPair {
    pub left: TokenId,
    pub right: TokenId,
}

impl TokenPair {
    pub const fn new(left: TokenId, right: TokenId) -> Self {
        Self { left, right }
    }
}

impl From<(TokenId, TokenId)> for TokenPair {
    fn from((left, right): (TokenId, TokenId)) -> Self {
        Self { left, right }
    }
}

/// One learned rule: `(left, right) -> id`.
///
/// Rules are stored in training order, which is also merge priority order
/// when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRule {
    pub left: TokenId,
    pub right: TokenId,
    pub id: TokenId,
}

impl MergeRule {
    pub const fn new(pair: TokenPair, id: TokenId) -> Self {
        Self {
            left: pair.left,
            right: pair.right,
            id,
        }
    }

    pub const fn pair(&self) -> TokenPair {
        TokenPair::new(self.left, self.right)
    }
}

/// Map text to its base symbol sequence.
pub fn base_symbols(text: &str) -> Vec<TokenId> {
    text.chars().map(TokenId::from).collect()
}

/// Replace every non-overlapping occurrence of `pair`, scanning left to right.
///
/// A run of `k` identical symbols matching `(x, x)` yields `k / 2` merges.
pub(crate) fn replace_pair(ids: &[TokenId], pair: TokenPair, new_id: TokenId) -> Vec<TokenId> {
    let mut merged = Vec::with_capacity(ids.len());
    let mut i = 0;
    while i < ids.len() {
        if i + 1 < ids.len() && ids[i] == pair.left && ids[i + 1] == pair.right {
            merged.push(new_id);
            i += 2;
        } else {
            merged.push(ids[i]);
            i += 1;
        }
    }
    merged
}
