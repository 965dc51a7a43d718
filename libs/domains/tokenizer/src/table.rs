//! Immutable, bidirectional merge table.

use std::collections::HashMap;

use crate::error::{TokenizerError, TokenizerResult};
use crate::types::{MergeRule, TokenId, TokenPair};

/// Ordered merge rules plus forward (pair -> id) and reverse (id -> pair)
/// lookups derived from them.
///
/// Construction validates the rule list, after which the table is never
/// mutated. Share it across tasks behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct MergeTable {
    rules: Vec<MergeRule>,
    forward: HashMap<TokenPair, TokenId>,
    reverse: HashMap<TokenId, TokenPair>,
}

impl PartialEq for MergeTable {
    fn eq(&self, other: &Self) -> bool {
        self.rules == other.rules
    }
}

impl Eq for MergeTable {}

impl MergeTable {
    /// Build a table from rules in training order.
    ///
    /// Rejects rule lists whose ids are not strictly increasing, that repeat
    /// a pair, or that reference an id which is neither a base symbol nor
    /// minted by an earlier rule. The last check rules out cycles.
    pub fn from_rules(rules: Vec<MergeRule>) -> TokenizerResult<Self> {
        let mut forward = HashMap::with_capacity(rules.len());
        let mut reverse = HashMap::with_capacity(rules.len());

        let first_minted = match rules.first() {
            Some(rule) => rule.id,
            None => return Ok(Self::default()),
        };

        let mut previous: Option<TokenId> = None;
        for (index, rule) in rules.iter().enumerate() {
            if previous.is_some_and(|prev| rule.id <= prev) {
                return Err(TokenizerError::corrupt(format!(
                    "rule {} has id {} which does not increase on the previous rule",
                    index, rule.id
                )));
            }

            for part in [rule.left, rule.right] {
                let is_base = part < first_minted && char::from_u32(part).is_some();
                if !is_base && !reverse.contains_key(&part) {
                    return Err(TokenizerError::corrupt(format!(
                        "rule {} references id {} which is neither a base symbol nor an earlier merge",
                        index, part
                    )));
                }
            }

            let pair = rule.pair();
            if forward.insert(pair, rule.id).is_some() {
                return Err(TokenizerError::corrupt(format!(
                    "rule {} repeats pair ({}, {})",
                    index, pair.left, pair.right
                )));
            }
            reverse.insert(rule.id, pair);
            previous = Some(rule.id);
        }

        Ok(Self {
            rules,
            forward,
            reverse,
        })
    }

    pub fn rules(&self) -> &[MergeRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Id minted for `pair`, if it was learned.
    pub fn merged_id(&self, pair: TokenPair) -> Option<TokenId> {
        self.forward.get(&pair).copied()
    }

    /// The pair that `id` was minted from, if it is a merged token.
    pub fn pair_of(&self, id: TokenId) -> Option<TokenPair> {
        self.reverse.get(&id).copied()
    }

    /// Lowest minted id; every id below it is a base symbol.
    pub fn first_minted_id(&self) -> Option<TokenId> {
        self.rules.first().map(|rule| rule.id)
    }

    /// Highest id in use plus one. Zero for an empty table.
    pub fn vocabulary_size(&self) -> u64 {
        self.rules
            .last()
            .map_or(0, |rule| u64::from(rule.id) + 1)
    }

    pub(crate) fn base_symbol(&self, id: TokenId) -> TokenizerResult<char> {
        if self.first_minted_id().is_some_and(|first| id >= first) {
            return Err(TokenizerError::UnknownToken(id));
        }
        char::from_u32(id).ok_or(TokenizerError::UnknownToken(id))
    }
}
