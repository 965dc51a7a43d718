//! Encoding and decoding against a trained [`MergeTable`].

use crate::error::{TokenizerError, TokenizerResult};
use crate::table::MergeTable;
use crate::types::{TokenId, TokenPair, base_symbols, replace_pair};

impl MergeTable {
    /// Encode `text` into token ids.
    ///
    /// Each pass merges the applicable pair whose rule was learned earliest
    /// (lowest minted id), then rescans. Stops when no adjacent pair has a
    /// rule. The result depends only on the rule order, never on map
    /// iteration order.
    pub fn encode(&self, text: &str) -> Vec<TokenId> {
        let mut ids = base_symbols(text);

        while ids.len() >= 2 {
            let next = ids
                .windows(2)
                .filter_map(|w| {
                    let pair = TokenPair::new(w[0], w[1]);
                    self.merged_id(pair).map(|id| (id, pair))
                })
                .min_by_key(|(id, _)| *id);

            let Some((id, pair)) = next else {
                break;
            };
            ids = replace_pair(&ids, pair, id);
        }

        ids
    }

    /// Decode token ids back into text.
    ///
    /// Merged ids expand depth-first, left before right, until only base
    /// symbols remain. Ids that are neither minted nor valid base symbols
    /// fail with `UnknownToken`.
    pub fn decode(&self, tokens: &[TokenId]) -> TokenizerResult<String> {
        self.expand(tokens, |id| self.base_symbol(id))
    }

    /// Text of a single token as produced by [`encode`](Self::encode).
    ///
    /// Unlike `decode`, ids that are not minted render as their code point
    /// even at or above the first minted id, since `encode` passes such
    /// characters through untouched.
    pub fn token_text(&self, id: TokenId) -> TokenizerResult<String> {
        self.expand(&[id], |id| {
            char::from_u32(id).ok_or(TokenizerError::UnknownToken(id))
        })
    }

    /// Text of each token, in order.
    pub fn token_texts(&self, ids: &[TokenId]) -> TokenizerResult<Vec<String>> {
        ids.iter().map(|&id| self.token_text(id)).collect()
    }

    fn expand<F>(&self, tokens: &[TokenId], base: F) -> TokenizerResult<String>
    where
        F: Fn(TokenId) -> TokenizerResult<char>,
    {
        let mut text = String::with_capacity(tokens.len());
        let mut stack: Vec<TokenId> = Vec::new();

        for &token in tokens {
            stack.push(token);
            while let Some(id) = stack.pop() {
                match self.pair_of(id) {
                    Some(pair) => {
                        stack.push(pair.right);
                        stack.push(pair.left);
                    }
                    None => text.push(base(id)?),
                }
            }
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;
    use crate::trainer::{Trainer, TrainingConfig};
    use crate::types::MergeRule;

    const A: TokenId = 'a' as TokenId;
    const B: TokenId = 'b' as TokenId;
    const C: TokenId = 'c' as TokenId;

    fn small_table() -> MergeTable {
        MergeTable::from_rules(vec![
            MergeRule { left: A, right: A, id: 100 },
            MergeRule { left: A, right: B, id: 101 },
            MergeRule { left: 100, right: 101, id: 102 },
        ])
        .unwrap()
    }

    #[test]
    fn test_encode_empty_string() {
        assert!(small_table().encode("").is_empty());
        assert!(MergeTable::default().encode("").is_empty());
    }

    #[test]
    fn test_encode_prefers_earliest_rule() {
        let table = small_table();
        // "aab": (a,a)=100 beats (a,b)=101, leaving [100, b].
        assert_eq!(table.encode("aab"), vec![100, B]);
        // "aaab": (a,a) first -> [100, a, b], then (a,b) -> [100, 101], then 102.
        assert_eq!(table.encode("aaab"), vec![102]);
    }

    #[test]
    fn test_encode_passes_unknown_symbols_through() {
        let table = small_table();
        assert_eq!(table.encode("cab"), vec![C, 101]);
        assert_eq!(table.encode("z"), vec!['z' as TokenId]);
    }

    #[test]
    fn test_decode_expands_nested_tokens() {
        let table = small_table();
        assert_eq!(table.decode(&[102]).unwrap(), "aaab");
        assert_eq!(table.decode(&[C, 102, 100]).unwrap(), "caaabaa");
        assert_eq!(table.decode(&[]).unwrap(), "");
    }

    #[test]
    fn test_decode_unknown_token() {
        let table = small_table();
        assert!(matches!(
            table.decode(&[A, 150]),
            Err(TokenizerError::UnknownToken(150))
        ));
        // Surrogates are not valid base symbols.
        assert!(matches!(
            MergeTable::default().decode(&[0xD800]),
            Err(TokenizerError::UnknownToken(0xD800))
        ));
    }

    #[test]
    fn test_token_texts_of_characters_above_minted_ids() {
        let table = small_table();
        // 'h' and 'é' sit above the first minted id but were never minted
        let tokens = table.encode("hé");
        assert_eq!(tokens, vec!['h' as TokenId, 'é' as TokenId]);
        assert_eq!(
            table.token_texts(&tokens).unwrap(),
            vec!["h".to_string(), "é".to_string()]
        );
        assert!(matches!(
            table.decode(&tokens),
            Err(TokenizerError::UnknownToken(104))
        ));
    }

    #[test]
    fn test_round_trip_on_trained_table() {
        let lines = [
            "the quick brown fox jumps over the lazy dog",
            "the lazy dog sleeps under the brown tree",
            "quick thinking saves the day",
        ];
        let trainer = Trainer::new(TrainingConfig::new(10.0).with_max_merges(10));
        let (table, _) = trainer.train(Corpus::from_lines(lines)).unwrap();

        for text in lines.iter().copied().chain(["the dog", "brown fox", "a"]) {
            let tokens = table.encode(text);
            assert_eq!(table.decode(&tokens).unwrap(), text);
        }
    }

    #[test]
    fn test_encode_is_deterministic() {
        let table = small_table();
        let first = table.encode("aaabaabab");
        for _ in 0..10 {
            assert_eq!(table.encode("aaabaabab"), first);
        }
        assert_eq!(table.clone().encode("aaabaabab"), first);
    }
}
