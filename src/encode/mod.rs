/*!
Mapping tokens to vocabulary indices
*/
use crate::corpus::TokenCorpus;
use crate::error::Result;
use crate::vocab::{Vocabulary, SENTINEL, SENTINEL_INDEX};
use std::collections::BTreeMap;
use tracing::debug;

pub mod one_hot;

use one_hot::{one_hot_encode_indices, OneHotCorpus};

/// Vocabulary indices, grouped by sentence
pub type IndexedCorpus = Vec<Vec<usize>>;

/// The two inverse mappings between tokens and vocabulary positions
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct IndexMapping {
    token_to_index: BTreeMap<String, usize>,
    index_to_token: Vec<String>,
}

impl IndexMapping {
    /// Derive the mapping from a vocabulary's order
    pub fn new(vocabulary: &Vocabulary) -> IndexMapping {
        let index_to_token = vocabulary.tokens().to_vec();
        let token_to_index = index_to_token
            .iter()
            .enumerate()
            .map(|(index, token)| (token.clone(), index))
            .collect();
        IndexMapping {
            token_to_index,
            index_to_token,
        }
    }
    /// The number of tokens mapped
    #[inline]
    pub fn len(&self) -> usize {
        self.index_to_token.len()
    }
    /// Whether the mapping is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index_to_token.is_empty()
    }
    /// The index of a token, if it is in the vocabulary
    #[inline]
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.token_to_index.get(token).copied()
    }
    /// The token at an index
    #[inline]
    pub fn token_at(&self, index: usize) -> Option<&str> {
        self.index_to_token.get(index).map(String::as_str)
    }
    /// Whether a token is one of the vocabulary's non-sentinel entries
    #[inline]
    pub fn is_known(&self, token: &str) -> bool {
        matches!(self.index_of(token), Some(index) if index != SENTINEL_INDEX)
    }
    /// The token to index map
    pub fn token_to_index(&self) -> &BTreeMap<String, usize> {
        &self.token_to_index
    }
    /// The index to token list
    pub fn index_to_token(&self) -> &[String] {
        &self.index_to_token
    }
}

/// Replace out-of-vocabulary tokens with the sentinel, in place, then map every token to its index.
///
/// The output has the same nesting as `tokens`.
pub fn tokens_to_indices(tokens: &mut TokenCorpus, vocabulary: &Vocabulary) -> (IndexMapping, IndexedCorpus) {
    let mapping = IndexMapping::new(vocabulary);
    let mut replaced = 0;
    for sentence in tokens.iter_mut() {
        for token in sentence.iter_mut() {
            if token.as_str() != SENTINEL && !mapping.is_known(token) {
                *token = SENTINEL.to_string();
                replaced += 1;
            }
        }
    }
    let indices: IndexedCorpus = tokens
        .iter()
        .map(|sentence| {
            sentence
                .iter()
                .map(|token| mapping.index_of(token).unwrap_or(SENTINEL_INDEX))
                .collect()
        })
        .collect();
    debug!(
        sentences = indices.len(),
        vocab_size = mapping.len(),
        replaced,
        "mapped tokens to indices"
    );
    (mapping, indices)
}

/// Map tokens to indices, then one-hot encode them against the same vocabulary
pub fn one_hot_encode_tokens(
    tokens: &mut TokenCorpus,
    vocabulary: &Vocabulary,
) -> Result<(IndexMapping, IndexedCorpus, OneHotCorpus)> {
    let (mapping, indices) = tokens_to_indices(tokens, vocabulary);
    let one_hot = one_hot_encode_indices(&indices, vocabulary.len())?;
    Ok((mapping, indices, one_hot))
}
