/*!
Vocabulary construction

A vocabulary is an ordered list of unique tokens. Position 0 always holds the [`SENTINEL`], which stands in for
every token left out of the vocabulary.
*/
use crate::config::{check_fraction, FULL_VOCABULARY};
use crate::error::{Error, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// The token standing in for anything outside the vocabulary
pub const SENTINEL: &str = "<unk>";

/// The index of the [`SENTINEL`] in every vocabulary
pub const SENTINEL_INDEX: usize = 0;

/// Token counts over a corpus, remembering the order in which tokens were first seen
#[derive(Debug, Clone, Default)]
pub struct Frequencies<'a> {
    counts: HashMap<&'a str, usize>,
    order: Vec<&'a str>,
}

impl<'a> Frequencies<'a> {
    /// Count tokens. The sentinel itself is never counted.
    pub fn count<I: IntoIterator<Item = &'a str>>(tokens: I) -> Frequencies<'a> {
        let mut freqs = Frequencies::default();
        for token in tokens {
            if token == SENTINEL {
                continue;
            }
            match freqs.counts.entry(token) {
                Entry::Occupied(mut count) => *count.get_mut() += 1,
                Entry::Vacant(count) => {
                    count.insert(1);
                    freqs.order.push(token);
                }
            }
        }
        freqs
    }
    /// The number of distinct tokens counted
    pub fn distinct(&self) -> usize {
        self.order.len()
    }
    /// How often a token was seen
    pub fn get(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }
    /// The `n` most frequent tokens, by descending count. Equal counts keep first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<&'a str> {
        // `sorted_by` is a stable sort
        self.order
            .iter()
            .copied()
            .sorted_by(|a, b| self.counts[b].cmp(&self.counts[a]))
            .take(n)
            .collect()
    }
    /// Every distinct token, sorted alphabetically
    pub fn alphabetical(&self) -> Vec<&'a str> {
        self.order.iter().copied().sorted().collect()
    }
}

/// An ordered set of tokens with the sentinel at index 0
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Vocabulary {
    tokens: Vec<String>,
}

impl Vocabulary {
    /// Build a vocabulary from a token stream.
    ///
    /// With a fraction of 1 every distinct token is kept, sorted alphabetically. Otherwise the
    /// `floor(fraction * distinct)` most frequent tokens are kept, by descending frequency.
    pub fn build<'a, I: IntoIterator<Item = &'a str>>(tokens: I, fraction: f64) -> Result<Vocabulary> {
        check_fraction(fraction)?;
        let freqs = Frequencies::count(tokens);
        let kept = if fraction >= FULL_VOCABULARY {
            freqs.alphabetical()
        } else {
            let n = (fraction * freqs.distinct() as f64).floor() as usize;
            freqs.most_common(n)
        };
        let mut tokens = Vec::with_capacity(kept.len() + 1);
        tokens.push(SENTINEL.to_string());
        tokens.extend(kept.into_iter().map(String::from));
        Ok(Vocabulary { tokens })
    }
    /// A vocabulary holding only the sentinel
    pub fn sentinel_only() -> Vocabulary {
        Vocabulary {
            tokens: vec![SENTINEL.to_string()],
        }
    }
    /// Wrap an existing token list, checking that it starts with the sentinel and holds no duplicates
    pub fn from_tokens(tokens: Vec<String>) -> Result<Vocabulary> {
        if tokens.first().map(String::as_str) != Some(SENTINEL) {
            return Err(Error::InvalidVocabulary(format!(
                "the first token must be {:?}",
                SENTINEL
            )));
        }
        let mut seen = HashSet::with_capacity(tokens.len());
        if let Some(duplicate) = tokens.iter().find(|token| !seen.insert(token.as_str())) {
            return Err(Error::InvalidVocabulary(format!(
                "{:?} appears more than once",
                duplicate
            )));
        }
        Ok(Vocabulary { tokens })
    }
    /// The number of tokens, including the sentinel
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
    /// Always false: the sentinel is always present
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
    /// The tokens in index order
    #[inline]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
    /// The token at an index
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }
    /// Unwrap into the token list
    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }
}
