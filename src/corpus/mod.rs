/*!
Reading raw text into a segmented corpus
*/
use crate::config::EncoderConfig;
use crate::error::{Error, Result};
use crate::vocab::Vocabulary;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub mod tokenize;

/// Word tokens, grouped by sentence
pub type TokenCorpus = Vec<Vec<String>>;

/// The stem used for persisted fields of a literal-string source
pub const TEXT_STEM: &str = "text";

/// Where raw text comes from
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Source {
    /// A plain-text file, read whole
    Path(PathBuf),
    /// A literal string
    Text(String),
}

impl Source {
    /// A source reading from a file
    pub fn path(path: impl Into<PathBuf>) -> Source {
        Source::Path(path.into())
    }
    /// A source holding literal text
    pub fn text(text: impl Into<String>) -> Source {
        Source::Text(text.into())
    }
    /// Load the raw text of this source
    pub fn load(&self) -> Result<String> {
        match self {
            Source::Path(path) => fs::read_to_string(path).map_err(|err| Error::io(path, err)),
            Source::Text(text) => Ok(text.clone()),
        }
    }
    /// A human readable name for this source
    pub fn name(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Text(_) => TEXT_STEM.to_string(),
        }
    }
    /// The file name up to its first `.`, used to name the persisted data directory.
    ///
    /// Parent directories are dropped, so `texts/1984.txt` and `1984.txt` share the stem `1984` and their fields
    /// land under the same `<data root>/1984_data` directory.
    pub fn stem(&self) -> String {
        match self {
            Source::Path(path) => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match file_name.split('.').next() {
                    Some(stem) if !stem.is_empty() => stem.to_string(),
                    _ => file_name,
                }
            }
            Source::Text(_) => TEXT_STEM.to_string(),
        }
    }
}

/// Raw text together with its sentence and word segmentation
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Corpus {
    /// The full raw text
    pub raw: String,
    /// The sentences of the raw text, in order
    pub sentences: Vec<String>,
    /// The word tokens of each sentence
    pub tokens: TokenCorpus,
}

impl Corpus {
    /// Segment raw text into sentences and words
    pub fn segment(raw: String, sentence_segmented: bool) -> Corpus {
        let sentences = if sentence_segmented {
            tokenize::sentence_lines(&raw)
        } else {
            tokenize::sentences(&raw)
        };
        let tokens = sentences
            .iter()
            .map(|sentence| tokenize::words(sentence))
            .collect();
        Corpus {
            raw,
            sentences,
            tokens,
        }
    }
    /// Rebuild a corpus from its sentences, word-tokenizing each one
    pub fn from_sentences(sentences: Vec<String>) -> Corpus {
        let tokens = sentences
            .iter()
            .map(|sentence| tokenize::words(sentence))
            .collect();
        Corpus {
            raw: sentences.join("\n"),
            sentences,
            tokens,
        }
    }
    /// Rebuild a corpus from its word tokens. Sentences are the tokens joined by spaces.
    pub fn from_tokens(tokens: TokenCorpus) -> Corpus {
        let sentences: Vec<String> = tokens.iter().map(|sentence| sentence.join(" ")).collect();
        Corpus {
            raw: sentences.join("\n"),
            sentences,
            tokens,
        }
    }
    /// Iterate over every token of the corpus, in order
    pub fn flat_tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().flatten().map(String::as_str)
    }
    /// The total number of tokens in the corpus
    pub fn data_size(&self) -> usize {
        self.tokens.iter().map(Vec::len).sum()
    }
    /// The number of tokens in the longest sentence
    pub fn max_sentence_length(&self) -> usize {
        self.tokens.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Read a source into a corpus and build its vocabulary
pub fn read(source: &Source, config: &EncoderConfig) -> Result<(Corpus, Vocabulary)> {
    config.validate()?;
    let raw = source.load()?;
    let corpus = Corpus::segment(raw, config.sentence_segmented);
    let vocabulary = Vocabulary::build(corpus.flat_tokens(), config.vocabulary_fraction)?;
    debug!(
        source = %source.name(),
        sentences = corpus.sentences.len(),
        data_size = corpus.data_size(),
        vocab_size = vocabulary.len(),
        "read corpus"
    );
    Ok((corpus, vocabulary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::SENTINEL;

    #[test]
    fn source_stems() {
        assert_eq!(Source::path("1984.txt").stem(), "1984");
        assert_eq!(Source::path("books/moby.dick.txt").stem(), "moby");
        assert_eq!(Source::path("README").stem(), "README");
        // Parent directories do not take part in the stem
        assert_eq!(Source::path("texts/1984.txt").stem(), Source::path("1984.txt").stem());
        assert_eq!(Source::text("some text").stem(), TEXT_STEM);
    }

    #[test]
    fn segment_counts() {
        let corpus = Corpus::segment("The cat sat. The big dog ran away.".into(), false);
        assert_eq!(corpus.sentences.len(), 2);
        assert_eq!(corpus.tokens[0], vec!["The", "cat", "sat", "."]);
        assert_eq!(corpus.data_size(), 10);
        assert_eq!(corpus.max_sentence_length(), 6);
    }

    #[test]
    fn rebuild_from_parts() {
        let corpus = Corpus::segment("The cat sat. It's late.".into(), false);
        let from_sentences = Corpus::from_sentences(corpus.sentences.clone());
        assert_eq!(from_sentences.tokens, corpus.tokens);
        assert_eq!(from_sentences.raw, "The cat sat.\nIt's late.");
        let from_tokens = Corpus::from_tokens(corpus.tokens.clone());
        assert_eq!(from_tokens.tokens, corpus.tokens);
        assert_eq!(from_tokens.sentences, vec!["The cat sat .", "It 's late ."]);
        assert_eq!(from_tokens.data_size(), corpus.data_size());
    }

    #[test]
    fn read_literal_text() {
        let config = EncoderConfig::default();
        let (corpus, vocabulary) = read(&Source::text("a b a. c a b."), &config).unwrap();
        assert_eq!(corpus.data_size(), 8);
        assert_eq!(vocabulary.tokens(), &[SENTINEL, ".", "a", "b", "c"]);
    }

    #[test]
    fn read_presegmented() {
        let config = EncoderConfig::default().with_sentence_segmented(true);
        let (corpus, _) = read(&Source::text("no full stop here\nor here"), &config).unwrap();
        assert_eq!(corpus.sentences, vec!["no full stop here", "or here"]);
    }

    #[test]
    fn read_missing_file() {
        let config = EncoderConfig::default();
        match read(&Source::path("/definitely/not/a/file.txt"), &config) {
            Err(Error::Io { path, .. }) => assert_eq!(path, PathBuf::from("/definitely/not/a/file.txt")),
            other => panic!("expected an IO error, got {:?}", other),
        }
    }

    #[test]
    fn read_rejects_bad_fraction() {
        let config = EncoderConfig::default().with_fraction(0.0);
        assert!(matches!(
            read(&Source::text("a b"), &config),
            Err(Error::InvalidFraction(_))
        ));
    }
}
