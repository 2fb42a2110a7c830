/*!
The corpus encoder: pipeline state and the stages which fill it in
*/
use crate::config::EncoderConfig;
use crate::corpus::{self, Corpus, Source};
use crate::encode::one_hot::{one_hot_encode_indices, OneHotCorpus};
use crate::encode::{tokens_to_indices, IndexMapping, IndexedCorpus};
use crate::error::{Error, Result};
use crate::store::{Field, FieldStore, FieldValue};
use crate::vocab::Vocabulary;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Scalar statistics derived from the pipeline state
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct CorpusStats {
    /// The total number of tokens
    pub data_size: usize,
    /// The number of vocabulary entries, sentinel included
    pub vocab_size: usize,
    /// The number of tokens in the longest sentence
    pub max_sentence_length: usize,
}

/// Pipeline state for encoding a corpus.
///
/// Each stage reads the fields produced by earlier stages and fails with [`Error::MissingField`] if they have not
/// been produced yet. Running a stage again overwrites what it produced before.
#[derive(Debug, Clone, Default)]
pub struct CorpusEncoder {
    config: EncoderConfig,
    source: Option<Source>,
    corpus: Option<Corpus>,
    vocabulary: Option<Vocabulary>,
    mapping: Option<IndexMapping>,
    indices: Option<IndexedCorpus>,
    one_hot: Option<OneHotCorpus>,
    stats: CorpusStats,
}

impl CorpusEncoder {
    /// Create an empty encoder
    pub fn new(config: EncoderConfig) -> CorpusEncoder {
        CorpusEncoder {
            config,
            ..CorpusEncoder::default()
        }
    }
    /// This encoder's configuration
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
    /// The source last read
    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }
    /// The current scalar statistics
    pub fn stats(&self) -> CorpusStats {
        self.stats
    }
    /// The corpus last read
    pub fn corpus(&self) -> Result<&Corpus> {
        self.corpus.as_ref().ok_or(Error::MissingField(Field::Tokens))
    }
    /// The current vocabulary
    pub fn vocabulary(&self) -> Result<&Vocabulary> {
        self.vocabulary
            .as_ref()
            .ok_or(Error::MissingField(Field::UniqueTokens))
    }
    /// The current token to index mapping
    pub fn mapping(&self) -> Result<&IndexMapping> {
        self.mapping
            .as_ref()
            .ok_or(Error::MissingField(Field::TokenToIndex))
    }
    /// The current indexed corpus
    pub fn indices(&self) -> Result<&IndexedCorpus> {
        self.indices.as_ref().ok_or(Error::MissingField(Field::Indices))
    }
    /// The current one-hot corpus
    pub fn one_hot(&self) -> Result<&OneHotCorpus> {
        self.one_hot.as_ref().ok_or(Error::MissingField(Field::OneHot))
    }

    /// Drop everything derived from the vocabulary or the token corpus
    fn clear_derived(&mut self) {
        self.mapping = None;
        self.indices = None;
        self.one_hot = None;
    }
    /// Install a corpus restored from disk, dropping everything derived from the previous one
    fn install_corpus(&mut self, corpus: Corpus) {
        self.clear_derived();
        self.stats.data_size = corpus.data_size();
        self.stats.max_sentence_length = corpus.max_sentence_length();
        self.corpus = Some(corpus);
    }

    /// Read a source, replacing the corpus and vocabulary and dropping every later stage's output
    pub fn read(&mut self, source: Source) -> Result<&Corpus> {
        let (corpus, vocabulary) = corpus::read(&source, &self.config)?;
        self.clear_derived();
        self.stats.data_size = corpus.data_size();
        self.stats.vocab_size = vocabulary.len();
        self.stats.max_sentence_length = corpus.max_sentence_length();
        self.source = Some(source);
        self.vocabulary = Some(vocabulary);
        Ok(self.corpus.insert(corpus))
    }
    /// Map the stored tokens to indices against the stored vocabulary
    pub fn tokens_to_indices(&mut self) -> Result<&IndexedCorpus> {
        let vocabulary = self
            .vocabulary
            .as_ref()
            .ok_or(Error::MissingField(Field::UniqueTokens))?;
        let corpus = self.corpus.as_mut().ok_or(Error::MissingField(Field::Tokens))?;
        let (mapping, indices) = tokens_to_indices(&mut corpus.tokens, vocabulary);
        self.mapping = Some(mapping);
        Ok(self.indices.insert(indices))
    }
    /// One-hot encode the stored indices
    pub fn one_hot_encode_indices(&mut self) -> Result<&OneHotCorpus> {
        let indices = self.indices.as_ref().ok_or(Error::MissingField(Field::Indices))?;
        let vocab_size = self.vocabulary()?.len();
        let one_hot = one_hot_encode_indices(indices, vocab_size)?;
        self.stats.max_sentence_length = one_hot.max_sentence_length();
        Ok(self.one_hot.insert(one_hot))
    }
    /// Map the stored tokens to indices, then one-hot encode them
    pub fn one_hot_encode_tokens(&mut self) -> Result<&OneHotCorpus> {
        self.tokens_to_indices()?;
        self.one_hot_encode_indices()
    }
    /// Read a source and one-hot encode it, returning the source's name. Without a source, do nothing.
    pub fn run(&mut self, source: Option<Source>) -> Result<Option<String>> {
        let source = match source {
            Some(source) => source,
            None => {
                debug!("no source given, call read explicitly to load data");
                return Ok(None);
            }
        };
        let name = source.name();
        self.read(source)?;
        self.one_hot_encode_tokens()?;
        Ok(Some(name))
    }

    /// Point the encoder at a source without reading it, so that fields persisted from it can be restored.
    ///
    /// All state belonging to the previous source is dropped.
    pub fn set_source(&mut self, source: Source) {
        self.corpus = None;
        self.vocabulary = None;
        self.clear_derived();
        self.stats = CorpusStats::default();
        self.source = Some(source);
    }
    /// The store for the source last read
    pub fn store(&self) -> Result<FieldStore> {
        let source = self.source.as_ref().ok_or(Error::MissingField(Field::RawData))?;
        Ok(FieldStore::for_source(&self.config.data_root, source))
    }
    /// The current value of a field
    pub fn field_value(&self, field: Field) -> Result<FieldValue> {
        let value = match field {
            Field::RawData => FieldValue::Text(self.corpus()?.raw.clone()),
            Field::Sentences => FieldValue::Strings(self.corpus()?.sentences.clone()),
            Field::Tokens => FieldValue::TokenLists(self.corpus()?.tokens.clone()),
            Field::TokensFlat => {
                FieldValue::Strings(self.corpus()?.flat_tokens().map(String::from).collect())
            }
            Field::UniqueTokens => FieldValue::Strings(self.vocabulary()?.tokens().to_vec()),
            Field::TokenToIndex => FieldValue::TokenIndex(self.mapping()?.token_to_index().clone()),
            Field::IndexToToken => FieldValue::Strings(self.mapping()?.index_to_token().to_vec()),
            Field::Indices => FieldValue::IndexLists(self.indices()?.clone()),
            Field::IndexToOneHot => FieldValue::Matrix(self.one_hot()?.table().clone()),
            Field::OneHot => FieldValue::Matrices(self.one_hot()?.sentences().to_vec()),
            Field::DataSize => FieldValue::Count(self.corpus()?.data_size()),
            Field::VocabSize => FieldValue::Count(self.vocabulary()?.len()),
            Field::MaxSentenceLength => {
                self.indices.as_ref().ok_or(Error::MissingField(field))?;
                FieldValue::Count(self.stats.max_sentence_length)
            }
        };
        Ok(value)
    }
    /// Persist a field under the data directory of the source last read
    pub fn persist(&self, field: Field) -> Result<PathBuf> {
        let value = self.field_value(field)?;
        self.store()?.persist(field, &value)
    }
    /// Restore a field of the source last read, logging and returning `None` on failure.
    ///
    /// Restored fields which later stages consume are installed into the encoder, dropping whatever was derived
    /// from the value they replace:
    ///
    /// - `raw_data`, `sentences` and `tokens` install a corpus, so `tokens_to_indices` can run once a vocabulary is
    ///   present. Raw text is segmented with the encoder's configuration; sentences are word-tokenized.
    /// - `unique_tokens` installs the vocabulary.
    /// - `indices` installs the indexed corpus, so `one_hot_encode_indices` can run.
    ///
    /// Any other field is only returned.
    pub fn restore(&mut self, field: Field) -> Option<FieldValue> {
        let store = match self.store() {
            Ok(store) => store,
            Err(err) => {
                warn!(%field, "cannot restore: {}", err);
                return None;
            }
        };
        let value = store.restore(field)?;
        match (field, &value) {
            (Field::RawData, FieldValue::Text(raw)) => {
                let corpus = Corpus::segment(raw.clone(), self.config.sentence_segmented);
                self.install_corpus(corpus);
            }
            (Field::Sentences, FieldValue::Strings(sentences)) => {
                self.install_corpus(Corpus::from_sentences(sentences.clone()));
            }
            (Field::Tokens, FieldValue::TokenLists(tokens)) => {
                self.install_corpus(Corpus::from_tokens(tokens.clone()));
            }
            (Field::UniqueTokens, FieldValue::Strings(tokens)) => {
                match Vocabulary::from_tokens(tokens.clone()) {
                    Ok(vocabulary) => {
                        self.clear_derived();
                        self.stats.vocab_size = vocabulary.len();
                        self.vocabulary = Some(vocabulary);
                    }
                    Err(err) => warn!(%field, "restored vocabulary not installed: {}", err),
                }
            }
            (Field::Indices, FieldValue::IndexLists(indices)) => {
                self.one_hot = None;
                self.stats.data_size = indices.iter().map(Vec::len).sum();
                self.stats.max_sentence_length = indices.iter().map(Vec::len).max().unwrap_or(0);
                self.indices = Some(indices.clone());
            }
            _ => {}
        }
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::one_hot::one_hot_decode;
    use crate::vocab::{SENTINEL, SENTINEL_INDEX};

    const TEXT: &str = "The cat sat on the mat. The dog sat on the cat. A bird flew.";

    #[test]
    fn out_of_order_stages_fail() {
        let mut encoder = CorpusEncoder::default();
        assert!(matches!(
            encoder.tokens_to_indices(),
            Err(Error::MissingField(Field::UniqueTokens))
        ));
        assert!(matches!(
            encoder.one_hot_encode_indices(),
            Err(Error::MissingField(Field::Indices))
        ));
        assert!(matches!(
            encoder.persist(Field::Indices),
            Err(Error::MissingField(Field::Indices))
        ));
    }

    #[test]
    fn reading_again_drops_stale_stages() {
        let mut encoder = CorpusEncoder::default();
        encoder.run(Some(Source::text("a b c d e f g h."))).unwrap();
        assert!(encoder.indices().is_ok());
        encoder.read(Source::text("x.")).unwrap();
        assert_eq!(encoder.vocabulary().unwrap().tokens(), &[SENTINEL, ".", "x"]);
        assert!(matches!(encoder.indices(), Err(Error::MissingField(Field::Indices))));
        assert!(matches!(encoder.mapping(), Err(Error::MissingField(Field::TokenToIndex))));
        assert!(matches!(encoder.one_hot(), Err(Error::MissingField(Field::OneHot))));
        assert!(matches!(
            encoder.field_value(Field::IndexToToken),
            Err(Error::MissingField(Field::TokenToIndex))
        ));
        assert!(matches!(
            encoder.one_hot_encode_indices(),
            Err(Error::MissingField(Field::Indices))
        ));
        assert_eq!(
            encoder.one_hot_encode_tokens().unwrap().decode(),
            vec![vec![2, 1]]
        );
    }

    #[test]
    fn set_source_drops_previous_state() {
        let mut encoder = CorpusEncoder::default();
        encoder.run(Some(Source::text(TEXT))).unwrap();
        encoder.set_source(Source::path("other.txt"));
        assert!(encoder.corpus().is_err());
        assert!(encoder.vocabulary().is_err());
        assert!(encoder.indices().is_err());
        assert!(encoder.one_hot().is_err());
        assert_eq!(encoder.stats(), CorpusStats::default());
    }

    #[test]
    fn restored_fields_resume_the_pipeline() {
        let root = tempfile::tempdir().expect("Tempdir creation should not fail!");
        let config = EncoderConfig::default().with_data_root(root.path());
        let mut encoder = CorpusEncoder::new(config.clone());
        encoder.run(Some(Source::text(TEXT))).unwrap();
        for field in &[Field::Tokens, Field::Sentences, Field::UniqueTokens, Field::Indices] {
            encoder.persist(*field).unwrap();
        }

        let mut restored = CorpusEncoder::new(config);
        restored.set_source(Source::text(TEXT));
        assert!(restored.restore(Field::Sentences).is_some());
        assert_eq!(restored.corpus().unwrap().sentences, encoder.corpus().unwrap().sentences);
        assert!(restored.restore(Field::Tokens).is_some());
        assert!(restored.restore(Field::UniqueTokens).is_some());
        assert_eq!(restored.tokens_to_indices().unwrap(), encoder.indices().unwrap());
        assert_eq!(restored.stats(), encoder.stats());

        // A new vocabulary invalidates indices computed against the old one
        assert!(restored.restore(Field::UniqueTokens).is_some());
        assert!(matches!(restored.indices(), Err(Error::MissingField(Field::Indices))));
        assert!(restored.restore(Field::Indices).is_some());
        assert_eq!(restored.one_hot_encode_indices().unwrap(), encoder.one_hot().unwrap());
    }

    #[test]
    fn full_pipeline() {
        let mut encoder = CorpusEncoder::new(EncoderConfig::default());
        let name = encoder.run(Some(Source::text(TEXT))).unwrap();
        assert_eq!(name.as_deref(), Some("text"));
        let stats = encoder.stats();
        assert_eq!(stats.data_size, 18);
        assert_eq!(stats.vocab_size, encoder.vocabulary().unwrap().len());
        assert_eq!(stats.max_sentence_length, 7);

        let indices = encoder.indices().unwrap().clone();
        let one_hot = encoder.one_hot().unwrap();
        assert_eq!(one_hot.len(), 3);
        for (sentence, encoded) in indices.iter().zip(one_hot.sentences()) {
            assert_eq!(one_hot_decode(encoded).unwrap().into_indices(), *sentence);
        }
    }

    #[test]
    fn run_without_source_is_a_no_op() {
        let mut encoder = CorpusEncoder::default();
        assert_eq!(encoder.run(None).unwrap(), None);
        assert!(encoder.corpus().is_err());
        assert_eq!(encoder.stats(), CorpusStats::default());
    }

    #[test]
    fn truncated_vocabulary_replaces_tokens() {
        let mut encoder = CorpusEncoder::new(EncoderConfig::default().with_fraction(0.01));
        encoder.run(Some(Source::text(TEXT))).unwrap();
        assert_eq!(encoder.vocabulary().unwrap().tokens(), &[SENTINEL]);
        assert!(encoder
            .indices()
            .unwrap()
            .iter()
            .flatten()
            .all(|&index| index == SENTINEL_INDEX));
        assert!(encoder
            .corpus()
            .unwrap()
            .flat_tokens()
            .all(|token| token == SENTINEL));
    }

    #[test]
    fn field_values_follow_state() {
        let mut encoder = CorpusEncoder::default();
        encoder.read(Source::text("b a b.")).unwrap();
        assert_eq!(encoder.field_value(Field::DataSize).unwrap(), FieldValue::Count(4));
        assert_eq!(encoder.field_value(Field::VocabSize).unwrap(), FieldValue::Count(4));
        assert!(encoder.field_value(Field::TokenToIndex).is_err());
        encoder.one_hot_encode_tokens().unwrap();
        assert_eq!(
            encoder.field_value(Field::Indices).unwrap(),
            FieldValue::IndexLists(vec![vec![3, 2, 3, 1]])
        );
        assert_eq!(
            encoder.field_value(Field::MaxSentenceLength).unwrap(),
            FieldValue::Count(4)
        );
    }
}
