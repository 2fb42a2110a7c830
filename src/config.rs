/*!
Encoder configuration
*/
use crate::error::{Error, Result};
use std::path::PathBuf;

/// The vocabulary fraction keeping every distinct token
pub const FULL_VOCABULARY: f64 = 1.0;

/// Settings shared by every stage of a [`CorpusEncoder`](crate::encoder::CorpusEncoder)
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderConfig {
    /// The proportion of distinct tokens, ranked by frequency, kept in the vocabulary. Must lie in (0, 1].
    pub vocabulary_fraction: f64,
    /// Whether the input is already split into sentences, one per line
    pub sentence_segmented: bool,
    /// The directory under which persisted fields are written
    pub data_root: PathBuf,
}

impl Default for EncoderConfig {
    fn default() -> EncoderConfig {
        EncoderConfig {
            vocabulary_fraction: FULL_VOCABULARY,
            sentence_segmented: false,
            data_root: PathBuf::from("."),
        }
    }
}

impl EncoderConfig {
    /// Set the vocabulary fraction
    pub fn with_fraction(mut self, vocabulary_fraction: f64) -> EncoderConfig {
        self.vocabulary_fraction = vocabulary_fraction;
        self
    }
    /// Set whether input is already segmented into sentences
    pub fn with_sentence_segmented(mut self, sentence_segmented: bool) -> EncoderConfig {
        self.sentence_segmented = sentence_segmented;
        self
    }
    /// Set the root directory for persisted fields
    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> EncoderConfig {
        self.data_root = data_root.into();
        self
    }
    /// Check that this configuration is usable
    pub fn validate(&self) -> Result<()> {
        check_fraction(self.vocabulary_fraction)
    }
}

/// Check that a vocabulary fraction lies in (0, 1]
pub fn check_fraction(fraction: f64) -> Result<()> {
    // NaN fails both comparisons
    if fraction > 0.0 && fraction <= FULL_VOCABULARY {
        Ok(())
    } else {
        Err(Error::InvalidFraction(fraction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EncoderConfig::default();
        assert_eq!(config.vocabulary_fraction, 1.0);
        assert!(!config.sentence_segmented);
        config.validate().unwrap();
    }

    #[test]
    fn fraction_bounds() {
        assert!(check_fraction(0.5).is_ok());
        assert!(check_fraction(1.0).is_ok());
        assert!(check_fraction(1e-9).is_ok());
        for bad in &[0.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            match check_fraction(*bad) {
                Err(Error::InvalidFraction(_)) => {}
                other => panic!("fraction {} gave {:?}", bad, other),
            }
        }
    }

    #[test]
    fn builder_setters() {
        let config = EncoderConfig::default()
            .with_fraction(0.25)
            .with_sentence_segmented(true)
            .with_data_root("/tmp/encoder");
        assert_eq!(config.vocabulary_fraction, 0.25);
        assert!(config.sentence_segmented);
        assert_eq!(config.data_root, PathBuf::from("/tmp/encoder"));
    }
}
