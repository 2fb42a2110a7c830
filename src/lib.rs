/*!
Turn a raw text corpus into the index and one-hot representations a sequence model consumes.

The pipeline reads text, segments it into sentences and words, builds a frequency-ranked vocabulary with a
sentinel token at index 0, maps every token to its vocabulary index, and expands indices into one-hot vectors.
Any field of the pipeline state can be persisted to, and restored from, its own file on disk.

```
use corpus_encoder::{CorpusEncoder, EncoderConfig, Source};

let mut encoder = CorpusEncoder::new(EncoderConfig::default().with_fraction(0.5));
encoder.run(Some(Source::text("The cat sat. The dog sat.")))?;
assert_eq!(encoder.stats().max_sentence_length, 4);
# Ok::<(), corpus_encoder::Error>(())
```
*/
#![forbid(missing_docs)]

pub mod config;
pub mod corpus;
pub mod encode;
pub mod encoder;
pub mod error;
pub mod store;
#[cfg(feature = "torch")]
pub mod tensor;
pub mod vocab;

pub use config::EncoderConfig;
pub use corpus::{read, Corpus, Source};
pub use encode::one_hot::{one_hot_decode, one_hot_encode_indices, Decoded, OneHotCorpus};
pub use encode::{one_hot_encode_tokens, tokens_to_indices, IndexMapping, IndexedCorpus};
pub use encoder::{CorpusEncoder, CorpusStats};
pub use error::{Error, Result};
pub use store::{Field, FieldStore, FieldValue};
pub use vocab::{Vocabulary, SENTINEL};
