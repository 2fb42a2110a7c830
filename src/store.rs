/*!
Best-effort persistence of individual pipeline fields

Each field lives in its own file, `<data root>/<source stem>_data/pickled_data/<field name>`. A file holds a bincode
envelope carrying the format version, the field it stores, and a value with that field's schema.
*/
use crate::corpus::Source;
use crate::error::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info};

/// The version of the persisted field format
pub const FORMAT_VERSION: u32 = 1;

/// Appended to the source stem to name its data directory
pub const DATA_SUFFIX: &str = "_data";

/// The subdirectory of the data directory holding field files
pub const FIELD_DIR: &str = "pickled_data";

/// Appended to a field's file name while it is being written
pub const PARTIAL_SUFFIX: &str = ".partial";

/// A named piece of pipeline state
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// The full raw text
    RawData,
    /// The sentence segmentation
    Sentences,
    /// The word tokens of each sentence
    Tokens,
    /// Every word token, in order
    TokensFlat,
    /// The vocabulary, sentinel first
    UniqueTokens,
    /// The token to index map
    TokenToIndex,
    /// The index to token list
    IndexToToken,
    /// The indexed corpus
    Indices,
    /// The index to one-hot lookup table
    IndexToOneHot,
    /// The one-hot corpus
    OneHot,
    /// The total number of tokens
    DataSize,
    /// The number of vocabulary entries
    VocabSize,
    /// The number of tokens in the longest sentence
    MaxSentenceLength,
}

impl Field {
    /// Every field
    pub const ALL: [Field; 13] = [
        Field::RawData,
        Field::Sentences,
        Field::Tokens,
        Field::TokensFlat,
        Field::UniqueTokens,
        Field::TokenToIndex,
        Field::IndexToToken,
        Field::Indices,
        Field::IndexToOneHot,
        Field::OneHot,
        Field::DataSize,
        Field::VocabSize,
        Field::MaxSentenceLength,
    ];

    /// The fields saved by default after encoding a file
    pub const DEFAULT_SAVED: [Field; 6] = [
        Field::IndexToToken,
        Field::TokenToIndex,
        Field::IndexToOneHot,
        Field::Sentences,
        Field::Indices,
        Field::UniqueTokens,
    ];

    /// This field's name, which is also its file name
    pub fn name(self) -> &'static str {
        match self {
            Field::RawData => "raw_data",
            Field::Sentences => "sentences",
            Field::Tokens => "tokens",
            Field::TokensFlat => "tokens_flat",
            Field::UniqueTokens => "unique_tokens",
            Field::TokenToIndex => "token_to_index",
            Field::IndexToToken => "index_to_token",
            Field::Indices => "indices",
            Field::IndexToOneHot => "index_to_one_hot",
            Field::OneHot => "one_hot",
            Field::DataSize => "data_size",
            Field::VocabSize => "vocab_size",
            Field::MaxSentenceLength => "max_sentence_length",
        }
    }

    /// Whether a value has the schema this field is stored with
    pub fn accepts(self, value: &FieldValue) -> bool {
        use FieldValue::*;
        match self {
            Field::RawData => matches!(value, Text(_)),
            Field::Sentences | Field::TokensFlat | Field::UniqueTokens | Field::IndexToToken => {
                matches!(value, Strings(_))
            }
            Field::Tokens => matches!(value, TokenLists(_)),
            Field::TokenToIndex => matches!(value, TokenIndex(_)),
            Field::Indices => matches!(value, IndexLists(_)),
            Field::IndexToOneHot => matches!(value, Matrix(_)),
            Field::OneHot => matches!(value, Matrices(_)),
            Field::DataSize | Field::VocabSize | Field::MaxSentenceLength => matches!(value, Count(_)),
        }
    }
}

impl Display for Field {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = Error;
    fn from_str(name: &str) -> Result<Field> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }
}

/// The stored value of a field
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// A single string
    Text(String),
    /// A list of strings
    Strings(Vec<String>),
    /// A list of string lists
    TokenLists(Vec<Vec<String>>),
    /// A list of index lists
    IndexLists(Vec<Vec<usize>>),
    /// A map from tokens to indices
    TokenIndex(BTreeMap<String, usize>),
    /// A boolean matrix
    Matrix(Array2<bool>),
    /// A list of boolean matrices
    Matrices(Vec<Array2<bool>>),
    /// A count
    Count(usize),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    field: Field,
    value: &'a FieldValue,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    field: Field,
    value: FieldValue,
}

/// A directory of persisted fields
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FieldStore {
    dir: PathBuf,
}

impl FieldStore {
    /// A store writing directly into `dir`
    pub fn new(dir: impl Into<PathBuf>) -> FieldStore {
        FieldStore { dir: dir.into() }
    }
    /// The store for a source: `<root>/<stem>_data/pickled_data`
    pub fn for_source(root: &Path, source: &Source) -> FieldStore {
        let data_dir = format!("{}{}", source.stem(), DATA_SUFFIX);
        FieldStore::new(root.join(data_dir).join(FIELD_DIR))
    }
    /// The directory holding field files
    pub fn dir(&self) -> &Path {
        &self.dir
    }
    /// The file a field is stored in
    pub fn path(&self, field: Field) -> PathBuf {
        self.dir.join(field.name())
    }
    /// Write a field, creating the store directory if needed. Returns the written path.
    pub fn persist(&self, field: Field, value: &FieldValue) -> Result<PathBuf> {
        if !field.accepts(value) {
            return Err(Error::SchemaMismatch(field));
        }
        fs::create_dir_all(&self.dir).map_err(|err| Error::io(&self.dir, err))?;
        let path = self.path(field);
        // Write beside the target and rename, so a failed write never replaces a good file
        let partial = self.partial_path(field);
        let written = self.write_envelope(&partial, field, value);
        if let Err(err) = written {
            let _ = fs::remove_file(&partial);
            return Err(err);
        }
        fs::rename(&partial, &path).map_err(|err| Error::io(&path, err))?;
        info!(%field, path = %path.display(), "persisted field");
        Ok(path)
    }
    /// The scratch file a field is written to before it replaces the stored file
    fn partial_path(&self, field: Field) -> PathBuf {
        self.dir.join(format!("{}{}", field.name(), PARTIAL_SUFFIX))
    }
    fn write_envelope(&self, partial: &Path, field: Field, value: &FieldValue) -> Result<()> {
        let file = File::create(partial).map_err(|err| Error::io(partial, err))?;
        let mut writer = BufWriter::new(file);
        let envelope = EnvelopeRef {
            version: FORMAT_VERSION,
            field,
            value,
        };
        bincode::serialize_into(&mut writer, &envelope)?;
        writer.flush().map_err(|err| Error::io(partial, err))?;
        Ok(())
    }
    /// Read a field back
    pub fn try_restore(&self, field: Field) -> Result<FieldValue> {
        let path = self.path(field);
        let file = File::open(&path).map_err(|err| Error::io(&path, err))?;
        let envelope: Envelope = bincode::deserialize_from(BufReader::new(file))?;
        if envelope.version != FORMAT_VERSION {
            return Err(Error::VersionMismatch {
                path,
                found: envelope.version,
                expected: FORMAT_VERSION,
            });
        }
        if envelope.field != field {
            return Err(Error::FieldMismatch {
                path,
                found: envelope.field,
                expected: field,
            });
        }
        if !field.accepts(&envelope.value) {
            return Err(Error::SchemaMismatch(field));
        }
        Ok(envelope.value)
    }
    /// Read a field back, logging and returning `None` if it is missing or unreadable
    pub fn restore(&self, field: Field) -> Option<FieldValue> {
        match self.try_restore(field) {
            Ok(value) => Some(value),
            Err(err) => {
                error!(%field, path = %self.path(field).display(), "unable to restore field: {}", err);
                info!(%field, "restore failure: {:?}", err);
                None
            }
        }
    }
}
