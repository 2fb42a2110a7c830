/*!
One-hot encoding and decoding of vocabulary indices
*/
use super::IndexedCorpus;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayBase, Axis, Data, Dimension};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The index to one-hot lookup table: row `i` is the unit vector with bit `i` set
pub fn one_hot_table(vocabulary_size: usize) -> Array2<bool> {
    Array2::from_shape_fn((vocabulary_size, vocabulary_size), |(row, col)| row == col)
}

/// A one-hot encoded corpus. Each sentence is a `tokens x vocabulary_size` boolean matrix.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct OneHotCorpus {
    table: Array2<bool>,
    sentences: Vec<Array2<bool>>,
    max_sentence_length: usize,
}

impl OneHotCorpus {
    /// The index to one-hot lookup table used for this corpus
    pub fn table(&self) -> &Array2<bool> {
        &self.table
    }
    /// The encoded sentences
    pub fn sentences(&self) -> &[Array2<bool>] {
        &self.sentences
    }
    /// The number of tokens in the longest sentence
    pub fn max_sentence_length(&self) -> usize {
        self.max_sentence_length
    }
    /// The width of every one-hot vector
    pub fn vocabulary_size(&self) -> usize {
        self.table.nrows()
    }
    /// The number of sentences
    pub fn len(&self) -> usize {
        self.sentences.len()
    }
    /// Whether there are no sentences
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
    /// Decode every sentence back to indices
    pub fn decode(&self) -> IndexedCorpus {
        self.sentences.iter().map(|sentence| decode_rows(sentence)).collect()
    }
}

/// One-hot encode an indexed corpus, keeping its sentence nesting
pub fn one_hot_encode_indices(indices: &[Vec<usize>], vocabulary_size: usize) -> Result<OneHotCorpus> {
    let table = one_hot_table(vocabulary_size);
    let mut sentences = Vec::with_capacity(indices.len());
    for sentence in indices {
        let mut encoded = Array2::from_elem((sentence.len(), vocabulary_size), false);
        for (row, &index) in sentence.iter().enumerate() {
            if index >= vocabulary_size {
                return Err(Error::IndexOutOfRange {
                    index,
                    size: vocabulary_size,
                });
            }
            encoded.row_mut(row).assign(&table.row(index));
        }
        sentences.push(encoded);
    }
    let max_sentence_length = indices.iter().map(Vec::len).max().unwrap_or(0);
    debug!(
        sentences = sentences.len(),
        vocabulary_size, max_sentence_length, "one-hot encoded indices"
    );
    Ok(OneHotCorpus {
        table,
        sentences,
        max_sentence_length,
    })
}

/// The result of decoding one-hot data
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Decoded {
    /// A single vector decoded to one index
    Index(usize),
    /// A batch of vectors decoded to one index per vector
    Indices(Vec<usize>),
}

impl Decoded {
    /// The decoded indices, as a list
    pub fn into_indices(self) -> Vec<usize> {
        match self {
            Decoded::Index(index) => vec![index],
            Decoded::Indices(indices) => indices,
        }
    }
}

/// Position of the first set bit, or 0 when none is set
fn first_set<'a, I: Iterator<Item = &'a bool>>(mut bits: I) -> usize {
    bits.position(|&bit| bit).unwrap_or(0)
}

/// Decode every lane along axis 1. The caller guarantees a rank of at least 2.
fn decode_lanes<S, D>(data: &ArrayBase<S, D>) -> Vec<usize>
where
    S: Data<Elem = bool>,
    D: Dimension,
{
    data.lanes(Axis(1))
        .into_iter()
        .map(|row| first_set(row.iter()))
        .collect()
}

/// Decode each row of a one-hot matrix
pub fn decode_rows<S: Data<Elem = bool>>(rows: &ArrayBase<S, ndarray::Ix2>) -> Vec<usize> {
    decode_lanes(rows)
}

/// Decode a single one-hot vector or a batch of them, along the last axis
pub fn one_hot_decode<S, D>(data: &ArrayBase<S, D>) -> Result<Decoded>
where
    S: Data<Elem = bool>,
    D: Dimension,
{
    match data.ndim() {
        1 => Ok(Decoded::Index(first_set(data.iter()))),
        2 => Ok(Decoded::Indices(decode_lanes(data))),
        rank => Err(Error::UnsupportedRank(rank)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array, IxDyn};

    #[test]
    fn table_is_identity() {
        let table = one_hot_table(3);
        assert_eq!(
            table,
            arr2(&[[true, false, false], [false, true, false], [false, false, true]])
        );
    }

    #[test]
    fn encode_preserves_nesting() {
        let indices = vec![vec![0, 2, 1], vec![], vec![3]];
        let one_hot = one_hot_encode_indices(&indices, 4).unwrap();
        assert_eq!(one_hot.len(), 3);
        assert_eq!(one_hot.vocabulary_size(), 4);
        assert_eq!(one_hot.max_sentence_length(), 3);
        for (sentence, encoded) in indices.iter().zip(one_hot.sentences()) {
            assert_eq!(encoded.dim(), (sentence.len(), 4));
            for (row, &index) in encoded.lanes(Axis(1)).into_iter().zip(sentence) {
                assert_eq!(row.iter().filter(|&&bit| bit).count(), 1);
                assert!(row[index]);
            }
        }
    }

    #[test]
    fn round_trip() {
        let indices = vec![vec![4, 0, 2, 2], vec![1, 3]];
        let one_hot = one_hot_encode_indices(&indices, 5).unwrap();
        assert_eq!(one_hot.decode(), indices);
        for (sentence, encoded) in indices.iter().zip(one_hot.sentences()) {
            assert_eq!(
                one_hot_decode(encoded).unwrap(),
                Decoded::Indices(sentence.clone())
            );
        }
    }

    #[test]
    fn out_of_range_index() {
        match one_hot_encode_indices(&[vec![0, 3]], 3) {
            Err(Error::IndexOutOfRange { index: 3, size: 3 }) => {}
            other => panic!("expected an out of range error, got {:?}", other),
        }
    }

    #[test]
    fn empty_corpus() {
        let one_hot = one_hot_encode_indices(&[], 2).unwrap();
        assert!(one_hot.is_empty());
        assert_eq!(one_hot.max_sentence_length(), 0);
    }

    #[test]
    fn decode_by_rank() {
        assert_eq!(
            one_hot_decode(&arr1(&[false, false, true])).unwrap(),
            Decoded::Index(2)
        );
        assert_eq!(
            one_hot_decode(&arr2(&[[false, true], [true, false]])).unwrap(),
            Decoded::Indices(vec![1, 0])
        );
        // Dynamic-rank input picks its axis from the rank at runtime
        let dynamic = Array::from_shape_vec(IxDyn(&[2, 3]), vec![false, false, true, true, false, false]).unwrap();
        assert_eq!(one_hot_decode(&dynamic).unwrap().into_indices(), vec![2, 0]);
        let cube = Array::from_elem(IxDyn(&[1, 1, 1]), true);
        assert!(matches!(one_hot_decode(&cube), Err(Error::UnsupportedRank(3))));
    }

    #[test]
    fn matrix_and_dynamic_decoding_agree() {
        let one_hot = one_hot_encode_indices(&[vec![3, 1, 0, 2]], 4).unwrap();
        let sentence = &one_hot.sentences()[0];
        let dynamic = sentence.clone().into_dyn();
        assert_eq!(decode_rows(sentence), vec![3, 1, 0, 2]);
        assert_eq!(
            one_hot_decode(&dynamic).unwrap(),
            Decoded::Indices(decode_rows(sentence))
        );
    }

    #[test]
    fn all_false_decodes_to_zero() {
        assert_eq!(one_hot_decode(&arr1(&[false, false])).unwrap(), Decoded::Index(0));
    }
}
