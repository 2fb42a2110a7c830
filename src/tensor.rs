/*!
Packing one-hot corpora into `tch` tensors
*/
use crate::encode::one_hot::OneHotCorpus;
use tch::Tensor;

/// Pack a one-hot corpus into a `[sentences, max_sentence_length, vocabulary_size]` tensor.
///
/// Positions past the end of a sentence are zero filled.
pub fn to_tensor(one_hot: &OneHotCorpus) -> Tensor {
    let sentences = one_hot.len();
    let steps = one_hot.max_sentence_length();
    let width = one_hot.vocabulary_size();
    let mut data = vec![0.0f32; sentences * steps * width];
    for (s, sentence) in one_hot.sentences().iter().enumerate() {
        for ((t, index), &bit) in sentence.indexed_iter() {
            if bit {
                data[(s * steps + t) * width + index] = 1.0;
            }
        }
    }
    Tensor::from(&data[..]).view([sentences as i64, steps as i64, width as i64])
}
