/*!
Sentence and word segmentation

Sentences follow Unicode sentence boundaries and words follow Unicode word boundaries, with whitespace dropped
and English clitics split off in the style of the Penn Treebank (`don't` becomes `do n't`).
*/
use unicode_segmentation::UnicodeSegmentation;

/// Clitics split off after an apostrophe
const CLITICS: &[&str] = &["s", "m", "d", "ll", "re", "ve"];

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Split raw text into trimmed, non-empty sentences
pub fn sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .map(String::from)
        .collect()
}

/// Split text which is already segmented, one sentence per line
pub fn sentence_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .map(String::from)
        .collect()
}

/// Split a sentence into word tokens
pub fn words(sentence: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for segment in sentence.split_word_bounds() {
        if segment.chars().all(char::is_whitespace) {
            continue;
        }
        match clitic_start(segment) {
            Some(at) => {
                tokens.push(segment[..at].to_string());
                tokens.push(segment[at..].to_string());
            }
            None => tokens.push(segment.to_string()),
        }
    }
    tokens
}

/// The byte offset at which a trailing clitic begins, if the word has one
fn clitic_start(word: &str) -> Option<usize> {
    let (at, apostrophe) = word.char_indices().rev().find(|&(_, c)| is_apostrophe(c))?;
    if at == 0 {
        return None;
    }
    let tail = word[at + apostrophe.len_utf8()..].to_lowercase();
    if CLITICS.contains(&tail.as_str()) {
        return Some(at);
    }
    let head = &word[..at];
    // "n't" takes the final n of the head with it
    if tail == "t" && head.len() > 1 && (head.ends_with('n') || head.ends_with('N')) {
        return Some(at - 1);
    }
    None
}
