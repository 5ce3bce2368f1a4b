//! Word-level tokenizer: text cleaning, vocabulary fitting, and conversion of
//! free text into the fixed-length, right-padded id sequences the encoder
//! expects.

pub mod clean;
pub mod special_tokens;
pub mod vocab;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use clean::{clean_text, tag};
use special_tokens::{is_reserved, FIRST_WORD_ID, PAD_ID};
use vocab::Vocabulary;

use crate::base::error::{Error, Result};

pub struct Tokenizer {
    vocab: Vocabulary,
    max_len: usize,
}

impl Tokenizer {
    pub fn new(vocab: Vocabulary, max_len: usize) -> Self {
        Self { vocab, max_len }
    }

    /// 在语料上拟合词表。
    ///
    /// Each text is cleaned and tagged with `<bos>`/`<eos>` first. Words are
    /// ranked by frequency (ties broken by first appearance) and assigned ids
    /// from 4 upwards; only ids below `num_words` are kept, the rest encode as
    /// `<unk>`.
    pub fn fit_on_texts<'t, I>(texts: I, num_words: usize, max_len: usize) -> Result<Self>
    where
        I: IntoIterator<Item = &'t str>,
    {
        if num_words <= FIRST_WORD_ID as usize {
            return Err(Error::InvalidArgument(format!(
                "num_words must exceed the {} reserved ids, got {}",
                FIRST_WORD_ID, num_words
            ))
            .into());
        }

        // word -> (count, first_seen)
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut seen = 0usize;
        for text in texts {
            for word in tag(&clean_text(text)).split_whitespace() {
                if is_reserved(word) {
                    continue;
                }
                let entry = counts.entry(word.to_string()).or_insert((0, seen));
                entry.0 += 1;
                seen += 1;
            }
        }

        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)));

        let capacity = num_words - FIRST_WORD_ID as usize;
        let total = ranked.len();
        let mut vocab = Vocabulary::with_reserved();
        for (offset, (word, _)) in ranked.into_iter().take(capacity).enumerate() {
            vocab.insert(word, FIRST_WORD_ID + offset as u32);
        }

        tracing::info!(
            distinct_words = total,
            vocab_size = vocab.len(),
            num_words,
            "tokenizer fitted"
        );
        Ok(Self::new(vocab, max_len))
    }

    /// Fit on a newline-delimited corpus file; blank lines are skipped.
    pub fn fit_on_file<P: AsRef<Path>>(path: P, num_words: usize, max_len: usize) -> Result<Self> {
        let corpus = fs::read_to_string(path.as_ref()).map_err(Error::Io)?;
        Self::fit_on_texts(
            corpus.lines().filter(|line| !line.trim().is_empty()),
            num_words,
            max_len,
        )
    }

    pub fn from_vocab_file<P: AsRef<Path>>(path: P, max_len: usize) -> Result<Self> {
        Ok(Self::new(Vocabulary::from_file(path)?, max_len))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Clean `text` and map each word to its id. Unknown words map to
    /// `<unk>`, or are dropped when the vocabulary has no `<unk>` entry.
    pub fn tokenize(&self, text: &str) -> Vec<u32> {
        let unk = self.vocab.unk_id();
        clean_text(text)
            .split_whitespace()
            .filter_map(|word| self.vocab.id(word).or(unk))
            .collect()
    }

    /// Tokenize and right-pad (or truncate) to exactly `max_len` ids.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        let mut ids = self.tokenize(text);
        ids.resize(self.max_len, PAD_ID);
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<&'static str> {
        vec![
            "Hello there!",
            "How are you?",
            "Hello, how is it going?",
            "I'm fine, thank you.",
        ]
    }

    #[test]
    fn test_fit_ranks_by_frequency() -> Result<()> {
        let tok = Tokenizer::fit_on_texts(corpus(), 100, 8)?;
        let vocab = tok.vocabulary();
        // hello, how, you 各出现两次，按首次出现排序
        assert_eq!(vocab.id("hello"), Some(4));
        assert_eq!(vocab.id("how"), Some(5));
        assert_eq!(vocab.id("you"), Some(6));
        assert_eq!(vocab.id("there"), Some(7));
        assert_eq!(vocab.bos_id(), 1);
        assert_eq!(vocab.eos_id(), 2);
        assert_eq!(vocab.unk_id(), Some(3));
        assert_eq!(vocab.id("bos"), None);
        Ok(())
    }

    #[test]
    fn test_fit_respects_num_words() -> Result<()> {
        let tok = Tokenizer::fit_on_texts(corpus(), 6, 8)?;
        assert_eq!(tok.vocabulary().max_id(), Some(5));
        assert_eq!(tok.vocabulary().id("you"), None);
        // 超出容量的词编码为 <unk>
        assert_eq!(tok.tokenize("hello you"), vec![4, 3]);
        Ok(())
    }

    #[test]
    fn test_fit_rejects_tiny_num_words() {
        assert!(Tokenizer::fit_on_texts(corpus(), 4, 8).is_err());
    }

    #[test]
    fn test_encode_pads_and_truncates() -> Result<()> {
        let tok = Tokenizer::fit_on_texts(corpus(), 100, 4)?;
        assert_eq!(tok.encode("Hello there"), vec![4, 7, 0, 0]);
        assert_eq!(tok.encode("hello how you there hello").len(), 4);
        assert_eq!(tok.encode("hello how you there hello"), vec![4, 5, 6, 7]);
        assert_eq!(tok.encode(""), vec![0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_unknown_words_without_unk_are_dropped() {
        let vocab = Vocabulary::from_pairs([(1, "<bos>"), (2, "<eos>"), (3, "hi")]);
        let tok = Tokenizer::new(vocab, 3);
        assert_eq!(tok.encode("hi stranger hi"), vec![3, 3, 0]);
    }

    #[test]
    fn test_fit_on_file_skips_blank_lines() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("corpus.txt");
        fs::write(&path, "good morning\n\n   \ngood night\n")?;

        let tok = Tokenizer::fit_on_file(&path, 50, 5)?;
        assert_eq!(tok.vocabulary().id("good"), Some(4));
        assert_eq!(tok.vocabulary().len(), 4 + 3);
        Ok(())
    }
}
