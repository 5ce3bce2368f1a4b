//! Vocabulary management

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::special_tokens::{
    BOS_TOKEN, DEFAULT_BOS_ID, DEFAULT_EOS_ID, DEFAULT_UNK_ID, EOS_TOKEN, PAD_ID, PAD_TOKEN,
    UNK_TOKEN,
};
use crate::base::error::{Error, Result};

/// Vocabulary mapping between tokens and IDs
///
/// Maintains bidirectional mappings:
/// - token -> ID (for encoding)
/// - ID -> token (for rendering decoder output)
///
/// Missing `<bos>` / `<eos>` entries fall back to ids 1 and 2. Ids with no
/// entry render as `<unk>`.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    token_to_id: HashMap<String, u32>,
    id_to_token: HashMap<u32, String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 仅包含保留 token 的词表: `<pad>`=0, `<bos>`=1, `<eos>`=2, `<unk>`=3
    pub fn with_reserved() -> Self {
        Self::from_pairs([
            (PAD_ID, PAD_TOKEN),
            (DEFAULT_BOS_ID, BOS_TOKEN),
            (DEFAULT_EOS_ID, EOS_TOKEN),
            (DEFAULT_UNK_ID, UNK_TOKEN),
        ])
    }

    /// Build from `(id, token)` pairs. A later pair overrides an earlier one
    /// for the same id or token.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        let mut vocab = Self::new();
        for (id, token) in pairs {
            vocab.insert(token.into(), id);
        }
        vocab
    }

    /// Build from a word → id index (the shape a fitted word tokenizer exports).
    pub fn from_index(index: HashMap<String, u32>) -> Self {
        Self::from_pairs(index.into_iter().map(|(token, id)| (id, token)))
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let index: HashMap<String, u32> = serde_json::from_reader(reader).map_err(Error::SerdeError)?;
        Ok(Self::from_index(index))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(Error::Io)?;
        let vocab = Self::from_json_reader(BufReader::new(file))?;
        tracing::info!(path = %path.as_ref().display(), size = vocab.len(), "vocabulary loaded");
        Ok(vocab)
    }

    /// Insert or replace a mapping.
    pub fn insert(&mut self, token: String, id: u32) {
        if let Some(old_token) = self.id_to_token.remove(&id) {
            self.token_to_id.remove(&old_token);
        }
        if let Some(old_id) = self.token_to_id.remove(&token) {
            self.id_to_token.remove(&old_id);
        }
        self.id_to_token.insert(id, token.clone());
        self.token_to_id.insert(token, id);
    }

    pub fn id(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    pub fn token(&self, id: u32) -> Option<&str> {
        self.id_to_token.get(&id).map(|s| s.as_str())
    }

    /// Surface form of `id`, or `<unk>` when the id has no entry.
    pub fn render(&self, id: u32) -> &str {
        self.token(id).unwrap_or(UNK_TOKEN)
    }

    pub fn bos_id(&self) -> u32 {
        self.id(BOS_TOKEN).unwrap_or(DEFAULT_BOS_ID)
    }

    pub fn eos_id(&self) -> u32 {
        self.id(EOS_TOKEN).unwrap_or(DEFAULT_EOS_ID)
    }

    /// Id used for out-of-vocabulary words when encoding, if the vocabulary
    /// has one.
    pub fn unk_id(&self) -> Option<u32> {
        self.id(UNK_TOKEN)
    }

    pub fn max_id(&self) -> Option<u32> {
        self.id_to_token.keys().copied().max()
    }

    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bidirectional_lookup() {
        let vocab = Vocabulary::from_pairs([(1, "<bos>"), (2, "<eos>"), (3, "hi"), (4, "there")]);
        assert_eq!(vocab.id("hi"), Some(3));
        assert_eq!(vocab.token(4), Some("there"));
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.max_id(), Some(4));
    }

    #[test]
    fn test_render_falls_back_to_unk() {
        let vocab = Vocabulary::from_pairs([(3, "hi")]);
        assert_eq!(vocab.render(3), "hi");
        assert_eq!(vocab.render(99), "<unk>");
    }

    #[test]
    fn test_marker_ids_default_when_missing() {
        let vocab = Vocabulary::from_pairs([(3, "hi")]);
        assert_eq!(vocab.bos_id(), 1);
        assert_eq!(vocab.eos_id(), 2);
        assert_eq!(vocab.unk_id(), None);

        let vocab = Vocabulary::from_pairs([(7, "<bos>"), (8, "<eos>"), (9, "<unk>")]);
        assert_eq!(vocab.bos_id(), 7);
        assert_eq!(vocab.eos_id(), 8);
        assert_eq!(vocab.unk_id(), Some(9));
    }

    #[test]
    fn test_with_reserved() {
        let vocab = Vocabulary::with_reserved();
        assert_eq!(vocab.token(0), Some("<pad>"));
        assert_eq!(vocab.bos_id(), 1);
        assert_eq!(vocab.eos_id(), 2);
        assert_eq!(vocab.unk_id(), Some(3));
    }

    #[test]
    fn test_insert_replaces_stale_mappings() {
        let mut vocab = Vocabulary::from_pairs([(3, "hi")]);
        vocab.insert("hello".to_string(), 3);
        assert_eq!(vocab.id("hi"), None);
        assert_eq!(vocab.token(3), Some("hello"));

        vocab.insert("hello".to_string(), 5);
        assert_eq!(vocab.token(3), None);
        assert_eq!(vocab.id("hello"), Some(5));
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn test_from_json_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{"<unk>": 1, "<bos>": 2, "<eos>": 3, "hello": 4}}"#)?;

        let vocab = Vocabulary::from_file(file.path())?;
        assert_eq!(vocab.bos_id(), 2);
        assert_eq!(vocab.eos_id(), 3);
        assert_eq!(vocab.unk_id(), Some(1));
        assert_eq!(vocab.render(4), "hello");
        Ok(())
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(Vocabulary::from_json_reader(r#"{"hello": -1}"#.as_bytes()).is_err());
        assert!(Vocabulary::from_json_reader("[1, 2]".as_bytes()).is_err());
    }
}
