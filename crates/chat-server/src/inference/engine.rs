use anyhow::Result;
use chat_core::model::FinishReason;
use chat_core::tokenizer::vocab::Vocabulary;
use chat_core::{build_seq2seq, Seq2Seq, Tokenizer};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;

/// One generated reply plus the bookkeeping the handlers log.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub steps: usize,
    pub finish_reason: FinishReason,
    pub latency_ms: u64,
}

/// Model + tokenizer, built once at startup and shared by every request.
///
/// Everything inside is read-only, so `reply` takes `&self` and can run on
/// any number of blocking threads at once.
pub struct InferenceEngine {
    model: Arc<Seq2Seq>,
    tokenizer: Arc<Tokenizer>,
    max_steps: usize,
}

impl InferenceEngine {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let max_len = config.model.max_len;
        let tokenizer = match (&config.tokenizer.vocab_path, &config.tokenizer.corpus_path) {
            (Some(path), _) => {
                tracing::info!("Loading vocabulary from {}", path.display());
                Tokenizer::from_vocab_file(path, max_len)?
            }
            (None, Some(path)) => {
                tracing::info!("Fitting tokenizer on {}", path.display());
                Tokenizer::fit_on_file(path, config.model.vocab_size, max_len)?
            }
            (None, None) => {
                tracing::warn!(
                    "No vocab_path or corpus_path configured; every input word will encode as <unk>"
                );
                Tokenizer::new(Vocabulary::with_reserved(), max_len)
            }
        };

        let model = build_seq2seq(&config.model)?;
        Self::from_parts(model, tokenizer, config.generation.max_steps)
    }

    pub fn from_parts(model: Seq2Seq, tokenizer: Tokenizer, max_steps: usize) -> Result<Self> {
        let vocab_size = model.config().vocab_size;
        if let Some(max_id) = tokenizer.vocabulary().max_id() {
            if max_id as usize >= vocab_size {
                anyhow::bail!(
                    "vocabulary id {} does not fit a model with vocab_size {}",
                    max_id,
                    vocab_size
                );
            }
        }
        if tokenizer.max_len() != model.config().max_len {
            anyhow::bail!(
                "tokenizer max_len {} differs from model max_len {}",
                tokenizer.max_len(),
                model.config().max_len
            );
        }

        tracing::info!(
            vocab_entries = tokenizer.vocabulary().len(),
            vocab_size,
            max_steps,
            "Inference engine ready"
        );

        Ok(Self {
            model: Arc::new(model),
            tokenizer: Arc::new(tokenizer),
            max_steps,
        })
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Encode `text`, run the greedy loop, and time it. Blocking.
    pub fn reply(&self, text: &str) -> Result<Reply> {
        self.reply_with_cancel(text, &AtomicBool::new(false))
    }

    /// [`InferenceEngine::reply`] that stops between decoder steps once
    /// `cancel` is set, returning `chat_core::Error::Cancelled`.
    pub fn reply_with_cancel(&self, text: &str, cancel: &AtomicBool) -> Result<Reply> {
        let start = Instant::now();
        let input = self.tokenizer.encode(text);
        let generation = self.model.generate_with_cancel(
            &input,
            self.tokenizer.vocabulary(),
            self.max_steps,
            cancel,
        )?;

        Ok(Reply {
            text: generation.text,
            steps: generation.steps,
            finish_reason: generation.finish_reason,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::model::config::ModelConfig;
    use std::io::Write;

    fn small_config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.model = ModelConfig {
            vocab_size: 32,
            embedding_dim: 4,
            hidden_dim: 6,
            max_len: 8,
            ..ModelConfig::default()
        };
        config.generation.max_steps = 5;
        config
    }

    #[test]
    fn test_reply_without_vocabulary_sources() -> Result<()> {
        let engine = InferenceEngine::new(&small_config())?;
        let reply = engine.reply("hello there")?;
        assert!(reply.steps >= 1 && reply.steps <= 5);
        Ok(())
    }

    #[test]
    fn test_reply_is_deterministic() -> Result<()> {
        let mut corpus = tempfile::NamedTempFile::new()?;
        writeln!(corpus, "hello there\nhow are you\n\ni am fine thank you")?;

        let mut config = small_config();
        config.tokenizer.corpus_path = Some(corpus.path().to_path_buf());

        let first = InferenceEngine::new(&config)?.reply("How are you?")?;
        let second = InferenceEngine::new(&config)?.reply("How are you?")?;
        assert_eq!(first.text, second.text);
        assert_eq!(first.steps, second.steps);
        assert_eq!(first.finish_reason, second.finish_reason);
        Ok(())
    }

    #[test]
    fn test_cancelled_reply_returns_error() -> Result<()> {
        let engine = InferenceEngine::new(&small_config())?;
        let err = engine
            .reply_with_cancel("hello there", &AtomicBool::new(true))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<chat_core::Error>(),
            Some(chat_core::Error::Cancelled)
        ));
        Ok(())
    }

    #[test]
    fn test_vocabulary_larger_than_model_rejected() -> Result<()> {
        let mut vocab = tempfile::Builder::new().suffix(".json").tempfile()?;
        write!(vocab, r#"{{ "<pad>": 0, "<bos>": 1, "<eos>": 2, "hello": 40 }}"#)?;

        let mut config = small_config();
        config.tokenizer.vocab_path = Some(vocab.path().to_path_buf());
        assert!(InferenceEngine::new(&config).is_err());
        Ok(())
    }

    #[test]
    fn test_max_len_mismatch_rejected() -> Result<()> {
        let config = small_config();
        let model = build_seq2seq(&config.model)?;
        let tokenizer = Tokenizer::new(Vocabulary::with_reserved(), 4);
        assert!(InferenceEngine::from_parts(model, tokenizer, 5).is_err());
        Ok(())
    }
}
