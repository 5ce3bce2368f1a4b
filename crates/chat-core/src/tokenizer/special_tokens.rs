//! Reserved tokens and their default ids.

pub const PAD_TOKEN: &str = "<pad>";
pub const BOS_TOKEN: &str = "<bos>";
pub const EOS_TOKEN: &str = "<eos>";
pub const UNK_TOKEN: &str = "<unk>";

/// Right-padding id. Never mapped to a surface token.
pub const PAD_ID: u32 = 0;
/// Used when a vocabulary has no `<bos>` entry.
pub const DEFAULT_BOS_ID: u32 = 1;
/// Used when a vocabulary has no `<eos>` entry.
pub const DEFAULT_EOS_ID: u32 = 2;
pub const DEFAULT_UNK_ID: u32 = 3;

/// Ids below this are reserved in a freshly built vocabulary.
pub const FIRST_WORD_ID: u32 = 4;

pub fn is_reserved(token: &str) -> bool {
    matches!(token, PAD_TOKEN | BOS_TOKEN | EOS_TOKEN | UNK_TOKEN)
}
