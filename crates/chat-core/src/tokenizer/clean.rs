use std::sync::OnceLock;

use regex::Regex;

use super::special_tokens::{BOS_TOKEN, EOS_TOKEN};

/// Contraction expansions, applied in order. `won't` and `can't` must run
/// before the generic `n't` rule.
const CONTRACTIONS: [(&str, &str); 15] = [
    (r"i'm", "i am"),
    (r"he's", "he is"),
    (r"she's", "she is"),
    (r"it's", "it is"),
    (r"that's", "that is"),
    (r"what's", "what is"),
    (r"where's", "where is"),
    (r"how's", "how is"),
    (r"'ll", " will"),
    (r"'ve", " have"),
    (r"'re", " are"),
    (r"'d", " would"),
    (r"won't", "will not"),
    (r"can't", "cannot"),
    (r"n't", " not"),
];

const STRIP_PATTERN: &str = r##"[-()"#/@;:<>{}`+=~|.!?,]"##;

struct Rules {
    contractions: Vec<(Regex, &'static str)>,
    strip: Regex,
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| Rules {
        contractions: CONTRACTIONS
            .iter()
            .map(|&(pattern, replacement)| (Regex::new(pattern).expect("valid regex"), replacement))
            .collect(),
        strip: Regex::new(STRIP_PATTERN).expect("valid regex"),
    })
}

/// Normalize free text before tokenization: lowercase, expand common English
/// contractions, drop punctuation, collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let rules = rules();
    let mut text = text.to_lowercase();
    for (re, replacement) in &rules.contractions {
        text = re.replace_all(&text, *replacement).into_owned();
    }
    let text = rules.strip.replace_all(&text, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 为目标句子加上起止标记
pub fn tag(text: &str) -> String {
    format!("{} {} {}", BOS_TOKEN, text, EOS_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_whitespace() {
        assert_eq!(clean_text("  Hello   THERE  "), "hello there");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_contractions() {
        assert_eq!(clean_text("I'm fine"), "i am fine");
        assert_eq!(clean_text("it's late, isn't it?"), "it is late is not it");
        assert_eq!(clean_text("I won't go, you can't stay"), "i will not go you cannot stay");
        assert_eq!(clean_text("we'll see what you've done"), "we will see what you have done");
        assert_eq!(clean_text("they're here, I'd say"), "they are here i would say");
        assert_eq!(clean_text("What's up? Where's Bob?"), "what is up where is bob");
    }

    #[test]
    fn test_strips_punctuation() {
        assert_eq!(clean_text("a-b (c) \"d\" #e /f @g; h: <i> {j} `k` +l= ~m| n. o! p? q,"), "ab c d e f g h i j k l m n o p q");
    }

    #[test]
    fn test_tag_wraps_markers() {
        assert_eq!(tag("hi there"), "<bos> hi there <eos>");
    }
}
