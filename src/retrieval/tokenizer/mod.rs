
use fancy_regex::Regex;
use std::sync::LazyLock;

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w{2,}").expect("valid regex"));

/// Split text into lowercase terms of at least two word characters
#[inline]
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();

    TOKEN_REGEX
        .find_iter(&lowered)
        .filter_map(Result::ok)
        .map(|m| m.as_str().to_owned())
        .collect()
}
