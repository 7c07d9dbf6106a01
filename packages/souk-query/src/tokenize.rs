use unicode_segmentation::UnicodeSegmentation;

/// English stopwords, curated for product search. Intent triggers (filter,
/// show, find, where, with, sort, order, arrange) and price/stock keywords
/// (under, over, above, below, available) are deliberately absent so they
/// survive cleaning and remain visible to intent and filter extraction.
const STOP_WORDS: &[&str] = &[
	"a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at",
	"be", "because", "been", "before", "being", "both", "but", "by", "can", "could", "did", "do",
	"does", "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has",
	"have", "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if", "in", "into",
	"is", "it", "its", "just", "me", "most", "my", "no", "nor", "not", "now", "of", "off", "on",
	"once", "only", "or", "other", "our", "ours", "out", "own", "same", "she", "so", "some",
	"such", "than", "that", "the", "their", "theirs", "them", "then", "there", "these", "they",
	"this", "those", "through", "to", "too", "up", "very", "was", "we", "were", "what", "when",
	"which", "while", "who", "whom", "why", "you", "your", "yours",
];

pub(crate) fn is_stop_word(token: &str) -> bool {
	STOP_WORDS.contains(&token)
}

/// Lowercase and split on word boundaries, then drop stopwords, tokens at or
/// below the minimum length, and purely numeric tokens. Order is preserved.
pub fn tokenize(text: &str, min_token_length: usize) -> Vec<String> {
	text.to_lowercase()
		.unicode_words()
		.filter(|token| !is_stop_word(token))
		.filter(|token| token.chars().count() > min_token_length)
		.filter(|token| !token.chars().all(|ch| ch.is_ascii_digit()))
		.map(str::to_string)
		.collect()
}
