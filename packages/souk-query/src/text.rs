use std::{cmp::Ordering, collections::HashSet};

use unicode_segmentation::UnicodeSegmentation;

use crate::{QueryEngine, stem, tokenize};

/// A candidate category for [`QueryEngine::classify_text`]: a label plus
/// example texts that characterize it.
#[derive(Clone, Debug)]
pub struct TextCategory {
	pub name: String,
	pub examples: Vec<String>,
}

pub(crate) struct TermScore {
	pub(crate) term: String,
	pub(crate) score: f64,
}

/// TF-IDF over a single-document corpus. With one document the idf term
/// degenerates to a constant positive factor, so scores order by raw term
/// frequency; terms keep their discovery order.
pub(crate) fn tfidf_terms(text: &str) -> Vec<TermScore> {
	let mut order = Vec::new();
	let mut counts = std::collections::HashMap::new();

	for word in text.to_lowercase().unicode_words() {
		let count = counts.entry(word.to_string()).or_insert(0_usize);

		if *count == 0 {
			order.push(word.to_string());
		}

		*count += 1;
	}

	let idf = 1.0 + (1.0_f64 / 2.0).ln();

	order
		.into_iter()
		.map(|term| {
			let tf = counts.get(&term).copied().unwrap_or(0) as f64;

			TermScore { score: tf * idf, term }
		})
		.collect()
}

impl QueryEngine {
	/// Rank the most significant terms of a text by single-document TF-IDF,
	/// descending, capped at `max_keywords`.
	pub fn extract_keywords(&self, text: &str, max_keywords: usize) -> Vec<String> {
		let mut terms: Vec<TermScore> = tfidf_terms(text)
			.into_iter()
			.filter(|entry| !tokenize::is_stop_word(&entry.term) && entry.term.chars().count() > 2)
			.collect();

		terms.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
		terms.truncate(max_keywords);

		terms.into_iter().map(|entry| entry.term).collect()
	}

	/// Jaccard similarity over the stemmed, cleaned token sets of both texts.
	/// Returns a value in [0, 1]; two empty token sets yield 0 rather than a
	/// division by zero.
	pub fn calculate_similarity(&self, first: &str, second: &str) -> f64 {
		let first: HashSet<String> = tokenize::tokenize(first, self.min_token_length)
			.iter()
			.map(|token| stem::stem(token))
			.collect();
		let second: HashSet<String> = tokenize::tokenize(second, self.min_token_length)
			.iter()
			.map(|token| stem::stem(token))
			.collect();
		let union = first.union(&second).count();

		if union == 0 {
			return 0.0;
		}

		first.intersection(&second).count() as f64 / union as f64
	}

	/// Pick the category whose examples are on average most similar to the
	/// text. Returns "unknown" unless the best average similarity exceeds 0.1.
	pub fn classify_text(&self, text: &str, categories: &[TextCategory]) -> String {
		let mut best: Option<(&str, f64)> = None;

		for category in categories {
			if category.examples.is_empty() {
				continue;
			}

			let total: f64 = category
				.examples
				.iter()
				.map(|example| self.calculate_similarity(text, example))
				.sum();
			let average = total / category.examples.len() as f64;

			if best.map(|(_, score)| average > score).unwrap_or(true) {
				best = Some((category.name.as_str(), average));
			}
		}

		match best {
			Some((name, score)) if score > 0.1 => name.to_string(),
			_ => "unknown".to_string(),
		}
	}

	/// Single-document TF-IDF scores in term discovery order. A bag-of-weights
	/// placeholder, not a dense semantic embedding; callers wanting real
	/// vector similarity should substitute an embedding model.
	pub fn generate_embeddings(&self, text: &str) -> Vec<f64> {
		tfidf_terms(text).into_iter().map(|entry| entry.score).collect()
	}
}
