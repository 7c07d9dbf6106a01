//! Query understanding for marketplace search: turns a raw free-text query
//! into a normalized query string, extracted structured filters, and a coarse
//! intent classification. Pure and stateless; safe for unlimited concurrent
//! use.

pub mod stem;
pub mod text;
pub mod tokenize;

mod entities;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use entities::{EntityKind, QueryEntity};
pub use text::TextCategory;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
	Search,
	Filter,
	Sort,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub price_min: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub price_max: Option<f64>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub categories: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub brand_name: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub values: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub in_stock: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedQuery {
	pub original_query: String,
	pub processed_query: String,
	pub tokens: Vec<String>,
	pub stems: Vec<String>,
	pub entities: Vec<QueryEntity>,
	pub intent: QueryIntent,
	pub filters: QueryFilters,
}

impl ProcessedQuery {
	/// The degraded fallback: the original text is echoed through untouched so
	/// baseline search keeps working when understanding fails.
	fn degraded(query: &str) -> Self {
		Self {
			original_query: query.to_string(),
			processed_query: query.to_string(),
			tokens: Vec::new(),
			stems: Vec::new(),
			entities: Vec::new(),
			intent: QueryIntent::Search,
			filters: QueryFilters::default(),
		}
	}
}

const FILTER_TRIGGERS: &[&str] = &["filter", "show", "find", "where", "with"];
const SORT_TRIGGERS: &[&str] = &["sort", "order", "arrange"];

pub struct QueryEngine {
	min_token_length: usize,
}

impl Default for QueryEngine {
	fn default() -> Self {
		Self::new(2)
	}
}

impl QueryEngine {
	pub fn new(min_token_length: usize) -> Self {
		Self { min_token_length }
	}

	pub fn from_config(cfg: &souk_config::Config) -> Self {
		Self::new(cfg.nlp.min_token_length)
	}

	/// Process a raw search query into tokens, stems, entities, intent, and
	/// derived filters. Never fails from the caller's point of view: any
	/// internal error degrades to an unprocessed fallback.
	pub fn process_query(&self, query: &str) -> ProcessedQuery {
		match self.try_process(query) {
			Ok(processed) => processed,
			Err(err) => {
				tracing::warn!(error = %err, "Query processing failed; falling back to the raw query.");

				ProcessedQuery::degraded(query)
			},
		}
	}

	fn try_process(&self, query: &str) -> Result<ProcessedQuery, regex::Error> {
		let tokens = tokenize::tokenize(query, self.min_token_length);
		let stems: Vec<String> = tokens.iter().map(|token| stem::stem(token)).collect();
		let entities = entities::extract_entities(query)?;
		let intent = classify_intent(&tokens);
		let filters = derive_filters(query, &entities);
		let processed_query = assemble_processed_query(&tokens, &entities);

		Ok(ProcessedQuery {
			original_query: query.to_string(),
			processed_query,
			tokens,
			stems,
			entities,
			intent,
			filters,
		})
	}
}

/// Filter wins over sort when a query carries triggers for both.
fn classify_intent(tokens: &[String]) -> QueryIntent {
	if tokens.iter().any(|token| FILTER_TRIGGERS.contains(&token.as_str())) {
		return QueryIntent::Filter;
	}
	if tokens.iter().any(|token| SORT_TRIGGERS.contains(&token.as_str())) {
		return QueryIntent::Sort;
	}

	QueryIntent::Search
}

/// Fold entities into a filter map. Price bounds are last-wins, categories
/// and values accumulate as sets, brand is last-wins. "in stock"/"available"
/// anywhere in the query switches the stock requirement on.
fn derive_filters(query: &str, entities: &[QueryEntity]) -> QueryFilters {
	let mut filters = QueryFilters::default();

	for entity in entities {
		match entity.kind {
			EntityKind::PriceRange => {
				if let Some((min, max)) = entity.value.split_once('-') {
					if let Ok(min) = min.parse() {
						filters.price_min = Some(min);
					}
					if let Ok(max) = max.parse() {
						filters.price_max = Some(max);
					}
				}
			},
			EntityKind::MinPrice =>
				if let Ok(value) = entity.value.parse() {
					filters.price_min = Some(value);
				},
			EntityKind::MaxPrice =>
				if let Ok(value) = entity.value.parse() {
					filters.price_max = Some(value);
				},
			EntityKind::Category =>
				if !filters.categories.contains(&entity.value) {
					filters.categories.push(entity.value.clone());
				},
			EntityKind::Brand => filters.brand_name = Some(entity.value.clone()),
			EntityKind::Value =>
				if !filters.values.contains(&entity.value) {
					filters.values.push(entity.value.clone());
				},
		}
	}

	let lowered = query.to_lowercase();

	if lowered.contains("in stock") || lowered.contains("available") {
		filters.in_stock = Some(true);
	}

	filters
}

/// Drop tokens whose lowercase form equals an extracted entity value and join
/// the remainder. Removal is token-level, not substring-level: multi-word
/// entity values that only partially overlap tokens may leave stray words,
/// which downstream snippet display relies on.
fn assemble_processed_query(tokens: &[String], entities: &[QueryEntity]) -> String {
	let entity_values: HashSet<String> =
		entities.iter().map(|entity| entity.value.to_lowercase()).collect();

	tokens
		.iter()
		.filter(|token| !entity_values.contains(token.as_str()))
		.cloned()
		.collect::<Vec<_>>()
		.join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn filter_intent_wins_over_sort() {
		let engine = QueryEngine::default();
		let processed = engine.process_query("sort by filter size");

		assert_eq!(processed.intent, QueryIntent::Filter);
	}

	#[test]
	fn sort_intent_without_filter_triggers() {
		let engine = QueryEngine::default();
		let processed = engine.process_query("sort bags price");

		assert_eq!(processed.intent, QueryIntent::Sort);
	}

	#[test]
	fn tokens_and_stems_stay_aligned() {
		let engine = QueryEngine::default();
		let processed = engine.process_query("running shoes for hiking trails");

		assert_eq!(processed.tokens.len(), processed.stems.len());
		assert_eq!(processed.tokens[0], "running");
		assert_eq!(processed.stems[0], "run");
	}

	#[test]
	fn entity_tokens_are_removed_from_processed_query() {
		let engine = QueryEngine::default();
		let processed = engine.process_query("handmade leather satchel");

		assert!(processed.entities.iter().any(|entity| entity.value == "handmade"));
		assert_eq!(processed.processed_query, "leather satchel");
	}
}
