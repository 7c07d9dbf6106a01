use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
	PriceRange,
	MinPrice,
	MaxPrice,
	Category,
	Brand,
	Value,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct QueryEntity {
	#[serde(rename = "type")]
	pub kind: EntityKind,
	pub value: String,
}

const CATEGORY_INDICATORS: &[&str] = &["category", "categories", "in", "from", "section"];
// "made by" can never match a single word; it is carried from the legacy
// vocabulary untouched.
const BRAND_INDICATORS: &[&str] = &["brand", "by", "from", "made by"];
const VALUE_VOCABULARY: &[&str] =
	&["sustainable", "ethical", "eco-friendly", "organic", "fair trade", "handmade"];

/// Recognize typed sub-spans of the raw query: price bounds, category and
/// brand mentions, and value tags. Works on the original string,
/// case-insensitively, independent of tokenization.
pub(crate) fn extract_entities(query: &str) -> Result<Vec<QueryEntity>, regex::Error> {
	let mut entities = Vec::new();
	let range = Regex::new(r"(?i)\$(\d+(?:\.\d+)?)\s*(?:to|-)\s*\$(\d+(?:\.\d+)?)")?;

	for caps in range.captures_iter(query) {
		let (Ok(min), Ok(max)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
			continue;
		};

		entities.push(QueryEntity { kind: EntityKind::PriceRange, value: format!("{min}-{max}") });
	}

	let single = Regex::new(r"(?i)(under|less than|below|above|over|more than)\s*\$(\d+(?:\.\d+)?)")?;

	for caps in single.captures_iter(query) {
		let Ok(price) = caps[2].parse::<f64>() else {
			continue;
		};
		let trigger = caps[1].to_lowercase();
		let kind = if matches!(trigger.as_str(), "under" | "less than" | "below") {
			EntityKind::MaxPrice
		} else {
			EntityKind::MinPrice
		};

		entities.push(QueryEntity { kind, value: price.to_string() });
	}

	let lowered = query.to_lowercase();
	let words: Vec<&str> = lowered.split_whitespace().collect();

	for value in indicator_values(&words, CATEGORY_INDICATORS) {
		entities.push(QueryEntity { kind: EntityKind::Category, value });
	}
	for value in indicator_values(&words, BRAND_INDICATORS) {
		entities.push(QueryEntity { kind: EntityKind::Brand, value });
	}
	for value in VALUE_VOCABULARY {
		if lowered.contains(value) {
			entities.push(QueryEntity { kind: EntityKind::Value, value: value.to_string() });
		}
	}

	Ok(entities)
}

/// Capture the word after the first occurrence of each indicator, and, when a
/// following word exists and is not itself an indicator, the two-word phrase
/// as a second candidate. A single indicator occurrence can therefore yield
/// two entities; consumers may treat the longer phrase as more specific.
fn indicator_values(words: &[&str], indicators: &[&str]) -> Vec<String> {
	let mut values = Vec::new();

	for indicator in indicators {
		let Some(index) = words.iter().position(|word| word == indicator) else {
			continue;
		};

		if index + 1 >= words.len() {
			continue;
		}

		values.push(words[index + 1].to_string());

		if index + 2 < words.len() && !indicators.contains(&words[index + 2]) {
			values.push(format!("{} {}", words[index + 1], words[index + 2]));
		}
	}

	values
}

#[cfg(test)]
mod tests {
	use super::*;

	fn extract(query: &str) -> Vec<QueryEntity> {
		extract_entities(query).expect("extraction should not fail")
	}

	#[test]
	fn extracts_price_ranges() {
		let entities = extract("shoes $30 to $60");

		assert!(entities.contains(&QueryEntity {
			kind: EntityKind::PriceRange,
			value: "30-60".to_string()
		}));

		let entities = extract("bags $10-$25.50");

		assert!(entities.contains(&QueryEntity {
			kind: EntityKind::PriceRange,
			value: "10-25.5".to_string()
		}));
	}

	#[test]
	fn extracts_multiple_price_ranges() {
		let entities = extract("belts $5 to $10 or wallets $20 to $40");
		let ranges: Vec<_> =
			entities.iter().filter(|entity| entity.kind == EntityKind::PriceRange).collect();

		assert_eq!(ranges.len(), 2);
	}

	#[test]
	fn classifies_single_sided_prices() {
		let entities = extract("jackets under $75");

		assert!(entities
			.contains(&QueryEntity { kind: EntityKind::MaxPrice, value: "75".to_string() }));

		let entities = extract("watches above $200");

		assert!(entities
			.contains(&QueryEntity { kind: EntityKind::MinPrice, value: "200".to_string() }));
	}

	#[test]
	fn captures_one_and_two_word_candidates_after_indicators() {
		let entities = extract("lamps in home decor");
		let categories: Vec<&str> = entities
			.iter()
			.filter(|entity| entity.kind == EntityKind::Category)
			.map(|entity| entity.value.as_str())
			.collect();

		assert!(categories.contains(&"home"));
		assert!(categories.contains(&"home decor"));
	}

	#[test]
	fn does_not_extend_phrase_into_another_indicator() {
		let entities = extract("scarves in wool from milan");
		let categories: Vec<&str> = entities
			.iter()
			.filter(|entity| entity.kind == EntityKind::Category)
			.map(|entity| entity.value.as_str())
			.collect();

		// "from" is itself an indicator, so the two-word phrase stops short.
		assert!(categories.contains(&"wool"));
		assert!(!categories.contains(&"wool from"));
	}

	#[test]
	fn matches_value_vocabulary_as_substrings() {
		let entities = extract("Organic fair trade coffee");
		let values: Vec<&str> = entities
			.iter()
			.filter(|entity| entity.kind == EntityKind::Value)
			.map(|entity| entity.value.as_str())
			.collect();

		assert_eq!(values, vec!["organic", "fair trade"]);
	}
}
