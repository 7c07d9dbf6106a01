use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;

use souk_storage::models::{Interaction, InteractionData, ViewTarget};

use crate::{ServiceResult, SignalService};

const CLICK_WEIGHT: f64 = 0.8;
const SEARCH_WEIGHT: f64 = 0.7;
const FILTER_WEIGHT: f64 = 0.6;
const VIEW_WEIGHT: f64 = 0.5;
const IMPRESSION_WEIGHT: f64 = 0.1;
/// A dwell saturates at full weight after this many minutes.
const DWELL_SATURATION_MINUTES: f64 = 2.0;

/// Accumulated, time-decayed interest scores for one session. Keys are
/// product/result ids, category ids, brand ids, raw query strings, and
/// `"filterType:filterValue"` pairs. Scores are sums over all historical,
/// recency-discounted interactions; they are unbounded above and are not
/// normalized probabilities.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WeightProfile {
	pub entities: HashMap<String, f64>,
	pub categories: HashMap<String, f64>,
	pub brands: HashMap<String, f64>,
	pub queries: HashMap<String, f64>,
	pub filters: HashMap<String, f64>,
}

impl WeightProfile {
	pub fn is_empty(&self) -> bool {
		self.entities.is_empty()
			&& self.categories.is_empty()
			&& self.brands.is_empty()
			&& self.queries.is_empty()
			&& self.filters.is_empty()
	}
}

impl SignalService {
	/// Recompute the session's weight profile from its full interaction
	/// history. Deliberately not incremental: recomputing from scratch keeps
	/// the result correct under concurrent writes at interaction volumes of
	/// tens to low hundreds per session. Degrades to an all-empty profile on
	/// any failure, which ranking must treat as "no personalization
	/// available".
	pub async fn session_weights(&self, session_id: &str) -> WeightProfile {
		let now = OffsetDateTime::now_utc();

		match self.compute_weights(session_id, now).await {
			Ok(profile) => profile,
			Err(err) => {
				tracing::error!(
					error = %err,
					session_id,
					"Failed to calculate session weights; returning an empty profile."
				);

				WeightProfile::default()
			},
		}
	}

	pub(crate) async fn compute_weights(
		&self,
		session_id: &str,
		now: OffsetDateTime,
	) -> ServiceResult<WeightProfile> {
		let session = self.resolve_session(session_id, now).await?;
		let interactions = self.store.session_interactions(session.id, None, None).await?;
		let window_hours = self.cfg.signals.decay_window_hours;
		let mut profile = WeightProfile::default();

		for interaction in &interactions {
			apply_interaction(&mut profile, interaction, now, window_hours);
		}

		Ok(profile)
	}
}

/// Linear decay from 1 at `now` to 0 at the window boundary, clamped so older
/// interactions contribute nothing rather than negative weight.
pub fn recency_weight(now: OffsetDateTime, timestamp: OffsetDateTime, window_hours: f64) -> f64 {
	let hours_since = (now - timestamp).as_seconds_f64() / 3_600.0;

	(1.0 - hours_since / window_hours).max(0.0)
}

/// Fold one interaction into the profile. Malformed payloads are skipped;
/// sort, add-to-cart, and purchase events are tracked but never scored here.
pub fn apply_interaction(
	profile: &mut WeightProfile,
	interaction: &Interaction,
	now: OffsetDateTime,
	window_hours: f64,
) {
	let recency = recency_weight(now, interaction.timestamp, window_hours);
	let Some(data) = interaction.data() else {
		tracing::debug!(
			interaction_id = %interaction.id,
			kind = interaction.kind.as_str(),
			"Skipping interaction with malformed payload."
		);

		return;
	};

	match data {
		InteractionData::Click { result_id } =>
			add(&mut profile.entities, &result_id, CLICK_WEIGHT * recency),
		InteractionData::Dwell { result_id } => {
			let minutes = interaction.duration_ms.unwrap_or(0) as f64 / 60_000.0;
			let weight = (minutes / DWELL_SATURATION_MINUTES).min(1.0);

			add(&mut profile.entities, &result_id, weight * recency);
		},
		InteractionData::Impression { result_ids } =>
			for result_id in &result_ids {
				add(&mut profile.entities, result_id, IMPRESSION_WEIGHT * recency);
			},
		InteractionData::Search { query } =>
			add(&mut profile.queries, &query, SEARCH_WEIGHT * recency),
		InteractionData::Filter { filter_type, filter_value } => {
			let key = format!("{filter_type}:{filter_value}");

			add(&mut profile.filters, &key, FILTER_WEIGHT * recency);

			match filter_type.as_str() {
				"category" => add(&mut profile.categories, &filter_value, FILTER_WEIGHT * recency),
				"brand" => add(&mut profile.brands, &filter_value, FILTER_WEIGHT * recency),
				_ => {},
			}
		},
		InteractionData::View(ViewTarget::Category { category_id }) =>
			add(&mut profile.categories, &category_id, VIEW_WEIGHT * recency),
		InteractionData::View(ViewTarget::Brand { brand_id }) =>
			add(&mut profile.brands, &brand_id, VIEW_WEIGHT * recency),
		InteractionData::Sort(_)
		| InteractionData::AddToCart(_)
		| InteractionData::Purchase(_) => {},
	}
}

fn add(map: &mut HashMap<String, f64>, key: &str, amount: f64) {
	*map.entry(key.to_string()).or_insert(0.0) += amount;
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use time::macros::datetime;
	use uuid::Uuid;

	use souk_storage::models::{Interaction, InteractionData, InteractionKind};

	use super::*;

	const NOW: OffsetDateTime = datetime!(2025-06-01 12:00:00 UTC);

	fn interaction(data: &InteractionData, age: time::Duration) -> Interaction {
		let at = NOW - age;

		Interaction {
			id: Uuid::new_v4(),
			session_id: Uuid::new_v4(),
			kind: data.kind(),
			data: data.payload(),
			duration_ms: None,
			timestamp: at,
			created_at: at,
		}
	}

	#[test]
	fn recency_decays_linearly_over_the_window() {
		let fresh = recency_weight(NOW, NOW, 24.0);
		let hour_old = recency_weight(NOW, NOW - time::Duration::hours(1), 24.0);
		let day_old = recency_weight(NOW, NOW - time::Duration::hours(24), 24.0);
		let ancient = recency_weight(NOW, NOW - time::Duration::hours(48), 24.0);

		assert_eq!(fresh, 1.0);
		assert!((hour_old - 0.9583).abs() < 1e-3);
		assert_eq!(day_old, 0.0);
		assert_eq!(ancient, 0.0);
	}

	#[test]
	fn clicks_accumulate_additively() {
		let mut profile = WeightProfile::default();
		let click = InteractionData::Click { result_id: "p42".to_string() };
		let first = interaction(&click, time::Duration::ZERO);
		let second = interaction(&click, time::Duration::ZERO);

		apply_interaction(&mut profile, &first, NOW, 24.0);

		let single = profile.entities["p42"];

		apply_interaction(&mut profile, &second, NOW, 24.0);

		assert!((profile.entities["p42"] - 2.0 * single).abs() < 1e-12);
		assert!((single - 0.8).abs() < 1e-12);
	}

	#[test]
	fn dwell_weight_saturates_at_one() {
		let mut profile = WeightProfile::default();
		let dwell = InteractionData::Dwell { result_id: "p7".to_string() };
		let mut short = interaction(&dwell, time::Duration::ZERO);
		let mut long = interaction(&dwell, time::Duration::ZERO);

		short.duration_ms = Some(60_000);
		long.duration_ms = Some(10 * 60_000);

		apply_interaction(&mut profile, &short, NOW, 24.0);

		assert!((profile.entities["p7"] - 0.5).abs() < 1e-12);

		let mut profile = WeightProfile::default();

		apply_interaction(&mut profile, &long, NOW, 24.0);

		assert!((profile.entities["p7"] - 1.0).abs() < 1e-12);
	}

	#[test]
	fn dwell_without_duration_scores_zero() {
		let mut profile = WeightProfile::default();
		let dwell = InteractionData::Dwell { result_id: "p7".to_string() };
		let event = interaction(&dwell, time::Duration::ZERO);

		apply_interaction(&mut profile, &event, NOW, 24.0);

		assert_eq!(profile.entities["p7"], 0.0);
	}

	#[test]
	fn impressions_score_every_listed_id() {
		let mut profile = WeightProfile::default();
		let impression = InteractionData::Impression {
			result_ids: vec!["a".to_string(), "b".to_string(), "c".to_string()],
		};
		let event = interaction(&impression, time::Duration::ZERO);

		apply_interaction(&mut profile, &event, NOW, 24.0);

		assert_eq!(profile.entities.len(), 3);

		for id in ["a", "b", "c"] {
			assert!((profile.entities[id] - 0.1).abs() < 1e-12);
		}
	}

	#[test]
	fn filter_echoes_into_category_and_brand_maps() {
		let mut profile = WeightProfile::default();
		let by_category = InteractionData::Filter {
			filter_type: "category".to_string(),
			filter_value: "Electronics".to_string(),
		};
		let by_brand = InteractionData::Filter {
			filter_type: "brand".to_string(),
			filter_value: "Acme".to_string(),
		};
		let by_price = InteractionData::Filter {
			filter_type: "price".to_string(),
			filter_value: "0-50".to_string(),
		};

		for data in [&by_category, &by_brand, &by_price] {
			let event = interaction(data, time::Duration::ZERO);

			apply_interaction(&mut profile, &event, NOW, 24.0);
		}

		assert_eq!(profile.filters["category:Electronics"], profile.categories["Electronics"]);
		assert_eq!(profile.filters["brand:Acme"], profile.brands["Acme"]);
		assert!(profile.filters.contains_key("price:0-50"));
		assert_eq!(profile.categories.len(), 1);
		assert_eq!(profile.brands.len(), 1);
	}

	#[test]
	fn views_split_by_target() {
		let mut profile = WeightProfile::default();
		let category_view = InteractionData::View(
			souk_storage::models::ViewTarget::Category { category_id: "c1".to_string() },
		);
		let brand_view = InteractionData::View(souk_storage::models::ViewTarget::Brand {
			brand_id: "b1".to_string(),
		});

		apply_interaction(
			&mut profile,
			&interaction(&category_view, time::Duration::ZERO),
			NOW,
			24.0,
		);
		apply_interaction(&mut profile, &interaction(&brand_view, time::Duration::ZERO), NOW, 24.0);

		assert!((profile.categories["c1"] - 0.5).abs() < 1e-12);
		assert!((profile.brands["b1"] - 0.5).abs() < 1e-12);
	}

	#[test]
	fn unscored_kinds_leave_the_profile_empty() {
		let mut profile = WeightProfile::default();
		let events = [
			InteractionData::Sort(json!({ "field": "price" })),
			InteractionData::AddToCart(json!({ "productId": "p1" })),
			InteractionData::Purchase(json!({ "orderId": "o1" })),
		];

		for data in &events {
			apply_interaction(&mut profile, &interaction(data, time::Duration::ZERO), NOW, 24.0);
		}

		assert!(profile.is_empty());
	}

	#[test]
	fn malformed_payloads_are_skipped() {
		let mut profile = WeightProfile::default();
		let event = Interaction {
			id: Uuid::new_v4(),
			session_id: Uuid::new_v4(),
			kind: InteractionKind::Click,
			data: json!({}),
			duration_ms: None,
			timestamp: NOW,
			created_at: NOW,
		};

		apply_interaction(&mut profile, &event, NOW, 24.0);

		assert!(profile.is_empty());
	}

	#[test]
	fn expired_interactions_contribute_nothing() {
		let mut profile = WeightProfile::default();
		let click = InteractionData::Click { result_id: "p42".to_string() };
		let stale = interaction(&click, time::Duration::hours(25));

		apply_interaction(&mut profile, &stale, NOW, 24.0);

		assert_eq!(profile.entities["p42"], 0.0);
	}
}
