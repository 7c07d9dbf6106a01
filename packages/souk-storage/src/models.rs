use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// The closed set of tracked interaction types. String forms match the `type`
/// column of `session_interactions`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
	Search,
	Click,
	View,
	Filter,
	Sort,
	Impression,
	Dwell,
	AddToCart,
	Purchase,
}

impl InteractionKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Search => "search",
			Self::Click => "click",
			Self::View => "view",
			Self::Filter => "filter",
			Self::Sort => "sort",
			Self::Impression => "impression",
			Self::Dwell => "dwell",
			Self::AddToCart => "add_to_cart",
			Self::Purchase => "purchase",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"search" => Some(Self::Search),
			"click" => Some(Self::Click),
			"view" => Some(Self::View),
			"filter" => Some(Self::Filter),
			"sort" => Some(Self::Sort),
			"impression" => Some(Self::Impression),
			"dwell" => Some(Self::Dwell),
			"add_to_cart" => Some(Self::AddToCart),
			"purchase" => Some(Self::Purchase),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewTarget {
	Category { category_id: String },
	Brand { brand_id: String },
}

/// Typed interaction payloads. Scored variants carry exactly the fields the
/// weighting algorithm reads; `Sort`, `AddToCart`, and `Purchase` are never
/// scored and keep their payloads opaque. Stored JSON uses the legacy
/// camelCase keys (`resultId`, `filterType`, ...).
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionData {
	Search { query: String },
	Click { result_id: String },
	View(ViewTarget),
	Filter { filter_type: String, filter_value: String },
	Sort(Value),
	Impression { result_ids: Vec<String> },
	Dwell { result_id: String },
	AddToCart(Value),
	Purchase(Value),
}

#[derive(Deserialize, Serialize)]
struct QueryPayload {
	query: String,
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultIdPayload {
	result_id: String,
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultIdsPayload {
	result_ids: Vec<String>,
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterPayload {
	filter_type: String,
	filter_value: String,
}

#[derive(Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ViewPayload {
	#[serde(rename_all = "camelCase")]
	Category { category_id: String },
	#[serde(rename_all = "camelCase")]
	Brand { brand_id: String },
}

impl InteractionData {
	pub fn kind(&self) -> InteractionKind {
		match self {
			Self::Search { .. } => InteractionKind::Search,
			Self::Click { .. } => InteractionKind::Click,
			Self::View(_) => InteractionKind::View,
			Self::Filter { .. } => InteractionKind::Filter,
			Self::Sort(_) => InteractionKind::Sort,
			Self::Impression { .. } => InteractionKind::Impression,
			Self::Dwell { .. } => InteractionKind::Dwell,
			Self::AddToCart(_) => InteractionKind::AddToCart,
			Self::Purchase(_) => InteractionKind::Purchase,
		}
	}

	/// The JSON payload stored in the `data` column.
	pub fn payload(&self) -> Value {
		let encoded = match self {
			Self::Search { query } => serde_json::to_value(QueryPayload { query: query.clone() }),
			Self::Click { result_id } | Self::Dwell { result_id } =>
				serde_json::to_value(ResultIdPayload { result_id: result_id.clone() }),
			Self::View(ViewTarget::Category { category_id }) =>
				serde_json::to_value(ViewPayload::Category { category_id: category_id.clone() }),
			Self::View(ViewTarget::Brand { brand_id }) =>
				serde_json::to_value(ViewPayload::Brand { brand_id: brand_id.clone() }),
			Self::Filter { filter_type, filter_value } => serde_json::to_value(FilterPayload {
				filter_type: filter_type.clone(),
				filter_value: filter_value.clone(),
			}),
			Self::Impression { result_ids } =>
				serde_json::to_value(ResultIdsPayload { result_ids: result_ids.clone() }),
			Self::Sort(raw) | Self::AddToCart(raw) | Self::Purchase(raw) => Ok(raw.clone()),
		};

		encoded.unwrap_or(Value::Null)
	}

	/// Decode a stored payload for the given kind. Returns `None` for
	/// malformed payloads (for example a click with no `resultId`); callers
	/// skip those rather than erroring.
	pub fn from_parts(kind: InteractionKind, data: &Value) -> Option<Self> {
		match kind {
			InteractionKind::Search => {
				let payload: QueryPayload = serde_json::from_value(data.clone()).ok()?;

				Some(Self::Search { query: payload.query })
			},
			InteractionKind::Click => {
				let payload: ResultIdPayload = serde_json::from_value(data.clone()).ok()?;

				Some(Self::Click { result_id: payload.result_id })
			},
			InteractionKind::Dwell => {
				let payload: ResultIdPayload = serde_json::from_value(data.clone()).ok()?;

				Some(Self::Dwell { result_id: payload.result_id })
			},
			InteractionKind::View => {
				let payload: ViewPayload = serde_json::from_value(data.clone()).ok()?;

				Some(Self::View(match payload {
					ViewPayload::Category { category_id } => ViewTarget::Category { category_id },
					ViewPayload::Brand { brand_id } => ViewTarget::Brand { brand_id },
				}))
			},
			InteractionKind::Filter => {
				let payload: FilterPayload = serde_json::from_value(data.clone()).ok()?;

				Some(Self::Filter {
					filter_type: payload.filter_type,
					filter_value: payload.filter_value,
				})
			},
			InteractionKind::Impression => {
				let payload: ResultIdsPayload = serde_json::from_value(data.clone()).ok()?;

				Some(Self::Impression { result_ids: payload.result_ids })
			},
			InteractionKind::Sort => Some(Self::Sort(data.clone())),
			InteractionKind::AddToCart => Some(Self::AddToCart(data.clone())),
			InteractionKind::Purchase => Some(Self::Purchase(data.clone())),
		}
	}
}

/// One client session. Created lazily on first reference; never deleted by
/// this subsystem. The list columns are append-only denormalized
/// conveniences, not inputs to scoring.
#[derive(Clone, Debug)]
pub struct Session {
	pub id: Uuid,
	pub session_id: String,
	pub start_time: OffsetDateTime,
	pub last_activity_time: OffsetDateTime,
	pub search_queries: Vec<String>,
	pub clicked_results: Vec<String>,
	pub viewed_categories: Vec<String>,
	pub viewed_brands: Vec<String>,
	pub filters: Vec<Value>,
}

impl Session {
	/// A fresh session for an external key, not yet persisted.
	pub fn started(session_id: &str, now: OffsetDateTime) -> Self {
		Self {
			id: Uuid::new_v4(),
			session_id: session_id.to_string(),
			start_time: now,
			last_activity_time: now,
			search_queries: Vec::new(),
			clicked_results: Vec::new(),
			viewed_categories: Vec::new(),
			viewed_brands: Vec::new(),
			filters: Vec::new(),
		}
	}
}

/// One tracked user action, owned by exactly one session. Immutable once
/// written.
#[derive(Clone, Debug)]
pub struct Interaction {
	pub id: Uuid,
	pub session_id: Uuid,
	pub kind: InteractionKind,
	pub data: Value,
	pub duration_ms: Option<i64>,
	pub timestamp: OffsetDateTime,
	pub created_at: OffsetDateTime,
}

impl Interaction {
	pub fn data(&self) -> Option<InteractionData> {
		InteractionData::from_parts(self.kind, &self.data)
	}
}
