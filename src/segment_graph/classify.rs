//! Heuristic node and link classification.

use serde::Serialize;

use super::model::{Metric, Segment};

/// Overall score below which a mid-session segment is an anomaly.
pub const ANOMALY_SCORE: f64 = 5.0;
/// Lowest metric score at or above which a segment has no primary issue.
pub const GOOD_METRIC_SCORE: f64 = 7.5;
/// Endpoint score below which an otherwise solid link is an error link.
pub const ERROR_LINK_SCORE: f64 = 6.0;

/// Similarity below which a sequential link is weak.
pub const WEAK_SIMILARITY: f64 = 0.3;
/// Similarity below which a sequential link is drift.
pub const DRIFT_SIMILARITY: f64 = 0.5;
/// Next similarity above which a loosely attached segment leads somewhere.
pub const TRANSITION_NEXT_SIMILARITY: f64 = 0.5;
/// Similarity both sides must exceed for an elaborating segment.
pub const ELABORATE_SIMILARITY: f64 = 0.7;
/// Previous similarity below which a segment starts a new thread.
pub const ROOT_SIMILARITY: f64 = 0.3;
/// Next similarity below which a segment ends its thread.
// Lower than ROOT_SIMILARITY; kept as observed, tuning is an open question.
pub const DEAD_END_SIMILARITY: f64 = 0.2;
/// Adjacent segments join a cluster only above this similarity.
pub const CLUSTER_SIMILARITY: f64 = 0.5;

/// Role of a segment in the flow of the explanation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
	/// First segment.
	Introduce,
	/// Last segment.
	Conclude,
	/// Poorly scored segment in the middle.
	Anomaly,
	/// Moves the session along.
	Transition,
	/// Closely continues both neighbours.
	Elaborate,
}

impl NodeRole {
	/// Lowercase name, as serialized.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeRole::Introduce => "introduce",
			NodeRole::Conclude => "conclude",
			NodeRole::Anomaly => "anomaly",
			NodeRole::Transition => "transition",
			NodeRole::Elaborate => "elaborate",
		}
	}
}

/// Weakest metric of a segment, which picks its colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryIssue {
	/// Every metric reached the good threshold.
	Good,
	/// Lowest metric is clarity.
	Clarity,
	/// Lowest metric is structure.
	Structure,
	/// Lowest metric is correctness.
	Correctness,
	/// Lowest metric is pacing.
	Pacing,
	/// Lowest metric is communication.
	Communication,
}

impl PrimaryIssue {
	/// Every issue, in legend order.
	pub const ALL: [PrimaryIssue; 6] = [
		PrimaryIssue::Good,
		PrimaryIssue::Clarity,
		PrimaryIssue::Structure,
		PrimaryIssue::Correctness,
		PrimaryIssue::Pacing,
		PrimaryIssue::Communication,
	];

	/// Fill colour of nodes with this issue.
	pub fn color(self) -> &'static str {
		match self {
			PrimaryIssue::Good => "#10b981",
			PrimaryIssue::Clarity => "#3b82f6",
			PrimaryIssue::Structure => "#8b5cf6",
			PrimaryIssue::Correctness => "#ef4444",
			PrimaryIssue::Pacing => "#f59e0b",
			PrimaryIssue::Communication => "#ec4899",
		}
	}

	/// Legend text.
	pub fn label(self) -> &'static str {
		match self {
			PrimaryIssue::Good => "Good",
			PrimaryIssue::Clarity => "Clarity",
			PrimaryIssue::Structure => "Structure",
			PrimaryIssue::Correctness => "Correctness",
			PrimaryIssue::Pacing => "Pacing",
			PrimaryIssue::Communication => "Communication",
		}
	}
}

impl From<Metric> for PrimaryIssue {
	fn from(metric: Metric) -> Self {
		match metric {
			Metric::Clarity => PrimaryIssue::Clarity,
			Metric::Structure => PrimaryIssue::Structure,
			Metric::Correctness => PrimaryIssue::Correctness,
			Metric::Pacing => PrimaryIssue::Pacing,
			Metric::Communication => PrimaryIssue::Communication,
		}
	}
}

/// Position of a segment within its session plus its neighbour similarities.
#[derive(Clone, Copy, Debug)]
pub struct Neighborhood {
	/// Position in the session.
	pub index: usize,
	/// Number of segments in the session.
	pub total: usize,
	/// Similarity to the previous segment, `None` for the first.
	pub prev_sim: Option<f64>,
	/// Similarity to the next segment, `None` for the last.
	pub next_sim: Option<f64>,
}

impl Neighborhood {
	/// Opens the session.
	pub fn is_first(&self) -> bool {
		self.index == 0
	}

	/// Closes the session.
	pub fn is_last(&self) -> bool {
		self.index + 1 == self.total
	}

	/// First segment, or weakly tied to the previous one.
	pub fn is_root(&self) -> bool {
		self.is_first() || self.prev_sim.unwrap_or(0.0) < ROOT_SIMILARITY
	}

	/// Last segment, or barely picked up by the next one.
	pub fn is_dead_end(&self) -> bool {
		self.is_last() || self.next_sim.unwrap_or(0.0) < DEAD_END_SIMILARITY
	}
}

/// First matching rule wins; index 0 is `Introduce` even in a one-segment
/// session.
pub fn classify_role(hood: &Neighborhood, overall_score: f64) -> NodeRole {
	if hood.is_first() {
		return NodeRole::Introduce;
	}
	if hood.is_last() {
		return NodeRole::Conclude;
	}
	if overall_score < ANOMALY_SCORE {
		return NodeRole::Anomaly;
	}

	let prev_sim = hood.prev_sim.unwrap_or(0.0);
	let next_sim = hood.next_sim.unwrap_or(0.0);
	if prev_sim < WEAK_SIMILARITY && next_sim > TRANSITION_NEXT_SIMILARITY {
		NodeRole::Transition
	} else if prev_sim > ELABORATE_SIMILARITY && next_sim > ELABORATE_SIMILARITY {
		NodeRole::Elaborate
	} else {
		NodeRole::Transition
	}
}

/// Lowest-scoring metric, or `Good` when even the lowest reaches 7.5.
pub fn primary_issue(segment: &Segment) -> PrimaryIssue {
	let mut lowest = (Metric::ALL[0], segment.metric_score(Metric::ALL[0]));
	for metric in &Metric::ALL[1..] {
		let score = segment.metric_score(*metric);
		// strict: earlier metrics keep ties
		if score < lowest.1 {
			lowest = (*metric, score);
		}
	}

	if lowest.1 >= GOOD_METRIC_SCORE {
		PrimaryIssue::Good
	} else {
		lowest.0.into()
	}
}
