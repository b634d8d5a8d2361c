//! Evaluation segments and coherence reports as the backend serves them.

use std::collections::HashSet;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::SessionDataError;

/// Score used for a metric the evaluator left out. Treated as non-problematic,
/// which hides malformed upstream data from the issue classifier.
pub const MISSING_METRIC_SCORE: f64 = 10.0;

/// One scored metric of a segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetail {
	/// Score out of 10.
	pub score: f64,
	/// Evaluator's explanation.
	#[serde(default)]
	pub reason: String,
}

/// The five evaluation metrics, in tie-breaking order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
	/// How understandable the explanation is.
	Clarity,
	/// How well it is organised.
	Structure,
	/// Whether it is technically right.
	Correctness,
	/// Whether its speed suits the learner.
	Pacing,
	/// Tone and engagement.
	Communication,
}

impl Metric {
	/// Fixed iteration order. The first metric wins when minimum scores tie.
	pub const ALL: [Metric; 5] = [
		Metric::Clarity,
		Metric::Structure,
		Metric::Correctness,
		Metric::Pacing,
		Metric::Communication,
	];
}

/// One scored unit of a transcribed session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
	/// Unique within the session.
	pub segment_id: u32,
	/// Transcript of the segment.
	#[serde(default)]
	pub text: String,
	/// Overall score out of 10.
	pub overall_segment_score: f64,
	/// Clarity score, if evaluated.
	#[serde(default)]
	pub clarity: Option<ScoreDetail>,
	/// Structure score, if evaluated.
	#[serde(default)]
	pub structure: Option<ScoreDetail>,
	/// Correctness score, if evaluated.
	#[serde(default)]
	pub correctness: Option<ScoreDetail>,
	/// Pacing score, if evaluated.
	#[serde(default)]
	pub pacing: Option<ScoreDetail>,
	/// Communication score, if evaluated.
	#[serde(default)]
	pub communication: Option<ScoreDetail>,
}

impl Segment {
	/// Detail of `metric`, if the evaluator scored it.
	pub fn metric(&self, metric: Metric) -> Option<&ScoreDetail> {
		match metric {
			Metric::Clarity => self.clarity.as_ref(),
			Metric::Structure => self.structure.as_ref(),
			Metric::Correctness => self.correctness.as_ref(),
			Metric::Pacing => self.pacing.as_ref(),
			Metric::Communication => self.communication.as_ref(),
		}
	}

	/// Score for `metric`, or [`MISSING_METRIC_SCORE`] when absent.
	pub fn metric_score(&self, metric: Metric) -> f64 {
		self.metric(metric)
			.map(|detail| detail.score)
			.unwrap_or(MISSING_METRIC_SCORE)
	}
}

/// How serious a contradiction or gap is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	/// Small inconsistency.
	Minor,
	/// Default when the report says nothing usable.
	#[default]
	Moderate,
	/// Likely to confuse the learner.
	Major,
}

impl Severity {
	/// Read a free-form severity label. Case and surrounding whitespace are
	/// ignored; unknown labels map to [`Severity::Moderate`].
	pub fn from_label(label: &str) -> Self {
		match label.trim().to_ascii_lowercase().as_str() {
			"minor" | "low" => Severity::Minor,
			"major" | "high" | "critical" | "severe" => Severity::Major,
			_ => Severity::Moderate,
		}
	}
}

// null and unknown labels read as moderate
impl<'de> Deserialize<'de> for Severity {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let label = Option::<String>::deserialize(deserializer)?;
		Ok(label.as_deref().map(Severity::from_label).unwrap_or_default())
	}
}

/// Two segments that state conflicting things.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
	/// Earlier segment.
	pub segment1_id: u32,
	/// Later segment.
	pub segment2_id: u32,
	/// Drives the stroke width of the link.
	#[serde(default)]
	pub severity: Severity,
	/// Quote from the first segment.
	#[serde(default)]
	pub statement1: Option<String>,
	/// Quote from the second segment.
	#[serde(default)]
	pub statement2: Option<String>,
	/// Free-form category.
	#[serde(default)]
	pub contradiction_type: Option<String>,
	/// Why the statements conflict.
	#[serde(default)]
	pub explanation: Option<String>,
}

/// A segment that wanders off the session topic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicDrift {
	/// Drifting segment.
	pub segment_id: u32,
	/// How far it drifted, from 0 to 1.
	pub drift_degree: f64,
	/// What the segment should have covered.
	#[serde(default)]
	pub expected_topic: Option<String>,
	/// What it covered instead.
	#[serde(default)]
	pub actual_content: Option<String>,
}

/// Missing step between two segments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogicalGap {
	/// One side of the gap.
	pub between_segment1: u32,
	/// Other side of the gap.
	pub between_segment2: u32,
	/// Free-form category.
	#[serde(default)]
	pub gap_type: Option<String>,
	/// Concept that should have bridged the gap.
	#[serde(default)]
	pub missing_concept: Option<String>,
	/// How badly the gap hurts the explanation.
	#[serde(default)]
	pub severity: Severity,
}

impl LogicalGap {
	/// Whether the gap sits between `a` and `b`, in either order.
	pub fn joins(&self, a: u32, b: u32) -> bool {
		(self.between_segment1 == a && self.between_segment2 == b)
			|| (self.between_segment1 == b && self.between_segment2 == a)
	}
}

/// Coherence analysis of a session. Every list is empty when absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoherenceResult {
	/// Conflicting segment pairs.
	#[serde(default)]
	pub contradictions: Vec<Contradiction>,
	/// Segments off topic.
	#[serde(default)]
	pub topic_drifts: Vec<TopicDrift>,
	/// Missing steps between segments.
	#[serde(default)]
	pub logical_gaps: Vec<LogicalGap>,
	/// Whole-session score out of 10.
	#[serde(default)]
	pub session_coherence_score: Option<f64>,
	/// Summary written by the analyser.
	#[serde(default)]
	pub overall_assessment: Option<String>,
}

impl CoherenceResult {
	/// First topic drift naming `segment_id`.
	pub fn drift_for(&self, segment_id: u32) -> Option<&TopicDrift> {
		self.topic_drifts
			.iter()
			.find(|drift| drift.segment_id == segment_id)
	}

	/// Logical gap between `a` and `b`, in either order.
	pub fn gap_between(&self, a: u32, b: u32) -> Option<&LogicalGap> {
		self.logical_gaps.iter().find(|gap| gap.joins(a, b))
	}
}

/// The evaluation endpoint wraps segments in an object; a plain array is
/// accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum SegmentsPayload {
	Bare(Vec<Segment>),
	Evaluation { segments: Vec<Segment> },
}

/// Parse evaluation segments, rejecting duplicate segment ids.
pub fn load_segments(json: &str) -> Result<Vec<Segment>, SessionDataError> {
	let payload: SegmentsPayload = serde_json::from_str(json)
		.map_err(|source| SessionDataError::MalformedSegments { source })?;
	let segments = match payload {
		SegmentsPayload::Bare(segments) => segments,
		SegmentsPayload::Evaluation { segments } => segments,
	};

	let mut seen = HashSet::with_capacity(segments.len());
	for segment in &segments {
		if !seen.insert(segment.segment_id) {
			return Err(SessionDataError::DuplicateSegmentId {
				id: segment.segment_id,
			});
		}
	}
	Ok(segments)
}

/// Parse a coherence report.
pub fn load_coherence(json: &str) -> Result<CoherenceResult, SessionDataError> {
	serde_json::from_str(json).map_err(|source| SessionDataError::MalformedCoherence { source })
}

/// Parse a coherence report, falling back to an empty one on failure.
pub fn load_coherence_or_empty(json: &str) -> CoherenceResult {
	load_coherence(json).unwrap_or_else(|err| {
		warn!("coherence report unreadable, using empty result: {err}");
		CoherenceResult::default()
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn loads_bare_segment_array() {
		let json = r#"[
			{"segment_id": 0, "text": "hello", "overall_segment_score": 8.0,
			 "clarity": {"score": 7.0, "reason": "ok"}}
		]"#;
		let segments = load_segments(json).unwrap();
		assert_eq!(segments.len(), 1);
		assert_eq!(segments[0].metric_score(Metric::Clarity), 7.0);
		assert_eq!(segments[0].metric_score(Metric::Pacing), MISSING_METRIC_SCORE);
	}

	#[test]
	fn loads_segments_from_evaluation_envelope() {
		let json = r#"{"session_id": "abc", "overall_score": 7.1,
			"segments": [{"segment_id": 3, "text": "x", "overall_segment_score": 5.0}]}"#;
		let segments = load_segments(json).unwrap();
		assert_eq!(segments[0].segment_id, 3);
	}

	#[test]
	fn rejects_duplicate_segment_ids() {
		let json = r#"[
			{"segment_id": 1, "text": "a", "overall_segment_score": 8.0},
			{"segment_id": 1, "text": "b", "overall_segment_score": 8.0}
		]"#;
		assert!(matches!(
			load_segments(json),
			Err(SessionDataError::DuplicateSegmentId { id: 1 })
		));
	}

	#[test]
	fn rejects_malformed_segments() {
		assert!(matches!(
			load_segments("{not json"),
			Err(SessionDataError::MalformedSegments { .. })
		));
	}

	#[test]
	fn coherence_lists_default_to_empty() {
		let coherence = load_coherence(r#"{"contradictions": [
			{"segment1_id": 0, "segment2_id": 2}
		]}"#)
		.unwrap();
		assert!(coherence.topic_drifts.is_empty());
		assert!(coherence.logical_gaps.is_empty());
		assert_eq!(coherence.contradictions[0].severity, Severity::Moderate);
	}

	#[test]
	fn severity_labels_are_read_leniently() {
		let coherence = load_coherence(r#"{
			"contradictions": [
				{"segment1_id": 0, "segment2_id": 1, "severity": "Major"},
				{"segment1_id": 0, "segment2_id": 2, "severity": "high"},
				{"segment1_id": 1, "segment2_id": 2, "severity": null},
				{"segment1_id": 1, "segment2_id": 3, "severity": " MINOR "}
			],
			"topic_drifts": [{"segment_id": 2, "drift_degree": 0.6}],
			"logical_gaps": [
				{"between_segment1": 2, "between_segment2": 3, "severity": "whatever"}
			]
		}"#)
		.unwrap();
		let severities: Vec<Severity> = coherence.contradictions.iter().map(|c| c.severity).collect();
		assert_eq!(
			severities,
			vec![Severity::Major, Severity::Major, Severity::Moderate, Severity::Minor]
		);
		assert_eq!(coherence.logical_gaps[0].severity, Severity::Moderate);
		assert_eq!(coherence.topic_drifts.len(), 1);
	}

	#[test]
	fn unreadable_coherence_falls_back_to_empty() {
		assert_eq!(load_coherence_or_empty("oops"), CoherenceResult::default());
	}

	#[test]
	fn gap_lookup_ignores_direction() {
		let coherence = CoherenceResult {
			logical_gaps: vec![LogicalGap {
				between_segment1: 4,
				between_segment2: 3,
				gap_type: None,
				missing_concept: None,
				severity: Severity::Major,
			}],
			..Default::default()
		};
		assert!(coherence.gap_between(3, 4).is_some());
		assert!(coherence.gap_between(4, 3).is_some());
		assert!(coherence.gap_between(4, 5).is_none());
	}
}
