//! Derivation of the visual graph from segments and coherence analysis.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use serde::Serialize;

use super::classify::{
	self, CLUSTER_SIMILARITY, DRIFT_SIMILARITY, ERROR_LINK_SCORE, Neighborhood, NodeRole,
	PrimaryIssue, WEAK_SIMILARITY,
};
use super::layout::LayoutMap;
use super::model::{CoherenceResult, Segment, Severity};
use super::similarity;

/// Radius of a node scoring 0.
pub const BASE_RADIUS: f64 = 15.0;
/// Radius added per point of overall score.
pub const RADIUS_PER_POINT: f64 = 2.5;

/// One segment as drawn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
	/// Segment id.
	pub id: u32,
	/// One-based display label, `S1` for segment 0.
	pub label: String,
	/// Segment transcript.
	pub full_text: String,
	/// Overall segment score.
	pub score: f64,
	/// Grows with the score.
	pub radius: f64,
	/// Role in the flow of the explanation.
	pub role: NodeRole,
	/// Weakest metric, or `Good`.
	pub primary_issue: PrimaryIssue,
	/// Fill colour of [`GraphNode::primary_issue`].
	pub color: &'static str,
	/// Named by a topic drift in the coherence report.
	pub is_drift: bool,
	/// Drift degree of that entry, 0 otherwise.
	pub drift_degree: f64,
	/// Starts a new line of thought.
	pub is_root: bool,
	/// Its line of thought is not picked up by the next segment.
	pub is_dead_end: bool,
}

/// Type of a link, which decides its drawing style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
	/// Normal flow between similar, well-scored neighbours.
	Backbone,
	/// Neighbours with almost no shared vocabulary.
	Weak,
	/// Neighbours sharing some vocabulary but drifting apart.
	Drift,
	/// Similar neighbours where one scored poorly.
	Error,
	/// Neighbours with a reported logical gap between them.
	Gap,
	/// Two segments that contradict each other.
	Contradiction,
}

impl LinkKind {
	/// Every kind, in legend order.
	pub const ALL: [LinkKind; 6] = [
		LinkKind::Backbone,
		LinkKind::Weak,
		LinkKind::Drift,
		LinkKind::Error,
		LinkKind::Gap,
		LinkKind::Contradiction,
	];

	/// Whether links of this kind join chronological neighbours.
	pub fn is_sequential(self) -> bool {
		self != LinkKind::Contradiction
	}

	/// Lowercase name, as serialized.
	pub fn as_str(self) -> &'static str {
		match self {
			LinkKind::Backbone => "backbone",
			LinkKind::Weak => "weak",
			LinkKind::Drift => "drift",
			LinkKind::Error => "error",
			LinkKind::Gap => "gap",
			LinkKind::Contradiction => "contradiction",
		}
	}
}

/// Directed link between two segments.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphLink {
	/// Stable key: `"{source}-{target}"` or `"contra-{n}"`.
	pub id: String,
	/// Source segment id.
	pub source: u32,
	/// Target segment id.
	pub target: u32,
	/// What the link means.
	pub kind: LinkKind,
	/// Set on sequential links only.
	pub similarity: Option<f64>,
	/// Set on contradiction links only.
	pub severity: Option<Severity>,
}

/// Contiguous run of node ids joined by high adjacent similarity.
pub type Cluster = Vec<u32>;

/// Output of [`build`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentGraph {
	/// One node per segment, in input order.
	pub nodes: Vec<GraphNode>,
	/// Sequential links first, then contradictions in report order.
	pub links: Vec<GraphLink>,
	/// Partition of the node ids, in order.
	pub clusters: Vec<Cluster>,
	/// Previous layout of every node that survived the rebuild.
	pub layout: LayoutMap,
}

/// Counts shown in the legend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSummary {
	/// Number of nodes.
	pub nodes: usize,
	/// Number of clusters.
	pub clusters: usize,
	/// Nodes flagged as roots.
	pub roots: usize,
	/// Nodes flagged as dead ends.
	pub dead_ends: usize,
	/// Nodes named by a topic drift.
	pub drifting: usize,
	/// Number of links of each kind present.
	pub links_by_kind: BTreeMap<LinkKind, usize>,
}

impl GraphSummary {
	/// Links of `kind`, zero when none.
	pub fn count(&self, kind: LinkKind) -> usize {
		self.links_by_kind.get(&kind).copied().unwrap_or(0)
	}
}

impl SegmentGraph {
	/// No segments were given.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Node of segment `id`.
	pub fn node(&self, id: u32) -> Option<&GraphNode> {
		self.nodes.iter().find(|node| node.id == id)
	}

	/// Ids linked to `id` by any link, in link order.
	pub fn neighbors(&self, id: u32) -> Vec<u32> {
		let mut seen = HashSet::new();
		self.links
			.iter()
			.filter_map(|link| {
				if link.source == id {
					Some(link.target)
				} else if link.target == id {
					Some(link.source)
				} else {
					None
				}
			})
			.filter(|other| seen.insert(*other))
			.collect()
	}

	/// Count nodes, clusters and links for the legend.
	pub fn summary(&self) -> GraphSummary {
		let mut links_by_kind = BTreeMap::new();
		for link in &self.links {
			*links_by_kind.entry(link.kind).or_insert(0) += 1;
		}
		GraphSummary {
			nodes: self.nodes.len(),
			clusters: self.clusters.len(),
			roots: self.nodes.iter().filter(|n| n.is_root).count(),
			dead_ends: self.nodes.iter().filter(|n| n.is_dead_end).count(),
			drifting: self.nodes.iter().filter(|n| n.is_drift).count(),
			links_by_kind,
		}
	}
}

/// Build the graph for `segments` in chronological order.
///
/// Without coherence data only the similarity heuristics apply. `previous` is
/// the layout from the last build; entries for ids that still exist are
/// carried into the result.
pub fn build(
	segments: &[Segment],
	coherence: Option<&CoherenceResult>,
	previous: &LayoutMap,
) -> SegmentGraph {
	if segments.is_empty() {
		return SegmentGraph::default();
	}

	let empty = CoherenceResult::default();
	let coherence = coherence.unwrap_or(&empty);
	let sims = similarity::adjacent_similarities(segments.iter().map(|s| s.text.as_str()));
	let total = segments.len();

	let nodes: Vec<GraphNode> = segments
		.iter()
		.enumerate()
		.map(|(index, segment)| {
			let hood = Neighborhood {
				index,
				total,
				prev_sim: index.checked_sub(1).map(|i| sims[i]),
				next_sim: sims.get(index).copied(),
			};
			build_node(segment, &hood, coherence)
		})
		.collect();

	let mut links = sequential_links(segments, &sims, coherence);
	links.extend(contradiction_links(&nodes, coherence));

	let clusters = cluster(&nodes, &sims);
	let layout = previous.carry(nodes.iter().map(|n| n.id));

	debug!(
		"built segment graph: {} nodes, {} links, {} clusters, {} carried layouts",
		nodes.len(),
		links.len(),
		clusters.len(),
		layout.len()
	);

	SegmentGraph {
		nodes,
		links,
		clusters,
		layout,
	}
}

fn build_node(segment: &Segment, hood: &Neighborhood, coherence: &CoherenceResult) -> GraphNode {
	let score = segment.overall_segment_score;
	let issue = classify::primary_issue(segment);
	let drift = coherence.drift_for(segment.segment_id);

	GraphNode {
		id: segment.segment_id,
		label: format!("S{}", u64::from(segment.segment_id) + 1),
		full_text: segment.text.clone(),
		score,
		radius: BASE_RADIUS + score * RADIUS_PER_POINT,
		role: classify::classify_role(hood, score),
		primary_issue: issue,
		color: issue.color(),
		is_drift: drift.is_some(),
		drift_degree: drift.map(|d| d.drift_degree).unwrap_or(0.0),
		is_root: hood.is_root(),
		is_dead_end: hood.is_dead_end(),
	}
}

fn sequential_links(
	segments: &[Segment],
	sims: &[f64],
	coherence: &CoherenceResult,
) -> Vec<GraphLink> {
	segments
		.windows(2)
		.zip(sims)
		.map(|(pair, &sim)| {
			let (source, target) = (&pair[0], &pair[1]);
			let kind = sequential_kind(source, target, sim, coherence);
			GraphLink {
				id: format!("{}-{}", source.segment_id, target.segment_id),
				source: source.segment_id,
				target: target.segment_id,
				kind,
				similarity: Some(sim),
				severity: None,
			}
		})
		.collect()
}

fn sequential_kind(
	source: &Segment,
	target: &Segment,
	sim: f64,
	coherence: &CoherenceResult,
) -> LinkKind {
	if coherence
		.gap_between(source.segment_id, target.segment_id)
		.is_some()
	{
		LinkKind::Gap
	} else if sim < WEAK_SIMILARITY {
		LinkKind::Weak
	} else if sim < DRIFT_SIMILARITY {
		LinkKind::Drift
	} else if source.overall_segment_score < ERROR_LINK_SCORE
		|| target.overall_segment_score < ERROR_LINK_SCORE
	{
		LinkKind::Error
	} else {
		LinkKind::Backbone
	}
}

fn contradiction_links(nodes: &[GraphNode], coherence: &CoherenceResult) -> Vec<GraphLink> {
	let ids: HashSet<u32> = nodes.iter().map(|n| n.id).collect();
	coherence
		.contradictions
		.iter()
		.enumerate()
		.filter(|(_, c)| ids.contains(&c.segment1_id) && ids.contains(&c.segment2_id))
		.map(|(index, c)| GraphLink {
			id: format!("contra-{index}"),
			source: c.segment1_id,
			target: c.segment2_id,
			kind: LinkKind::Contradiction,
			similarity: None,
			severity: Some(c.severity),
		})
		.collect()
}

fn cluster(nodes: &[GraphNode], sims: &[f64]) -> Vec<Cluster> {
	let mut clusters = Vec::new();
	let mut current = Vec::new();
	for (index, node) in nodes.iter().enumerate() {
		if index > 0 && sims[index - 1] <= CLUSTER_SIMILARITY {
			clusters.push(std::mem::take(&mut current));
		}
		current.push(node.id);
	}
	if !current.is_empty() {
		clusters.push(current);
	}
	clusters
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::segment_graph::layout::NodeLayout;
	use crate::segment_graph::model::{Contradiction, LogicalGap, ScoreDetail, TopicDrift};

	fn segment(id: u32, score: f64, text: &str) -> Segment {
		let detail = Some(ScoreDetail {
			score: 9.0,
			reason: String::new(),
		});
		Segment {
			segment_id: id,
			text: text.to_string(),
			overall_segment_score: score,
			clarity: detail.clone(),
			structure: detail.clone(),
			correctness: detail.clone(),
			pacing: detail.clone(),
			communication: detail,
		}
	}

	fn loops_session() -> Vec<Segment> {
		vec![
			segment(0, 9.0, "intro to loops"),
			segment(1, 4.0, "totally different topic here"),
			segment(2, 9.0, "intro to loops wrap up"),
		]
	}

	fn contradiction(a: u32, b: u32, severity: Severity) -> Contradiction {
		Contradiction {
			segment1_id: a,
			segment2_id: b,
			severity,
			statement1: None,
			statement2: None,
			contradiction_type: None,
			explanation: None,
		}
	}

	fn gap(a: u32, b: u32) -> LogicalGap {
		LogicalGap {
			between_segment1: a,
			between_segment2: b,
			gap_type: None,
			missing_concept: None,
			severity: Severity::Moderate,
		}
	}

	#[test]
	fn empty_input_gives_empty_graph() {
		let graph = build(&[], None, &LayoutMap::new());
		assert_eq!(graph, SegmentGraph::default());
	}

	#[test]
	fn loops_session_end_to_end() {
		let graph = build(&loops_session(), None, &LayoutMap::new());

		let roles: Vec<_> = graph.nodes.iter().map(|n| n.role).collect();
		assert_eq!(
			roles,
			vec![NodeRole::Introduce, NodeRole::Anomaly, NodeRole::Conclude]
		);

		assert_eq!(graph.links.len(), 2);
		assert_eq!(graph.links[0].kind, LinkKind::Weak);
		assert_eq!(graph.links[0].similarity, Some(0.0));
		assert_eq!(graph.links[1].kind, LinkKind::Weak);
		assert_eq!(graph.links[1].similarity, Some(0.0));
		assert_eq!(graph.links[1].id, "1-2");

		assert_eq!(graph.clusters, vec![vec![0], vec![1], vec![2]]);
		assert!(graph.nodes.iter().all(|n| n.is_root && n.is_dead_end));
	}

	#[test]
	fn node_fields_follow_segment() {
		let graph = build(&loops_session(), None, &LayoutMap::new());
		let node = &graph.nodes[1];
		assert_eq!(node.label, "S2");
		assert_eq!(node.radius, 25.0);
		assert_eq!(node.primary_issue, PrimaryIssue::Good);
		assert_eq!(node.color, "#10b981");
		assert!(!node.is_drift);
		assert_eq!(node.drift_degree, 0.0);
	}

	#[test]
	fn gap_beats_low_similarity() {
		let coherence = CoherenceResult {
			logical_gaps: vec![gap(1, 0)],
			..Default::default()
		};
		let graph = build(&loops_session(), Some(&coherence), &LayoutMap::new());
		assert_eq!(graph.links[0].kind, LinkKind::Gap);
		assert_eq!(graph.links[1].kind, LinkKind::Weak);
	}

	#[test]
	fn similar_pairs_type_by_similarity_then_score() {
		let segments = vec![
			segment(0, 9.0, "a b c d"),
			segment(1, 9.0, "a b c d"),
			segment(2, 5.5, "a b c d"),
			segment(3, 9.0, "a b c x"),
			segment(4, 9.0, "a b y z"),
		];
		let graph = build(&segments, None, &LayoutMap::new());
		let kinds: Vec<_> = graph.links.iter().map(|l| l.kind).collect();
		// sims: 1.0, 1.0, 0.6, 1/3
		assert_eq!(
			kinds,
			vec![
				LinkKind::Backbone,
				LinkKind::Error,
				LinkKind::Error,
				LinkKind::Drift
			]
		);
		assert_eq!(graph.clusters, vec![vec![0, 1, 2, 3], vec![4]]);
	}

	#[test]
	fn half_similarity_is_not_drift_and_splits_clusters() {
		// {a, b} against {a}: exactly 0.5
		let graph = build(
			&[segment(0, 9.0, "a b"), segment(1, 9.0, "a")],
			None,
			&LayoutMap::new(),
		);
		assert_eq!(graph.links[0].similarity, Some(0.5));
		assert_eq!(graph.links[0].kind, LinkKind::Backbone);
		assert_eq!(graph.clusters, vec![vec![0], vec![1]]);

		let graph = build(
			&[segment(0, 9.0, "a b"), segment(1, 4.0, "a")],
			None,
			&LayoutMap::new(),
		);
		assert_eq!(graph.links[0].kind, LinkKind::Error);
	}

	#[test]
	fn weak_threshold_is_strict() {
		// 3 shared tokens out of 10
		let graph = build(
			&[
				segment(0, 9.0, "a b c d e f"),
				segment(1, 9.0, "a b c g h i j"),
			],
			None,
			&LayoutMap::new(),
		);
		assert_eq!(graph.links[0].similarity, Some(0.3));
		assert_eq!(graph.links[0].kind, LinkKind::Drift);
		assert!(!graph.nodes[1].is_root);
	}

	#[test]
	fn error_score_threshold_is_strict() {
		let kind = |score| {
			build(
				&[segment(0, score, "a b"), segment(1, 9.0, "a b")],
				None,
				&LayoutMap::new(),
			)
			.links[0]
				.kind
		};
		assert_eq!(kind(6.0), LinkKind::Backbone);
		assert_eq!(kind(5.9), LinkKind::Error);
	}

	#[test]
	fn dead_end_threshold_is_strict() {
		// {a, b, c} against {a, d, e}: exactly 0.2
		let graph = build(
			&[
				segment(0, 9.0, "a b c"),
				segment(1, 9.0, "a b c"),
				segment(2, 9.0, "a d e"),
			],
			None,
			&LayoutMap::new(),
		);
		assert_eq!(graph.links[1].similarity, Some(0.2));
		assert!(!graph.nodes[1].is_dead_end);
		assert_eq!(graph.links[1].kind, LinkKind::Weak);
	}

	#[test]
	fn largest_segment_id_labels_without_overflow() {
		let graph = build(&[segment(u32::MAX, 8.0, "x")], None, &LayoutMap::new());
		assert_eq!(graph.nodes[0].label, "S4294967296");
	}

	#[test]
	fn elaborate_between_close_neighbours() {
		let segments = vec![
			segment(0, 9.0, "a b c"),
			segment(1, 9.0, "a b c"),
			segment(2, 9.0, "a b c"),
		];
		let graph = build(&segments, None, &LayoutMap::new());
		assert_eq!(graph.nodes[1].role, NodeRole::Elaborate);
		assert!(!graph.nodes[1].is_root);
		assert!(!graph.nodes[1].is_dead_end);
	}

	#[test]
	fn contradictions_with_unknown_ids_are_dropped() {
		let coherence = CoherenceResult {
			contradictions: vec![
				contradiction(0, 2, Severity::Major),
				contradiction(0, 99, Severity::Minor),
			],
			..Default::default()
		};
		let graph = build(&loops_session(), Some(&coherence), &LayoutMap::new());
		let contra: Vec<_> = graph
			.links
			.iter()
			.filter(|l| l.kind == LinkKind::Contradiction)
			.collect();
		assert_eq!(contra.len(), 1);
		assert_eq!(contra[0].id, "contra-0");
		assert_eq!(contra[0].severity, Some(Severity::Major));
		assert_eq!(contra[0].similarity, None);
	}

	#[test]
	fn drift_tags_node() {
		let coherence = CoherenceResult {
			topic_drifts: vec![TopicDrift {
				segment_id: 1,
				drift_degree: 0.8,
				expected_topic: None,
				actual_content: None,
			}],
			..Default::default()
		};
		let graph = build(&loops_session(), Some(&coherence), &LayoutMap::new());
		assert!(graph.nodes[1].is_drift);
		assert_eq!(graph.nodes[1].drift_degree, 0.8);
		assert!(!graph.nodes[0].is_drift);
	}

	#[test]
	fn layout_survives_rebuild() {
		let first = build(&loops_session(), None, &LayoutMap::new());
		let mut previous = first.layout.clone();
		previous.set(2, NodeLayout::at(10.0, 20.0));
		previous.set(7, NodeLayout::at(1.0, 1.0));

		let coherence = CoherenceResult {
			contradictions: vec![contradiction(0, 2, Severity::Minor)],
			..Default::default()
		};
		let second = build(&loops_session(), Some(&coherence), &previous);
		let carried = second.layout.get(2).unwrap();
		assert_eq!((carried.x, carried.y), (10.0, 20.0));
		assert!(second.layout.get(7).is_none());
	}

	#[test]
	fn neighbors_and_summary() {
		let coherence = CoherenceResult {
			contradictions: vec![contradiction(0, 2, Severity::Minor)],
			..Default::default()
		};
		let graph = build(&loops_session(), Some(&coherence), &LayoutMap::new());
		assert_eq!(graph.neighbors(0), vec![1, 2]);
		assert_eq!(graph.neighbors(1), vec![0, 2]);

		let summary = graph.summary();
		assert_eq!(summary.nodes, 3);
		assert_eq!(summary.clusters, 3);
		assert_eq!(summary.count(LinkKind::Weak), 2);
		assert_eq!(summary.count(LinkKind::Contradiction), 1);
		assert_eq!(summary.count(LinkKind::Backbone), 0);
	}
}
