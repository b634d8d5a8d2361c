use coherence_graph_canvas::segment_graph::{
	CoherenceResult, Contradiction, LayoutMap, LinkKind, NodeLayout, NodeRole, PrimaryIssue,
	ScoreDetail, Segment, Severity, build, load_coherence, load_segments,
};
use proptest::prelude::*;

const SAMPLE_SESSION: &str = include_str!("../assets/sample_session.json");
const SAMPLE_COHERENCE: &str = include_str!("../assets/sample_coherence.json");

fn segment(id: u32, score: f64, text: &str) -> Segment {
	let detail = Some(ScoreDetail {
		score: 8.0,
		reason: "fine".to_string(),
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

fn contradiction(a: u32, b: u32) -> Contradiction {
	Contradiction {
		segment1_id: a,
		segment2_id: b,
		severity: Severity::Moderate,
		statement1: None,
		statement2: None,
		contradiction_type: None,
		explanation: None,
	}
}

#[test]
fn rebuild_with_same_input_is_identical() {
	let segments = load_segments(SAMPLE_SESSION).unwrap();
	let coherence = load_coherence(SAMPLE_COHERENCE).unwrap();
	let first = build(&segments, Some(&coherence), &LayoutMap::new());
	let second = build(&segments, Some(&coherence), &LayoutMap::new());
	assert_eq!(first, second);
}

#[test]
fn late_coherence_keeps_node_positions() {
	let segments = load_segments(SAMPLE_SESSION).unwrap();
	let initial = build(&segments, None, &LayoutMap::new());
	let mut previous = initial.layout.clone();
	previous.set(2, NodeLayout::at(10.0, 20.0));

	let coherence = load_coherence(SAMPLE_COHERENCE).unwrap();
	let refreshed = build(&segments, Some(&coherence), &previous);
	let layout = refreshed.layout.get(2).unwrap();
	assert_eq!((layout.x, layout.y), (10.0, 20.0));
	assert_ne!(initial.links, refreshed.links);
}

#[test]
fn single_segment_session() {
	let graph = build(&[segment(0, 3.0, "only one")], None, &LayoutMap::new());
	assert_eq!(graph.nodes.len(), 1);
	assert_eq!(graph.nodes[0].role, NodeRole::Introduce);
	assert!(graph.links.is_empty());
	assert_eq!(graph.clusters, vec![vec![0]]);
}

#[test]
fn sample_session_with_coherence() {
	let segments = load_segments(SAMPLE_SESSION).unwrap();
	let coherence = load_coherence(SAMPLE_COHERENCE).unwrap();
	let graph = build(&segments, Some(&coherence), &LayoutMap::new());

	assert_eq!(graph.nodes.len(), 8);
	assert_eq!(graph.links.len(), 8);

	let anecdote = graph.node(3).unwrap();
	assert_eq!(anecdote.role, NodeRole::Anomaly);
	assert_eq!(anecdote.primary_issue, PrimaryIssue::Structure);
	assert!(anecdote.is_drift);
	assert_eq!(anecdote.drift_degree, 0.8);

	let gap = graph.links.iter().find(|l| l.id == "3-4").unwrap();
	assert_eq!(gap.kind, LinkKind::Gap);

	let contra = graph
		.links
		.iter()
		.find(|l| l.kind == LinkKind::Contradiction)
		.unwrap();
	assert_eq!((contra.source, contra.target), (5, 6));
	assert_eq!(contra.severity, Some(Severity::Major));

	assert_eq!(graph.node(0).unwrap().role, NodeRole::Introduce);
	assert_eq!(graph.node(7).unwrap().role, NodeRole::Conclude);
	assert_eq!(graph.node(5).unwrap().primary_issue, PrimaryIssue::Correctness);
}

#[test]
fn missing_coherence_means_no_coherence_links() {
	let segments = load_segments(SAMPLE_SESSION).unwrap();
	let graph = build(&segments, None, &LayoutMap::new());
	assert!(graph.links.iter().all(|l| l.kind.is_sequential()));
	assert!(graph.links.iter().all(|l| l.kind != LinkKind::Gap));
	assert!(graph.nodes.iter().all(|n| !n.is_drift));
}

const WORDS: [&str; 6] = ["loop", "closure", "decorator", "function", "wrap", "test"];

fn arb_segments() -> impl Strategy<Value = Vec<Segment>> {
	prop::collection::vec(
		(0.0f64..=10.0, prop::collection::vec(0..WORDS.len(), 0..5)),
		0..12,
	)
	.prop_map(|rows| {
		rows.into_iter()
			.enumerate()
			.map(|(i, (score, words))| {
				let text: Vec<&str> = words.into_iter().map(|w| WORDS[w]).collect();
				segment(i as u32, score, &text.join(" "))
			})
			.collect()
	})
}

proptest! {
	#[test]
	fn clusters_partition_nodes_in_order(segments in arb_segments()) {
		let graph = build(&segments, None, &LayoutMap::new());
		prop_assert!(graph.clusters.iter().all(|c| !c.is_empty()));
		let flattened: Vec<u32> = graph.clusters.concat();
		let ids: Vec<u32> = segments.iter().map(|s| s.segment_id).collect();
		prop_assert_eq!(flattened, ids);
	}

	#[test]
	fn link_count_matches_segments_and_contradictions(
		segments in arb_segments(),
		pairs in prop::collection::vec((0u32..16, 0u32..16), 0..6),
	) {
		let coherence = CoherenceResult {
			contradictions: pairs.iter().map(|&(a, b)| contradiction(a, b)).collect(),
			..Default::default()
		};
		let graph = build(&segments, Some(&coherence), &LayoutMap::new());

		let n = segments.len() as u32;
		let resolvable = pairs.iter().filter(|&&(a, b)| a < n && b < n).count();
		let sequential = graph.links.iter().filter(|l| l.kind.is_sequential()).count();
		prop_assert_eq!(sequential, segments.len().saturating_sub(1));
		prop_assert_eq!(graph.links.len() - sequential, resolvable);
		prop_assert_eq!(graph.nodes.len(), segments.len());
	}

	#[test]
	fn radius_tracks_score(segments in arb_segments()) {
		let graph = build(&segments, None, &LayoutMap::new());
		for node in &graph.nodes {
			prop_assert!(node.radius >= 15.0 && node.radius <= 40.0);
		}
	}
}
