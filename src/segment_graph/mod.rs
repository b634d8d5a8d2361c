//! Coherence graph of a teaching session: one node per transcript segment,
//! typed links between neighbours and contradicting segments, and clusters of
//! closely related segments. Nothing here touches the browser.

mod classify;
mod error;
mod graph;
mod layout;
mod model;
mod similarity;

pub use classify::{Neighborhood, NodeRole, PrimaryIssue, classify_role, primary_issue};
pub use error::SessionDataError;
pub use graph::{Cluster, GraphLink, GraphNode, GraphSummary, LinkKind, SegmentGraph, build};
pub use layout::{LayoutMap, NodeLayout};
pub use model::{
	CoherenceResult, Contradiction, LogicalGap, MISSING_METRIC_SCORE, Metric, ScoreDetail,
	Segment, Severity, TopicDrift, load_coherence, load_coherence_or_empty, load_segments,
};
pub use similarity::text_similarity;
