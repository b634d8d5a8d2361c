use leptos::prelude::*;

use crate::segment_graph::{GraphNode, GraphSummary, LinkKind, PrimaryIssue};

/// Issue palette and link counts of the current graph.
#[component]
pub fn GraphLegend(summary: RwSignal<GraphSummary>) -> impl IntoView {
	let issues = PrimaryIssue::ALL
		.iter()
		.map(|issue| {
			view! {
				<li>
					<span class="swatch" style=format!("background-color: {}", issue.color())></span>
					{issue.label()}
				</li>
			}
		})
		.collect_view();

	view! {
		<div class="graph-legend">
			<span class="legend-title">"Dominant issues"</span>
			<ul class="legend-issues">{issues}</ul>
			<span class="legend-title">"Structure"</span>
			<ul class="legend-links">
				{move || {
					let summary = summary.get();
					LinkKind::ALL
						.iter()
						.map(|kind| {
							view! {
								<li class=format!("link-{}", kind.as_str())>
									{kind.as_str()}
									": "
									{summary.count(*kind)}
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
			<p class="legend-footer">
				{move || {
					let summary = summary.get();
					format!(
						"{} segments, {} clusters, {} roots, {} dead ends, {} drifting",
						summary.nodes,
						summary.clusters,
						summary.roots,
						summary.dead_ends,
						summary.drifting,
					)
				}}
			</p>
		</div>
	}
}

/// Details of the clicked segment.
#[component]
pub fn NodeDetails(selected: RwSignal<Option<GraphNode>>) -> impl IntoView {
	move || {
		selected.get().map(|node| {
			view! {
				<div class="node-details">
					<div class="node-details-header">
						<span class="node-badge" style=format!("background-color: {}", node.color)>
							{node.label.clone()}
						</span>
						<span class="node-title">{format!("Segment {}", node.id + 1)}</span>
						<span class="node-role">{node.role.as_str()}</span>
						<button class="node-close" on:click=move |_| selected.set(None)>
							"Close"
						</button>
					</div>
					<p class="node-text">{format!("\"{}\"", node.full_text)}</p>
					<div class="node-meta">
						<span>{format!("Score: {:.1}", node.score)}</span>
						<span>{format!("Issue: {}", node.primary_issue.label())}</span>
						{node
							.is_drift
							.then(|| {
								view! {
									<span>{format!("Drift: {:.0}%", node.drift_degree * 100.0)}</span>
								}
							})}
					</div>
				</div>
			}
		})
	}
}
