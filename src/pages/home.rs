use leptos::prelude::*;
use log::error;

use crate::components::force_graph::ForceGraphCanvas;
use crate::segment_graph::{CoherenceResult, load_coherence_or_empty, load_segments};

const SAMPLE_SESSION: &str = include_str!("../../assets/sample_session.json");
const SAMPLE_COHERENCE: &str = include_str!("../../assets/sample_coherence.json");

/// Session graph of the bundled sample session. Coherence analysis starts
/// out missing and is attached on demand, the way a finished backend check
/// arrives after the segments have rendered.
#[component]
pub fn Home() -> impl IntoView {
	let session = load_segments(SAMPLE_SESSION)
		.inspect_err(|err| error!("sample session unreadable: {err}"));
	let coherence = RwSignal::new(None::<CoherenceResult>);

	let toggle_coherence = move |_: leptos::ev::MouseEvent| {
		if coherence.with_untracked(Option::is_some) {
			coherence.set(None);
		} else {
			coherence.set(Some(load_coherence_or_empty(SAMPLE_COHERENCE)));
		}
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				{session
					.map(|segments| {
						view! {
							<ForceGraphCanvas
								segments=Signal::derive(move || segments.clone())
								coherence=coherence
								fullscreen=true
							/>
						}
					})}
				<div class="graph-overlay">
					<h1>"Explanation Flow Structure"</h1>
					<p class="subtitle">
						"Drag nodes to reposition. Scroll to zoom. Drag background to pan. Click a segment for details."
					</p>
					<button class="coherence-toggle" on:click=toggle_coherence>
						{move || {
							if coherence.with(Option::is_some) {
								"Hide coherence issues"
							} else {
								"Check coherence"
							}
						}}
					</button>
					<p class="assessment">
						{move || {
							coherence
								.with(|c| c.as_ref().and_then(|c| c.overall_assessment.clone()))
								.unwrap_or_default()
						}}
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
