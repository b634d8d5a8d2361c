use thiserror::Error;

/// Failures while reading session data handed over by the backend.
#[derive(Debug, Error)]
pub enum SessionDataError {
	/// Segment JSON did not parse.
	#[error("malformed segment list")]
	MalformedSegments {
		/// Parser error.
		#[source]
		source: serde_json::Error,
	},

	/// Coherence JSON did not parse.
	#[error("malformed coherence report")]
	MalformedCoherence {
		/// Parser error.
		#[source]
		source: serde_json::Error,
	},

	/// Node ids must be unique, so a repeated segment id is rejected.
	#[error("duplicate segment id: {id}")]
	DuplicateSegmentId {
		/// The repeated id.
		id: u32,
	},
}
