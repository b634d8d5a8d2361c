use force_graph::SimulationParameters;

/// Tunables for the force-directed layout of a session graph.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
	/// Repulsion between every pair of nodes.
	pub force_charge: f32,
	/// Spring constant of the physics links.
	pub force_spring: f32,
	/// Cap on the force applied to one node per step.
	pub force_max: f32,
	/// Velocity scale of the physics step.
	pub node_speed: f32,
	/// Velocity kept after each step.
	pub damping_factor: f32,
	/// Rest length of every link.
	pub link_distance: f64,
	/// Fraction of the link length error corrected per second.
	pub link_strength: f64,
	/// Pull toward the origin, per second.
	pub center_strength: f64,
	/// Pull toward the chronological column and drift row, per second.
	pub order_strength: f64,
	/// Horizontal distance between consecutive segment columns.
	pub order_spacing: f64,
	/// Vertical offset of a fully drifting segment.
	pub drift_offset: f64,
	/// Extra clearance around each node's radius.
	pub collision_margin: f64,
	/// Canvas width when neither a prop nor the viewport gives one.
	pub fallback_width: f64,
	/// Canvas height when neither a prop nor the viewport gives one.
	pub fallback_height: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			force_charge: 400.0,
			force_spring: 0.02,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			link_distance: 120.0,
			link_strength: 1.2,
			center_strength: 0.3,
			order_strength: 1.5,
			order_spacing: 100.0,
			drift_offset: 200.0,
			collision_margin: 15.0,
			fallback_width: 900.0,
			fallback_height: 500.0,
		}
	}
}

impl LayoutConfig {
	/// Physics settings for `force_graph`.
	pub fn simulation_parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}
