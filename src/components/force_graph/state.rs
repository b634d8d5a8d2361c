use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};

use super::config::LayoutConfig;
use crate::segment_graph::{GraphNode, LayoutMap, LinkKind, NodeLayout, NodeRole, SegmentGraph, Severity};

pub const DEFAULT_ZOOM: f64 = 0.8;
const NODE_MASS: f32 = 10.0;
const SEED_RADIUS: f64 = 100.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: u32,
	pub label: String,
	pub color: String,
	pub radius: f64,
	pub is_anomaly: bool,
	pub is_drift: bool,
	pub is_root: bool,
	pub is_dead_end: bool,
	/// Resting point of the ordering force.
	pub target_x: f64,
	pub target_y: f64,
}

impl NodeInfo {
	fn from_node(node: &GraphNode, total: usize, config: &LayoutConfig) -> Self {
		let target_x = node.id as f64 * config.order_spacing - total as f64 * config.order_spacing / 2.0;
		let target_y = if node.is_drift {
			let side = if node.id % 2 == 1 { 1.0 } else { -1.0 };
			node.drift_degree * config.drift_offset * side
		} else {
			0.0
		};
		Self {
			id: node.id,
			label: node.label.clone(),
			color: node.color.to_string(),
			radius: node.radius,
			is_anomaly: node.role == NodeRole::Anomaly,
			is_drift: node.is_drift,
			is_root: node.is_root,
			is_dead_end: node.is_dead_end,
			target_x,
			target_y,
		}
	}
}

#[derive(Clone, Debug)]
pub struct EdgeInfo {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub kind: LinkKind,
	pub severity: Option<Severity>,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// Point mass used by the layout passes that run after each physics step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Body {
	pub x: f64,
	pub y: f64,
	pub radius: f64,
	pub target_x: f64,
	pub target_y: f64,
	pub pinned: bool,
}

impl Body {
	fn nudge(&mut self, dx: f64, dy: f64) {
		if !self.pinned {
			self.x += dx;
			self.y += dy;
		}
	}
}

/// Link rest length, ordering, centering and collision passes.
pub(crate) fn settle(bodies: &mut [Body], links: &[(usize, usize)], config: &LayoutConfig, dt: f64) {
	for &(a, b) in links {
		let (dx, dy) = (bodies[b].x - bodies[a].x, bodies[b].y - bodies[a].y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 1e-6 {
			continue;
		}
		let f = ((dist - config.link_distance) / dist * config.link_strength * dt * 0.5)
			.clamp(-0.5, 0.5);
		bodies[a].nudge(dx * f, dy * f);
		bodies[b].nudge(-dx * f, -dy * f);
	}

	let pull = (config.order_strength * dt).min(1.0);
	for body in bodies.iter_mut() {
		let (dx, dy) = ((body.target_x - body.x) * pull, (body.target_y - body.y) * pull);
		body.nudge(dx, dy);
	}

	let free = bodies.iter().filter(|b| !b.pinned).count();
	if free > 0 {
		let (sx, sy) = bodies
			.iter()
			.filter(|b| !b.pinned)
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let shift = (config.center_strength * dt).min(1.0) / free as f64;
		let (cx, cy) = (sx * shift, sy * shift);
		for body in bodies.iter_mut() {
			body.nudge(-cx, -cy);
		}
	}

	for i in 0..bodies.len() {
		for j in (i + 1)..bodies.len() {
			let min_dist =
				bodies[i].radius + bodies[j].radius + 2.0 * config.collision_margin;
			let (dx, dy) = (bodies[j].x - bodies[i].x, bodies[j].y - bodies[i].y);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist >= min_dist {
				continue;
			}
			let (ux, uy) = if dist < 1e-6 { (1.0, 0.0) } else { (dx / dist, dy / dist) };
			let overlap = min_dist - dist;
			// a pinned body does not move, so the other takes the full push
			let (share_i, share_j) = match (bodies[i].pinned, bodies[j].pinned) {
				(true, false) => (0.0, overlap),
				(false, true) => (overlap, 0.0),
				_ => (overlap / 2.0, overlap / 2.0),
			};
			bodies[i].nudge(-ux * share_i, -uy * share_i);
			bodies[j].nudge(ux * share_j, uy * share_j);
		}
	}
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub data: SegmentGraph,
	pub config: LayoutConfig,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub selected: Option<DefaultNodeIdx>,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	pub edges: Vec<EdgeInfo>,
	id_to_idx: HashMap<u32, DefaultNodeIdx>,
	layout: LayoutMap,
}

impl ForceGraphState {
	/// Seed the simulation from `data`. Nodes with a carried layout start where
	/// they were; new nodes are placed on a circle around the origin.
	pub fn new(data: SegmentGraph, config: LayoutConfig, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(config.simulation_parameters());
		let mut id_to_idx = HashMap::new();
		let mut layout = LayoutMap::new();
		let total = data.nodes.len();

		for (i, node) in data.nodes.iter().enumerate() {
			let seeded = data.layout.get(node.id).copied().unwrap_or_else(|| {
				let angle = (i as f64) * 2.0 * PI / total as f64;
				NodeLayout::at(SEED_RADIUS * angle.cos(), SEED_RADIUS * angle.sin())
			});
			let idx = graph.add_node(NodeData {
				x: seeded.x as f32,
				y: seeded.y as f32,
				mass: NODE_MASS,
				is_anchor: false,
				user_data: NodeInfo::from_node(node, total, &config),
			});
			id_to_idx.insert(node.id, idx);
			layout.set(node.id, seeded);
		}

		let mut edges = Vec::new();
		for link in &data.links {
			if let (Some(&src), Some(&tgt)) =
				(id_to_idx.get(&link.source), id_to_idx.get(&link.target))
			{
				// force_graph cannot update a spring from a node to itself
				if src != tgt {
					graph.add_edge(src, tgt, EdgeData::default());
				}
				edges.push(EdgeInfo {
					source: src,
					target: tgt,
					kind: link.kind,
					severity: link.severity,
				});
			}
		}

		Self {
			graph,
			data,
			config,
			edges,
			id_to_idx,
			layout,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: DEFAULT_ZOOM,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			selected: None,
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
		}
	}

	/// Keep the camera and any gesture in progress from the state being
	/// replaced. A drag continues on the same segment if it survived the
	/// rebuild and is dropped otherwise.
	pub fn with_view(mut self, previous: &ForceGraphState) -> Self {
		self.transform = previous.transform.clone();
		self.pan = previous.pan.clone();

		let dragged = previous
			.drag
			.node_idx
			.and_then(|idx| previous.graph_node(idx))
			.and_then(|node| self.node_index(node.id));
		if let Some(idx) = dragged {
			self.drag = DragState {
				node_idx: Some(idx),
				..previous.drag.clone()
			};
			if self.drag.active {
				self.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.is_anchor = true;
					}
				});
			}
		}
		self
	}

	/// Latest position and velocity of every node, keyed by segment id.
	pub fn layout(&self) -> &LayoutMap {
		&self.layout
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < node.data.user_data.radius {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn node_index(&self, id: u32) -> Option<DefaultNodeIdx> {
		self.id_to_idx.get(&id).copied()
	}

	/// Derived record of the node at `idx`.
	pub fn graph_node(&self, idx: DefaultNodeIdx) -> Option<&GraphNode> {
		self.id_to_idx
			.iter()
			.find(|&(_, &i)| i == idx)
			.and_then(|(&id, _)| self.data.node(id))
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for edge in &self.edges {
				if edge.source == idx {
					self.hover.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.hover.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.apply_layout_forces(dt as f64);
		self.record_layout(dt as f64);
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	fn apply_layout_forces(&mut self, dt: f64) {
		let mut bodies = Vec::new();
		let mut slots = HashMap::new();
		self.graph.visit_nodes(|node| {
			let info = &node.data.user_data;
			slots.insert(node.index(), bodies.len());
			bodies.push(Body {
				x: node.x() as f64,
				y: node.y() as f64,
				radius: info.radius,
				target_x: info.target_x,
				target_y: info.target_y,
				pinned: node.data.is_anchor,
			});
		});

		let links: Vec<(usize, usize)> = self
			.edges
			.iter()
			.filter_map(|e| Some((*slots.get(&e.source)?, *slots.get(&e.target)?)))
			.collect();
		settle(&mut bodies, &links, &self.config, dt);

		self.graph.visit_nodes_mut(|node| {
			if let Some(&slot) = slots.get(&node.index()) {
				let body = bodies[slot];
				if !body.pinned {
					node.data.x = body.x as f32;
					node.data.y = body.y as f32;
				}
			}
		});
	}

	fn record_layout(&mut self, dt: f64) {
		let mut positions = Vec::new();
		self.graph.visit_nodes(|node| {
			positions.push((node.data.user_data.id, node.x() as f64, node.y() as f64));
		});
		for (id, x, y) in positions {
			let (vx, vy) = match self.layout.get(id) {
				Some(prev) if dt > 0.0 => ((x - prev.x) / dt, (y - prev.y) / dt),
				_ => (0.0, 0.0),
			};
			self.layout.set(id, NodeLayout { x, y, vx, vy });
		}
	}

	/// Zoom by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(0.1, 4.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn zoom_by(&mut self, factor: f64) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, factor);
	}

	pub fn reset_view(&mut self) {
		self.transform = ViewTransform {
			x: self.width / 2.0,
			y: self.height / 2.0,
			k: DEFAULT_ZOOM,
		};
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
