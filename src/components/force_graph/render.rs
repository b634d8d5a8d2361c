use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, NodeInfo};
use crate::segment_graph::{LinkKind, Severity};

const BACKGROUND: &str = "#0f172a";

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Stroke appearance of one link kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkStyle {
	pub rgb: (u8, u8, u8),
	pub width: f64,
	/// Dash and gap lengths; `None` draws a solid line.
	pub dash: Option<(f64, f64)>,
	/// Animate the dash pattern along the link.
	pub flowing: bool,
	pub curved: bool,
}

pub fn link_style(kind: LinkKind, severity: Option<Severity>) -> LinkStyle {
	let solid = |rgb, width| LinkStyle {
		rgb,
		width,
		dash: None,
		flowing: false,
		curved: false,
	};
	match kind {
		LinkKind::Backbone => solid((148, 163, 184), 3.0),
		LinkKind::Error => solid((245, 158, 11), 3.0),
		LinkKind::Weak => LinkStyle {
			dash: Some((3.0, 6.0)),
			..solid((148, 163, 184), 1.5)
		},
		LinkKind::Drift => LinkStyle {
			dash: Some((6.0, 6.0)),
			..solid((100, 116, 139), 2.0)
		},
		LinkKind::Gap => LinkStyle {
			dash: Some((12.0, 10.0)),
			flowing: true,
			..solid((203, 213, 225), 2.0)
		},
		LinkKind::Contradiction => {
			let width = match severity.unwrap_or_default() {
				Severity::Minor => 1.5,
				Severity::Moderate => 2.0,
				Severity::Major => 3.0,
			};
			LinkStyle {
				curved: true,
				..solid((239, 68, 68), width)
			}
		}
	}
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn node_positions(state: &ForceGraphState) -> HashMap<DefaultNodeIdx, (f64, f64, f64)> {
	let mut positions = HashMap::new();
	state.graph.visit_nodes(|node| {
		positions.insert(
			node.index(),
			(node.x() as f64, node.y() as f64, node.data.user_data.radius),
		);
	});
	positions
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let arrow_size = 8.0 / k;
	let t = ease_out_cubic(state.hover.highlight_t);
	let positions = node_positions(state);

	for edge in &state.edges {
		let (Some(&(x1, y1, r1)), Some(&(x2, y2, r2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		let style = link_style(edge.kind, edge.severity);
		let is_highlighted =
			state.is_highlighted(edge.source) && state.is_highlighted(edge.target);

		// t=0: all edges at base (0.6), t=1: highlighted at 0.9, others at 0.15
		let (edge_alpha, arrow_alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, style.width / k * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, style.width / k * (1.0 - 0.3 * t))
		};
		let (r, g, b) = style.rgb;

		ctx.set_stroke_style_str(&format!("rgba({r}, {g}, {b}, {edge_alpha})"));
		ctx.set_line_width(width);

		if edge.source == edge.target {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
			draw_self_loop(ctx, x1, y1, r1);
			continue;
		}
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		match style.dash {
			Some((dash, gap)) => {
				let (dash, gap) = (dash / k, gap / k);
				let _ = ctx.set_line_dash(&js_sys::Array::of2(
					&JsValue::from_f64(dash),
					&JsValue::from_f64(gap),
				));
				let offset = if style.flowing {
					-(state.flow_time * 30.0) % (dash + gap)
				} else {
					0.0
				};
				ctx.set_line_dash_offset(offset);
			}
			None => {
				let _ = ctx.set_line_dash(&js_sys::Array::new());
			}
		}

		let (ux, uy) = (dx / dist, dy / dist);
		let (sx, sy) = (x1 + ux * r1, y1 + uy * r1);
		// tip direction: along the link, or along the curve's end tangent
		let (tx, ty) = if style.curved {
			let (cx, cy) = curve_control(x1, y1, x2, y2, dist);
			let (ex, ey) = (x2 - cx, y2 - cy);
			let len = (ex * ex + ey * ey).sqrt().max(0.001);
			ctx.begin_path();
			ctx.move_to(sx, sy);
			let (tx, ty) = (ex / len, ey / len);
			ctx.quadratic_curve_to(
				cx,
				cy,
				x2 - tx * (r2 + arrow_size),
				y2 - ty * (r2 + arrow_size),
			);
			ctx.stroke();
			(tx, ty)
		} else {
			ctx.begin_path();
			ctx.move_to(sx, sy);
			ctx.line_to(x2 - ux * (r2 + arrow_size), y2 - uy * (r2 + arrow_size));
			ctx.stroke();
			(ux, uy)
		};

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&format!("rgba({r}, {g}, {b}, {arrow_alpha})"));
		let (tip_x, tip_y) = (x2 - tx * r2, y2 - ty * r2);
		let (back_x, back_y) = (tip_x - tx * arrow_size, tip_y - ty * arrow_size);
		let (px, py) = (-ty * arrow_size * 0.5, tx * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

/// Loop above the node, for a segment contradicting itself.
fn draw_self_loop(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64) {
	let loop_radius = radius * 0.6;
	ctx.begin_path();
	let _ = ctx.arc(x, y - radius - loop_radius * 0.5, loop_radius, 0.0, 2.0 * PI);
	ctx.stroke();
}

/// Control point bending a contradiction link off the straight line.
fn curve_control(x1: f64, y1: f64, x2: f64, y2: f64, dist: f64) -> (f64, f64) {
	let (mx, my) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
	let (nx, ny) = (-(y2 - y1) / dist, (x2 - x1) / dist);
	(mx + nx * dist * 0.3, my + ny * dist * 0.3)
}

fn draw_node_body(
	ctx: &CanvasRenderingContext2d,
	info: &NodeInfo,
	(x, y): (f64, f64),
	radius: f64,
	alpha: f64,
	k: f64,
) {
	ctx.set_global_alpha(alpha);
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&info.color);
	ctx.fill();

	if info.is_anomaly {
		ctx.set_stroke_style_str("#ef4444");
		ctx.set_line_width(3.0 / k);
		ctx.stroke();
	}

	if info.is_drift {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 5.0, 0.0, 2.0 * PI);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(4.0 / k),
			&JsValue::from_f64(3.0 / k),
		));
		ctx.set_stroke_style_str("#64748b");
		ctx.set_line_width(2.0 / k);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	if info.is_dead_end {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 9.0, 0.0, 2.0 * PI);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(1.0 / k),
			&JsValue::from_f64(4.0 / k),
		));
		ctx.set_stroke_style_str("rgba(226, 232, 240, 0.6)");
		ctx.set_line_width(1.5 / k);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	if info.is_root {
		ctx.begin_path();
		let _ = ctx.arc(x, y - radius * 0.6, radius * 0.12, 0.0, 2.0 * PI);
		ctx.set_fill_style_str("white");
		ctx.fill();
	}

	ctx.set_fill_style_str("white");
	ctx.set_font(&format!("bold {}px sans-serif", radius * 0.5));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(&info.label, x, y);
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if has_highlight && state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (alpha, radius) = (1.0 - 0.7 * t, info.radius * (1.0 - 0.15 * t));
		draw_node_body(ctx, info, (x, y), radius, alpha, k);
		if state.selected == Some(idx) {
			draw_selection(ctx, x, y, radius, k);
		}
	});

	if !has_highlight {
		return;
	}

	state.graph.visit_nodes(|node| {
		let idx = node.index();
		if !state.is_highlighted(idx) {
			return;
		}
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let is_hovered = state.is_hovered(idx);
		let is_neighbor =
			state.hover.neighbors.contains(&idx) || state.hover.prev_neighbors.contains(&idx);

		let (radius, glow_radius) = if is_hovered {
			(info.radius * (1.0 + 0.15 * t), info.radius * (1.4 + 0.6 * t))
		} else if is_neighbor {
			(info.radius * (1.0 + 0.08 * t), info.radius * (1.2 + 0.3 * t))
		} else {
			(info.radius, 0.0)
		};

		if glow_radius > 0.0 && t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
				let _ = gradient
					.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		draw_node_body(ctx, info, (x, y), radius, 1.0, k);

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}
		if state.selected == Some(idx) {
			draw_selection(ctx, x, y, radius, k);
		}
	});
}

fn draw_selection(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, k: f64) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius + 4.0 / k, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str("white");
	ctx.set_line_width(2.5 / k);
	ctx.stroke();
}
