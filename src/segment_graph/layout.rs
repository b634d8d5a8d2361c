use std::collections::HashMap;

/// Position and velocity of a node as last seen by the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeLayout {
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Horizontal velocity, units per second.
	pub vx: f64,
	/// Vertical velocity, units per second.
	pub vy: f64,
}

impl NodeLayout {
	/// At rest at `(x, y)`.
	pub fn at(x: f64, y: f64) -> Self {
		Self {
			x,
			y,
			..Self::default()
		}
	}
}

/// Layout records keyed by node id, kept apart from the derived graph so a
/// rebuild can hand surviving nodes their old positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutMap {
	entries: HashMap<u32, NodeLayout>,
}

impl LayoutMap {
	/// Empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Record of node `id`.
	pub fn get(&self, id: u32) -> Option<&NodeLayout> {
		self.entries.get(&id)
	}

	/// Insert or replace the record of node `id`.
	pub fn set(&mut self, id: u32, layout: NodeLayout) {
		self.entries.insert(id, layout);
	}

	/// Number of records.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Holds no records.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// All records, in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = (u32, &NodeLayout)> {
		self.entries.iter().map(|(id, layout)| (*id, layout))
	}

	/// Records from `self` for the given ids; unknown ids are skipped.
	pub fn carry<I>(&self, ids: I) -> LayoutMap
	where
		I: IntoIterator<Item = u32>,
	{
		let entries = ids
			.into_iter()
			.filter_map(|id| self.entries.get(&id).map(|layout| (id, *layout)))
			.collect();
		LayoutMap { entries }
	}
}

impl FromIterator<(u32, NodeLayout)> for LayoutMap {
	fn from_iter<T: IntoIterator<Item = (u32, NodeLayout)>>(iter: T) -> Self {
		LayoutMap {
			entries: iter.into_iter().collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn carry_keeps_only_surviving_ids() {
		let previous: LayoutMap = [(1, NodeLayout::at(1.0, 1.0)), (2, NodeLayout::at(2.0, 2.0))]
			.into_iter()
			.collect();
		let carried = previous.carry([2, 3]);
		assert_eq!(carried.len(), 1);
		assert_eq!(carried.get(2), Some(&NodeLayout::at(2.0, 2.0)));
		assert!(carried.get(1).is_none());
	}
}
