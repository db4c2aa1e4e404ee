// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;
use relq_catalog::RelId;
use relq_type::QUOTE;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

/// Structure of one level of a query result, used to derive host-language
/// type definitions downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultShape {
	pub base_relation: RelId,
	pub type_name_hint: Option<String>,
	pub properties: Vec<ShapeProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeProperty {
	Scalar {
		name: String,
	},
	Parent {
		name: String,
		shape: Box<ResultShape>,
	},
	Collection {
		name: String,
		shape: Box<ResultShape>,
	},
}

impl ResultShape {
	/// Structural equality that disregards `type_name_hint` at every
	/// level of nesting.
	pub fn equal_ignoring_hint(&self, other: &ResultShape) -> bool {
		self.base_relation == other.base_relation
			&& self.properties.len() == other.properties.len()
			&& self.properties.iter().zip(&other.properties).all(|(a, b)| match (a, b) {
				(
					ShapeProperty::Scalar {
						name: an,
					},
					ShapeProperty::Scalar {
						name: bn,
					},
				) => an == bn,
				(
					ShapeProperty::Parent {
						name: an,
						shape: a_shape,
					},
					ShapeProperty::Parent {
						name: bn,
						shape: b_shape,
					},
				) => an == bn && a_shape.equal_ignoring_hint(b_shape),
				(
					ShapeProperty::Collection {
						name: an,
						shape: a_shape,
					},
					ShapeProperty::Collection {
						name: bn,
						shape: b_shape,
					},
				) => an == bn && a_shape.equal_ignoring_hint(b_shape),
				_ => false,
			})
	}
}

/// Assign one stable name per structural-equality group and return the
/// name of every input shape, positionally.
///
/// Shapes are bucketed by a cheap structural hash, then a bucket is
/// partitioned by `equal`, every membership test running against the
/// group's first member. Group order is the insertion order of each
/// group's first occurrence. A group is named by its first member's hint
/// when one is present, otherwise by an UpperCamelCase derivation of the
/// base relation's name; generated names are disambiguated with an
/// incrementing suffix against every name chosen so far, pre-existing
/// hints included.
pub fn assign_names<E>(shapes: &[ResultShape], equal: E) -> Vec<String>
where
	E: Fn(&ResultShape, &ResultShape) -> bool,
{
	let mut group_first: Vec<usize> = Vec::new();
	let mut group_of: Vec<usize> = Vec::with_capacity(shapes.len());
	let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();

	for (i, shape) in shapes.iter().enumerate() {
		let bucket = buckets.entry(shape_hash(shape)).or_default();
		let group = bucket.iter().copied().find(|&g| equal(&shapes[group_first[g]], shape));
		let group = match group {
			Some(g) => g,
			None => {
				group_first.push(i);
				let g = group_first.len() - 1;
				bucket.push(g);
				g
			}
		};
		group_of.push(group);
	}

	// Hints of groups not yet named still block generated names.
	let hints: HashSet<&str> =
		group_first.iter().filter_map(|&first| shapes[first].type_name_hint.as_deref()).collect();

	let mut chosen: IndexSet<String> = IndexSet::new();
	let mut group_names: Vec<String> = Vec::with_capacity(group_first.len());
	for &first in &group_first {
		let shape = &shapes[first];
		let name = match &shape.type_name_hint {
			Some(hint) => disambiguate(hint, &chosen, &HashSet::new()),
			None => disambiguate(&generated_name(&shape.base_relation), &chosen, &hints),
		};
		chosen.insert(name.clone());
		group_names.push(name);
	}

	group_of.into_iter().map(|g| group_names[g].clone()).collect()
}

fn disambiguate(base: &str, chosen: &IndexSet<String>, blocked: &HashSet<&str>) -> String {
	let mut candidate = base.to_string();
	let mut n = 1;
	while chosen.contains(candidate.as_str()) || blocked.contains(candidate.as_str()) {
		candidate = format!("{base}{n}");
		n += 1;
	}
	candidate
}

/// Cheap grouping hash over the parts the default equality looks at:
/// base relation identity plus count, kind, and name of each property.
/// The name hint is deliberately left out so hint-insensitive equality
/// predicates still see structurally equal shapes in one bucket.
fn shape_hash(shape: &ResultShape) -> u64 {
	let mut hasher = Xxh3::new();
	if let Some(schema) = &shape.base_relation.schema {
		hasher.update(schema.as_bytes());
	}
	hasher.update(b".");
	hasher.update(shape.base_relation.name.as_bytes());
	hasher.update(&(shape.properties.len() as u64).to_le_bytes());
	for property in &shape.properties {
		let (tag, name): (u8, &str) = match property {
			ShapeProperty::Scalar {
				name,
			} => (0, name),
			ShapeProperty::Parent {
				name,
				..
			} => (1, name),
			ShapeProperty::Collection {
				name,
				..
			} => (2, name),
		};
		hasher.update(&[tag]);
		hasher.update(name.as_bytes());
	}
	hasher.digest()
}

fn generated_name(rel: &RelId) -> String {
	let bare: String = rel.name.chars().filter(|c| *c != QUOTE).collect();
	let mut name = String::new();
	for word in bare.split('_').filter(|w| !w.is_empty()) {
		let mut chars = word.chars();
		if let Some(first) = chars.next() {
			name.extend(first.to_uppercase());
			name.extend(chars.flat_map(char::to_lowercase));
		}
	}
	if name.is_empty() {
		name.push_str("Result");
	}
	name
}
