// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use relq_catalog::{FieldPair, ForeignKey, RelId, SchemaMetadata};
use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Token inside templated expression text that stands for the table alias
/// the expression is bound to at render time.
pub const DEFAULT_ALIAS_PLACEHOLDER: &str = "$$";

/// One level of query nesting.
///
/// A spec describes a flat tabular query over its from-entries plus how
/// the result rows are shaped: left as-is, wrapped into one JSON object
/// per row, and/or aggregated into a single JSON array. Nested specs
/// inside parent-reference, child-collection, and derived-table entries
/// are exclusively owned; the tree is acyclic by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
	pub select_entries: Vec<SelectEntry>,
	/// Non-empty at render time; entry 0 is the base relation.
	pub from_entries: Vec<FromEntry>,
	pub where_entries: Vec<WhereEntry>,
	pub order_by: Option<OrderBy>,
	pub for_update: bool,
	pub wrap_properties_in_object: bool,
	pub aggregate_to_array: bool,
	/// Ordering of aggregated elements. The alias placeholder in this
	/// expression is bound to the derived-table alias, never to the
	/// inner entries' aliases.
	pub aggregate_order_by: Option<String>,
	/// Raw columns carried alongside a wrapped object, not part of it.
	pub additional_output_columns: Vec<OutputColumn>,
	pub select_comment: Option<String>,
	pub from_comment: Option<String>,
	pub result_type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectEntry {
	Field(FieldEntry),
	Expression(ExpressionEntry),
	InlineParentProperty(InlineParentPropertyEntry),
	ParentReference(ParentReferenceEntry),
	ChildCollection(ChildCollectionEntry),
	HiddenPrimaryKey(HiddenPrimaryKeyEntry),
}

/// A physical column projected from a from-entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
	pub field: String,
	pub table_alias: String,
	pub output_name: String,
	pub display_order: Option<i32>,
	pub comment: Option<String>,
}

/// Templated SQL text; the placeholder token (default
/// [`DEFAULT_ALIAS_PLACEHOLDER`]) is replaced with `table_alias` at
/// render time, so expression text can be authored before its final
/// alias is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionEntry {
	pub expression: String,
	pub table_alias: String,
	pub output_name: String,
	pub placeholder: Option<String>,
	pub display_order: Option<i32>,
	pub comment: Option<String>,
}

/// A column already produced by an ancestor relation that was joined
/// flatly into the current level's from-clause. Flattens ancestor fields
/// without adding a subquery layer; never recurses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineParentPropertyEntry {
	pub parent_alias: String,
	pub property_name: String,
	pub projected_name: Option<String>,
	pub display_order: Option<i32>,
}

/// An embedded spec rendered as a correlated scalar subquery producing
/// one JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentReferenceEntry {
	pub output_name: String,
	pub parent_spec: Box<QuerySpec>,
	pub display_order: Option<i32>,
}

/// An embedded spec rendered as a correlated scalar subquery producing a
/// JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildCollectionEntry {
	pub output_name: String,
	pub collection_spec: Box<QuerySpec>,
	pub display_order: Option<i32>,
}

/// A primary-key column carried for joining and correlation, excluded
/// from the externally visible property set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenPrimaryKeyEntry {
	pub field: String,
	pub table_alias: String,
	pub output_name: String,
	pub display_order: Option<i32>,
}

impl SelectEntry {
	pub fn display_order(&self) -> Option<i32> {
		match self {
			SelectEntry::Field(e) => e.display_order,
			SelectEntry::Expression(e) => e.display_order,
			SelectEntry::InlineParentProperty(e) => e.display_order,
			SelectEntry::ParentReference(e) => e.display_order,
			SelectEntry::ChildCollection(e) => e.display_order,
			SelectEntry::HiddenPrimaryKey(e) => e.display_order,
		}
	}

	/// The name this entry projects its value under.
	pub fn output_name(&self) -> &str {
		match self {
			SelectEntry::Field(e) => &e.output_name,
			SelectEntry::Expression(e) => &e.output_name,
			SelectEntry::InlineParentProperty(e) => e.projected_name.as_deref().unwrap_or(&e.property_name),
			SelectEntry::ParentReference(e) => &e.output_name,
			SelectEntry::ChildCollection(e) => &e.output_name,
			SelectEntry::HiddenPrimaryKey(e) => &e.output_name,
		}
	}

	/// Whether the entry belongs to the externally visible property set.
	pub fn is_property(&self) -> bool {
		!matches!(self, SelectEntry::HiddenPrimaryKey(_))
	}

	pub fn comment(&self) -> Option<&str> {
		match self {
			SelectEntry::Field(e) => e.comment.as_deref(),
			SelectEntry::Expression(e) => e.comment.as_deref(),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FromEntry {
	Table(TableFromEntry),
	Query(QueryFromEntry),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFromEntry {
	pub rel: RelId,
	pub alias: String,
	pub join: Option<Join>,
	pub comment: Option<String>,
}

/// A nested spec used as a derived table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFromEntry {
	pub spec: Box<QuerySpec>,
	pub alias: String,
	pub join: Option<Join>,
	pub comment: Option<String>,
}

impl FromEntry {
	pub fn alias(&self) -> &str {
		match self {
			FromEntry::Table(e) => &e.alias,
			FromEntry::Query(e) => &e.alias,
		}
	}

	pub fn join(&self) -> Option<&Join> {
		match self {
			FromEntry::Table(e) => e.join.as_ref(),
			FromEntry::Query(e) => e.join.as_ref(),
		}
	}

	pub fn comment(&self) -> Option<&str> {
		match self {
			FromEntry::Table(e) => e.comment.as_deref(),
			FromEntry::Query(e) => e.comment.as_deref(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
	pub join_type: JoinType,
	pub condition: ParentChildCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
	Inner,
	Left,
}

/// Which side of a parent/child condition the anchoring from-entry is.
///
/// The same two relations can be joined from either direction (a
/// self-referential table joins to itself); roles are resolved from this
/// tag and the named aliases, never from declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionAnchor {
	/// The anchoring from-entry holds the foreign key.
	Child,
	/// The anchoring from-entry holds the primary key.
	Parent,
}

/// An ordered list of foreign-key-to-primary-key column pairs between an
/// explicitly named child alias and parent alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentChildCondition {
	pub child_alias: String,
	pub parent_alias: String,
	pub pairs: Vec<FieldPair>,
	pub anchor: ConditionAnchor,
}

impl ParentChildCondition {
	/// Build a condition from a discovered foreign-key constraint,
	/// keeping the constraint's column pair order.
	pub fn from_foreign_key(fk: &ForeignKey, child_alias: &str, parent_alias: &str, anchor: ConditionAnchor) -> Self {
		Self {
			child_alias: child_alias.to_string(),
			parent_alias: parent_alias.to_string(),
			pairs: fk.pairs.clone(),
			anchor,
		}
	}

	/// Look up the foreign key between two joined relations and build
	/// the condition from it.
	///
	/// The metadata provider is authoritative: a missing constraint is
	/// reported as [`SpecError::NoForeignKey`] and an ambiguous one is
	/// propagated verbatim, never guessed around.
	pub fn resolve(
		metadata: &dyn SchemaMetadata,
		child: (&RelId, &str),
		parent: (&RelId, &str),
		field_filter: Option<&[String]>,
		anchor: ConditionAnchor,
	) -> Result<Self, SpecError> {
		let fk = metadata.foreign_key(child.0, parent.0, field_filter)?.ok_or_else(|| {
			SpecError::NoForeignKey {
				from: child.0.clone(),
				to: parent.0.clone(),
			}
		})?;
		Ok(Self::from_foreign_key(&fk, child.1, parent.1, anchor))
	}

	/// The alias of the from-entry this condition is attached to.
	pub fn anchor_alias(&self) -> &str {
		match self.anchor {
			ConditionAnchor::Child => &self.child_alias,
			ConditionAnchor::Parent => &self.parent_alias,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WhereEntry {
	General(GeneralCondition),
	/// Correlates a child-collection subquery to its enclosing row.
	ParentChild(ParentChildCondition),
}

/// Templated condition text; same placeholder mechanism as
/// [`ExpressionEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralCondition {
	pub condition: String,
	pub table_alias: String,
	pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
	pub expression: String,
	pub table_alias: String,
}

/// A raw output column, either bare or renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputColumn {
	pub name: String,
	pub alias: Option<String>,
}

/// Replace the alias placeholder in templated text with a real alias.
pub fn substitute_alias(template: &str, placeholder: Option<&str>, alias: &str) -> String {
	template.replace(placeholder.unwrap_or(DEFAULT_ALIAS_PLACEHOLDER), alias)
}

#[cfg(test)]
mod tests {
	use relq_catalog::CatalogError;
	use relq_type::IdentCase;

	use super::*;

	/// In-memory metadata provider backed by a fixed constraint list.
	struct FixedKeys {
		keys: Vec<ForeignKey>,
	}

	impl SchemaMetadata for FixedKeys {
		fn primary_key_columns(&self, _rel: &RelId, _alias: Option<&str>) -> Result<Vec<String>, CatalogError> {
			Ok(vec!["id".to_string()])
		}

		fn foreign_key(
			&self,
			from: &RelId,
			to: &RelId,
			field_filter: Option<&[String]>,
		) -> Result<Option<ForeignKey>, CatalogError> {
			let matches: Vec<&ForeignKey> = self
				.keys
				.iter()
				.filter(|fk| &fk.from == from && &fk.to == to)
				.filter(|fk| match field_filter {
					Some(fields) => fk
						.pairs
						.iter()
						.map(|p| p.foreign_key_field.as_str())
						.eq(fields.iter().map(String::as_str)),
					None => true,
				})
				.collect();
			match matches.as_slice() {
				[] => Ok(None),
				[fk] => Ok(Some((*fk).clone())),
				_ => Err(CatalogError::AmbiguousForeignKey {
					from: from.clone(),
					to: to.clone(),
					fields: field_filter.map(|f| f.to_vec()),
				}),
			}
		}
	}

	fn rel(name: &str) -> RelId {
		RelId::new(None, name, IdentCase::FoldLower)
	}

	fn fk(from: &str, to: &str, field: &str) -> ForeignKey {
		ForeignKey {
			from: rel(from),
			to: rel(to),
			pairs: vec![FieldPair {
				foreign_key_field: field.into(),
				primary_key_field: "id".into(),
			}],
		}
	}

	#[test]
	fn test_resolve_builds_condition_from_constraint() {
		let metadata = FixedKeys {
			keys: vec![fk("books", "authors", "author_id")],
		};
		let condition = ParentChildCondition::resolve(
			&metadata,
			(&rel("books"), "b"),
			(&rel("authors"), "a"),
			None,
			ConditionAnchor::Parent,
		)
		.unwrap();
		assert_eq!(condition.child_alias, "b");
		assert_eq!(condition.parent_alias, "a");
		assert_eq!(condition.anchor_alias(), "a");
		assert_eq!(condition.pairs[0].foreign_key_field, "author_id");
	}

	#[test]
	fn test_resolve_missing_constraint() {
		let metadata = FixedKeys {
			keys: vec![],
		};
		let err = ParentChildCondition::resolve(
			&metadata,
			(&rel("books"), "b"),
			(&rel("authors"), "a"),
			None,
			ConditionAnchor::Parent,
		)
		.unwrap_err();
		assert_eq!(
			err,
			SpecError::NoForeignKey {
				from: rel("books"),
				to: rel("authors"),
			}
		);
	}

	#[test]
	fn test_resolve_propagates_ambiguity_verbatim() {
		let metadata = FixedKeys {
			keys: vec![fk("reviews", "users", "author_id"), fk("reviews", "users", "moderator_id")],
		};
		let err = ParentChildCondition::resolve(
			&metadata,
			(&rel("reviews"), "r"),
			(&rel("users"), "u"),
			None,
			ConditionAnchor::Parent,
		)
		.unwrap_err();
		assert_eq!(
			err,
			SpecError::Catalog(CatalogError::AmbiguousForeignKey {
				from: rel("reviews"),
				to: rel("users"),
				fields: None,
			})
		);
	}

	#[test]
	fn test_resolve_with_field_filter() {
		let metadata = FixedKeys {
			keys: vec![fk("reviews", "users", "author_id"), fk("reviews", "users", "moderator_id")],
		};
		let filter = vec!["moderator_id".to_string()];
		let condition = ParentChildCondition::resolve(
			&metadata,
			(&rel("reviews"), "r"),
			(&rel("users"), "u"),
			Some(&filter),
			ConditionAnchor::Child,
		)
		.unwrap();
		assert_eq!(condition.pairs[0].foreign_key_field, "moderator_id");
		assert_eq!(condition.anchor_alias(), "r");
	}

	#[test]
	fn test_substitute_default_placeholder() {
		assert_eq!(substitute_alias("$$.age > 30", None, "p"), "p.age > 30");
	}

	#[test]
	fn test_substitute_custom_placeholder() {
		assert_eq!(substitute_alias("@.age > $$", Some("@"), "p"), "p.age > $$");
	}

	#[test]
	fn test_inline_parent_property_output_name() {
		let plain = SelectEntry::InlineParentProperty(InlineParentPropertyEntry {
			parent_alias: "a".into(),
			property_name: "name".into(),
			projected_name: None,
			display_order: None,
		});
		assert_eq!(plain.output_name(), "name");

		let renamed = SelectEntry::InlineParentProperty(InlineParentPropertyEntry {
			parent_alias: "a".into(),
			property_name: "name".into(),
			projected_name: Some("author_name".into()),
			display_order: None,
		});
		assert_eq!(renamed.output_name(), "author_name");
	}

	#[test]
	fn test_anchor_alias_follows_tag() {
		let fk = ForeignKey {
			from: RelId::new(None, "employees", IdentCase::FoldLower),
			to: RelId::new(None, "employees", IdentCase::FoldLower),
			pairs: vec![FieldPair {
				foreign_key_field: "manager_id".into(),
				primary_key_field: "id".into(),
			}],
		};
		let on_child = ParentChildCondition::from_foreign_key(&fk, "e", "m", ConditionAnchor::Child);
		assert_eq!(on_child.anchor_alias(), "e");
		let on_parent = ParentChildCondition::from_foreign_key(&fk, "e", "m", ConditionAnchor::Parent);
		assert_eq!(on_parent.anchor_alias(), "m");
	}

	#[test]
	fn test_spec_serde_round_trip() {
		let spec = QuerySpec {
			select_entries: vec![SelectEntry::Field(FieldEntry {
				field: "id".into(),
				table_alias: "b".into(),
				output_name: "id".into(),
				display_order: Some(1),
				comment: None,
			})],
			from_entries: vec![FromEntry::Table(TableFromEntry {
				rel: RelId::new(Some("app"), "books", IdentCase::FoldLower),
				alias: "b".into(),
				join: None,
				comment: None,
			})],
			where_entries: Vec::new(),
			order_by: Some(OrderBy {
				expression: "$$.id".into(),
				table_alias: "b".into(),
			}),
			for_update: false,
			wrap_properties_in_object: true,
			aggregate_to_array: false,
			aggregate_order_by: None,
			additional_output_columns: Vec::new(),
			select_comment: None,
			from_comment: None,
			result_type_name: Some("Book".into()),
		};
		let text = serde_json::to_string(&spec).unwrap();
		let back: QuerySpec = serde_json::from_str(&text).unwrap();
		assert_eq!(back, spec);
	}

	#[test]
	fn test_hidden_pk_is_not_a_property() {
		let hidden = SelectEntry::HiddenPrimaryKey(HiddenPrimaryKeyEntry {
			field: "id".into(),
			table_alias: "b".into(),
			output_name: "_id".into(),
			display_order: None,
		});
		assert!(!hidden.is_property());
	}
}
