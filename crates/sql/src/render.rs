// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use relq_catalog::RelId;
use relq_spec::{FromEntry, JoinType, ParentChildCondition, QuerySpec, SelectEntry, WhereEntry, substitute_alias};
use relq_type::case_normalize;
use tracing::instrument;

use crate::{dialect::Dialect, error::RenderError};

/// Alias of the derived table a wrapped or aggregated query projects from.
const WRAP_ALIAS: &str = "q";

#[derive(Debug, Clone)]
pub struct RenderConfig {
	/// Emit the `--` comment lines declared on specs and entries.
	pub comments_enabled: bool,
	/// Schemas whose relations are written without a schema prefix;
	/// members are compared case-normalized.
	pub unqualified_schemas: Vec<String>,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			comments_enabled: true,
			unqualified_schemas: Vec::new(),
		}
	}
}

/// Render `spec` as SQL text for `dialect`.
///
/// Pure in all three inputs: rendering the same spec twice yields
/// byte-identical text, and concurrent calls over shared specs are fine.
#[instrument(level = "trace", skip(spec, dialect, config))]
pub fn render(spec: &QuerySpec, dialect: &dyn Dialect, config: &RenderConfig) -> Result<String, RenderError> {
	let renderer = Renderer {
		dialect,
		config,
	};
	renderer.query(spec)
}

struct Renderer<'a> {
	dialect: &'a dyn Dialect,
	config: &'a RenderConfig,
}

impl Renderer<'_> {
	fn query(&self, spec: &QuerySpec) -> Result<String, RenderError> {
		if spec.from_entries.is_empty() {
			return Err(RenderError::EmptyFromClause);
		}
		let base = self.base_query(spec)?;
		if !spec.wrap_properties_in_object && !spec.aggregate_to_array {
			// The flat row set is the desired output.
			return Ok(base);
		}
		self.wrapped_query(spec, &base)
	}

	/// The literal, unwrapped tabular query over all select entries,
	/// hidden primary keys included.
	fn base_query(&self, spec: &QuerySpec) -> Result<String, RenderError> {
		let ind = self.indent();
		let mut lines: Vec<String> = Vec::new();

		if self.config.comments_enabled {
			if let Some(comment) = &spec.select_comment {
				lines.push(format!("-- {comment}"));
			}
		}
		lines.push("select".into());
		let entries = ordered_entries(&spec.select_entries);
		let count = entries.len();
		for (i, entry) in entries.into_iter().enumerate() {
			if self.config.comments_enabled {
				if let Some(comment) = entry.comment() {
					lines.push(format!("{ind}-- {comment}"));
				}
			}
			let text = self.select_entry(spec, entry)?;
			let mut entry_lines: Vec<String> = text.lines().map(|l| format!("{ind}{l}")).collect();
			if i + 1 < count {
				if let Some(last) = entry_lines.last_mut() {
					last.push(',');
				}
			}
			lines.extend(entry_lines);
		}

		if self.config.comments_enabled {
			if let Some(comment) = &spec.from_comment {
				lines.push(format!("-- {comment}"));
			}
		}
		lines.push("from".into());
		for (i, entry) in spec.from_entries.iter().enumerate() {
			if self.config.comments_enabled {
				if let Some(comment) = entry.comment() {
					lines.push(format!("{ind}-- {comment}"));
				}
			}
			lines.extend(self.from_entry(entry, i == 0)?);
		}

		if !spec.where_entries.is_empty() {
			let conditions: Vec<String> = spec.where_entries.iter().map(|w| self.where_entry(w)).collect();
			lines.push(format!("where {}", conditions.join(" and ")));
		}
		if let Some(order_by) = &spec.order_by {
			lines.push(format!(
				"order by {}",
				substitute_alias(&order_by.expression, None, &order_by.table_alias)
			));
		}
		if spec.for_update {
			lines.push("for update".into());
		}

		Ok(lines.join("\n"))
	}

	// ── Wrapping and aggregation ────────────────────────────────────

	/// Wrap the base query as a derived table and project the property
	/// entries through the dialect's JSON idioms.
	fn wrapped_query(&self, spec: &QuerySpec, base: &str) -> Result<String, RenderError> {
		let ind = self.indent();
		let properties: Vec<String> = ordered_entries(&spec.select_entries)
			.into_iter()
			.filter(|e| e.is_property())
			.map(|e| e.output_name().to_string())
			.collect();
		// Aggregation order references the derived table, never the
		// inner entries' aliases.
		let order_by = spec.aggregate_order_by.as_ref().map(|o| substitute_alias(o, None, WRAP_ALIAS));

		let output = match (spec.wrap_properties_in_object, spec.aggregate_to_array) {
			(true, true) => {
				self.dialect.aggregated_row_objects_expr(&properties, order_by.as_deref(), WRAP_ALIAS)?
			}
			(true, false) => self.dialect.row_object_expr(&properties, WRAP_ALIAS),
			(false, true) => {
				if properties.len() != 1 {
					return Err(RenderError::AggregateNeedsSingleProperty {
						count: properties.len(),
					});
				}
				self.dialect.aggregated_column_values_expr(&properties[0], order_by.as_deref(), WRAP_ALIAS)?
			}
			(false, false) => unreachable!("checked by the caller"),
		};

		let mut lines = vec!["select".to_string()];
		let additional = if spec.wrap_properties_in_object && !spec.aggregate_to_array {
			&spec.additional_output_columns[..]
		} else {
			&[]
		};
		let mut output_line = format!("{ind}{output} json");
		if !additional.is_empty() {
			output_line.push(',');
		}
		lines.push(output_line);
		for (i, column) in additional.iter().enumerate() {
			let mut line = format!("{ind}{}.{}", WRAP_ALIAS, self.dialect.quote_column_name(&column.name));
			if let Some(alias) = &column.alias {
				line.push_str(&format!(" as {}", self.dialect.quote_column_name(alias)));
			}
			if i + 1 < additional.len() {
				line.push(',');
			}
			lines.push(line);
		}
		lines.push("from (".into());
		lines.extend(base.lines().map(|l| format!("{ind}{l}")));
		lines.push(format!(") {WRAP_ALIAS}"));

		Ok(lines.join("\n"))
	}

	fn select_entry(&self, spec: &QuerySpec, entry: &SelectEntry) -> Result<String, RenderError> {
		match entry {
			SelectEntry::Field(e) => Ok(format!(
				"{}.{} as {}",
				e.table_alias,
				self.dialect.quote_column_name(&e.field),
				self.dialect.quote_column_name(&e.output_name)
			)),
			SelectEntry::HiddenPrimaryKey(e) => Ok(format!(
				"{}.{} as {}",
				e.table_alias,
				self.dialect.quote_column_name(&e.field),
				self.dialect.quote_column_name(&e.output_name)
			)),
			SelectEntry::Expression(e) => Ok(format!(
				"{} as {}",
				substitute_alias(&e.expression, e.placeholder.as_deref(), &e.table_alias),
				self.dialect.quote_column_name(&e.output_name)
			)),
			SelectEntry::InlineParentProperty(e) => {
				let parent = spec
					.from_entries
					.iter()
					.find(|f| f.alias() == e.parent_alias)
					.ok_or_else(|| RenderError::UnknownParentAlias {
						alias: e.parent_alias.clone(),
					})?;
				if let FromEntry::Query(query) = parent {
					let produced = query
						.spec
						.select_entries
						.iter()
						.any(|s| s.is_property() && s.output_name() == e.property_name);
					if !produced {
						return Err(RenderError::UnknownParentProperty {
							alias: e.parent_alias.clone(),
							property: e.property_name.clone(),
						});
					}
				}
				Ok(format!(
					"{}.{} as {}",
					e.parent_alias,
					self.dialect.quote_column_name(&e.property_name),
					self.dialect.quote_column_name(entry.output_name())
				))
			}
			SelectEntry::ParentReference(e) => self.entry_subquery(&e.parent_spec, &e.output_name),
			SelectEntry::ChildCollection(e) => self.entry_subquery(&e.collection_spec, &e.output_name),
		}
	}

	/// A correlated scalar subquery spliced into the select list.
	fn entry_subquery(&self, spec: &QuerySpec, output_name: &str) -> Result<String, RenderError> {
		let ind = self.indent();
		let sub = self.query(spec)?;
		let body: Vec<String> = sub.lines().map(|l| format!("{ind}{l}")).collect();
		Ok(format!("(\n{}\n) as {}", body.join("\n"), self.dialect.quote_column_name(output_name)))
	}

	fn from_entry(&self, entry: &FromEntry, first: bool) -> Result<Vec<String>, RenderError> {
		let ind = self.indent();
		match entry {
			FromEntry::Table(e) => {
				let rel = self.relation_text(&e.rel);
				let line = match (first, &e.join) {
					(true, _) => format!("{ind}{rel} {}", e.alias),
					(false, Some(join)) => format!(
						"{ind}{} {rel} {} on {}",
						join_keyword(join.join_type),
						e.alias,
						self.parent_child(&join.condition)
					),
					(false, None) => format!("{ind}cross join {rel} {}", e.alias),
				};
				Ok(vec![line])
			}
			FromEntry::Query(e) => {
				let sub = self.query(&e.spec)?;
				let mut lines = Vec::new();
				lines.push(match (first, &e.join) {
					(true, _) => format!("{ind}("),
					(false, Some(join)) => format!("{ind}{} (", join_keyword(join.join_type)),
					(false, None) => format!("{ind}cross join ("),
				});
				lines.extend(sub.lines().map(|l| format!("{ind}{ind}{l}")));
				lines.push(match (first, &e.join) {
					(false, Some(join)) => {
						format!("{ind}) {} on {}", e.alias, self.parent_child(&join.condition))
					}
					_ => format!("{ind}) {}", e.alias),
				});
				Ok(lines)
			}
		}
	}

	fn where_entry(&self, entry: &WhereEntry) -> String {
		match entry {
			WhereEntry::General(c) => {
				format!("({})", substitute_alias(&c.condition, c.placeholder.as_deref(), &c.table_alias))
			}
			WhereEntry::ParentChild(c) => self.parent_child(c),
		}
	}

	/// `<child>.<fk> = <parent>.<pk>` conjunction in declared pair
	/// order; roles come from the condition, not from render position.
	fn parent_child(&self, condition: &ParentChildCondition) -> String {
		condition
			.pairs
			.iter()
			.map(|p| {
				format!(
					"{}.{} = {}.{}",
					condition.child_alias,
					self.dialect.quote_column_name(&p.foreign_key_field),
					condition.parent_alias,
					self.dialect.quote_column_name(&p.primary_key_field)
				)
			})
			.collect::<Vec<_>>()
			.join(" and ")
	}

	fn relation_text(&self, rel: &RelId) -> String {
		match &rel.schema {
			Some(schema) if !self.schema_unqualified(schema) => format!(
				"{}.{}",
				self.dialect.quote_relation_name(schema),
				self.dialect.quote_relation_name(&rel.name)
			),
			_ => self.dialect.quote_relation_name(&rel.name),
		}
	}

	fn schema_unqualified(&self, schema: &str) -> bool {
		let case = self.dialect.ident_case();
		let schema = case_normalize(schema, case);
		self.config.unqualified_schemas.iter().any(|s| case_normalize(s, case) == schema)
	}

	fn indent(&self) -> String {
		" ".repeat(self.dialect.indent_width())
	}
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn join_keyword(join_type: JoinType) -> &'static str {
	match join_type {
		JoinType::Inner => "join",
		JoinType::Left => "left join",
	}
}

/// Entries in display order. An entry without a declared order gets its
/// declaration position, and the sort is stable, so column order is
/// reproducible run over run.
fn ordered_entries(entries: &[SelectEntry]) -> Vec<&SelectEntry> {
	let mut keyed: Vec<(i32, usize)> =
		entries.iter().enumerate().map(|(i, e)| (e.display_order().unwrap_or(i as i32), i)).collect();
	keyed.sort();
	keyed.into_iter().map(|(_, i)| &entries[i]).collect()
}
