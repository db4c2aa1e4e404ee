// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use std::collections::HashSet;

use indexmap::IndexSet;
use relq_type::QUOTE;

use crate::{
	error::SpecError,
	spec::{FromEntry, OrderBy, OutputColumn, QuerySpec, SelectEntry, WhereEntry},
};

/// Mutable accumulation of one query level, frozen into an immutable
/// [`QuerySpec`].
///
/// A builder owns its alias scope: aliases created through
/// [`create_table_alias`](Self::create_table_alias) are unique within one
/// builder, and nested specs get independent scopes by using their own
/// builders. Builders are single-owner values; freezing consumes the
/// builder, so a half-built state cannot leak into an unrelated spec.
#[derive(Debug)]
pub struct SpecBuilder {
	select_entries: Vec<SelectEntry>,
	from_entries: Vec<FromEntry>,
	where_entries: Vec<WhereEntry>,
	order_by: Option<OrderBy>,
	for_update: bool,
	wrap_properties_in_object: bool,
	aggregate_to_array: bool,
	aggregate_order_by: Option<String>,
	additional_output_columns: Vec<OutputColumn>,
	select_comment: Option<String>,
	from_comment: Option<String>,
	result_type_name: Option<String>,
	aliases: IndexSet<String>,
	reserved_words: &'static HashSet<&'static str>,
	alias_word_separator: char,
}

impl SpecBuilder {
	/// `reserved_words` is the target dialect's reserved-word set;
	/// generated aliases colliding with it are suffixed with `_`.
	pub fn new(reserved_words: &'static HashSet<&'static str>) -> Self {
		Self {
			select_entries: Vec::new(),
			from_entries: Vec::new(),
			where_entries: Vec::new(),
			order_by: None,
			for_update: false,
			wrap_properties_in_object: false,
			aggregate_to_array: false,
			aggregate_order_by: None,
			additional_output_columns: Vec::new(),
			select_comment: None,
			from_comment: None,
			result_type_name: None,
			aliases: IndexSet::new(),
			reserved_words,
			alias_word_separator: '_',
		}
	}

	pub fn with_alias_word_separator(mut self, separator: char) -> Self {
		self.alias_word_separator = separator;
		self
	}

	pub fn add_select_entry(&mut self, entry: SelectEntry) {
		self.select_entries.push(entry);
	}

	pub fn add_select_entries(&mut self, entries: impl IntoIterator<Item = SelectEntry>) {
		self.select_entries.extend(entries);
	}

	pub fn add_from_entry(&mut self, entry: FromEntry) {
		self.from_entries.push(entry);
	}

	pub fn add_where_entry(&mut self, entry: WhereEntry) {
		self.where_entries.push(entry);
	}

	pub fn set_order_by(&mut self, order_by: OrderBy) {
		self.order_by = Some(order_by);
	}

	pub fn set_result_type_name(&mut self, name: impl Into<String>) {
		self.result_type_name = Some(name.into());
	}

	pub fn set_for_update(&mut self) {
		self.for_update = true;
	}

	pub fn set_wrap_properties_in_object(&mut self) {
		self.wrap_properties_in_object = true;
	}

	pub fn set_aggregate_to_array(&mut self) {
		self.aggregate_to_array = true;
	}

	pub fn set_aggregate_order_by(&mut self, order_by: impl Into<String>) {
		self.aggregate_order_by = Some(order_by.into());
	}

	pub fn add_additional_output_column(&mut self, column: OutputColumn) {
		self.additional_output_columns.push(column);
	}

	pub fn set_select_comment(&mut self, comment: impl Into<String>) {
		self.select_comment = Some(comment.into());
	}

	pub fn set_from_comment(&mut self, comment: impl Into<String>) {
		self.from_comment = Some(comment.into());
	}

	/// Derive a fresh alias for `relation_name`, unique within this
	/// builder's scope.
	///
	/// The candidate is the lowercased initial of each word of the name;
	/// a taken candidate gets an incrementing numeric suffix, and a
	/// candidate landing on a reserved word gets a trailing underscore.
	pub fn create_table_alias(&mut self, relation_name: &str) -> String {
		let base = initials(relation_name, self.alias_word_separator);
		let mut candidate = base.clone();
		let mut n = 1;
		while self.aliases.contains(&candidate) {
			candidate = format!("{base}{n}");
			n += 1;
		}
		if self.reserved(&candidate) {
			candidate.push('_');
			while self.aliases.contains(&candidate) {
				candidate = format!("{base}{n}");
				n += 1;
			}
		}
		self.aliases.insert(candidate.clone());
		candidate
	}

	/// Reserved sets hold words in the dialect's unquoted case; generated
	/// aliases are lowercase, so both folds are checked.
	fn reserved(&self, candidate: &str) -> bool {
		self.reserved_words.contains(candidate)
			|| self.reserved_words.contains(candidate.to_ascii_uppercase().as_str())
	}

	/// Bring externally allocated aliases into this builder's scope so
	/// later [`create_table_alias`](Self::create_table_alias) calls
	/// avoid them.
	pub fn add_aliases_to_scope(&mut self, aliases: impl IntoIterator<Item = String>) {
		self.aliases.extend(aliases);
	}

	pub fn aliases_in_scope(&self) -> impl Iterator<Item = &str> {
		self.aliases.iter().map(String::as_str)
	}

	/// Concatenate `other`'s entries onto this builder and union the
	/// alias scopes.
	///
	/// Order-by and result-type-name are level-scoped: merging parts
	/// that carry one would silently discard or conflict it, so both
	/// are reported as errors.
	pub fn merge(&mut self, other: SpecBuilder) -> Result<(), SpecError> {
		if other.order_by.is_some() {
			return Err(SpecError::MergeWithOrderBy);
		}
		if other.result_type_name.is_some() {
			return Err(SpecError::MergeWithResultTypeName);
		}
		self.select_entries.extend(other.select_entries);
		self.from_entries.extend(other.from_entries);
		self.where_entries.extend(other.where_entries);
		self.aliases.extend(other.aliases);
		Ok(())
	}

	/// Consume the builder and produce the immutable spec.
	///
	/// Ownership of the accumulated collections transfers to the
	/// returned value; continuing to accumulate requires a new builder.
	pub fn freeze(self) -> QuerySpec {
		QuerySpec {
			select_entries: self.select_entries,
			from_entries: self.from_entries,
			where_entries: self.where_entries,
			order_by: self.order_by,
			for_update: self.for_update,
			wrap_properties_in_object: self.wrap_properties_in_object,
			aggregate_to_array: self.aggregate_to_array,
			aggregate_order_by: self.aggregate_order_by,
			additional_output_columns: self.additional_output_columns,
			select_comment: self.select_comment,
			from_comment: self.from_comment,
			result_type_name: self.result_type_name,
		}
	}
}

fn initials(relation_name: &str, separator: char) -> String {
	let bare: String = relation_name.chars().filter(|c| *c != QUOTE).collect();
	let mut alias = String::new();
	for word in bare.split(separator) {
		if let Some(c) = word.chars().next() {
			alias.extend(c.to_lowercase());
		}
	}
	if alias.is_empty() {
		alias.push('t');
	}
	alias
}
