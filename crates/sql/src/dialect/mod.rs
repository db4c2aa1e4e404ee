// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use std::collections::HashSet;

use relq_type::{IdentCase, QUOTE};

use crate::error::RenderError;

mod mysql;
mod oracle;
mod postgres;
mod sqlite;

pub use mysql::Mysql;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

/// Engine-specific SQL idioms.
///
/// A dialect supplies identifier quoting (its safe-bare character
/// pattern, required unquoted case, and reserved words) and the JSON
/// construction expressions the renderer splices into wrapped and
/// aggregated queries. Dialect values carry no state and are safe to
/// share across threads.
pub trait Dialect: Send + Sync {
	fn name(&self) -> &'static str;

	/// Case this engine folds unquoted identifiers to.
	fn ident_case(&self) -> IdentCase;

	fn indent_width(&self) -> usize;

	/// Words that force quoting even when syntactically safe.
	fn reserved_words(&self) -> &'static HashSet<&'static str>;

	fn quote_relation_name(&self, name: &str) -> String;

	fn quote_column_name(&self, name: &str) -> String;

	/// One JSON object per input row, built from `columns` of
	/// `source_alias`.
	fn row_object_expr(&self, columns: &[String], source_alias: &str) -> String;

	/// A JSON array of row objects over all input rows, optionally
	/// ordered by `order_by` (already rewritten to `source_alias`).
	fn aggregated_row_objects_expr(
		&self,
		columns: &[String],
		order_by: Option<&str>,
		source_alias: &str,
	) -> Result<String, RenderError>;

	/// A JSON array of the scalar values of a single column.
	fn aggregated_column_values_expr(
		&self,
		column: &str,
		order_by: Option<&str>,
		source_alias: &str,
	) -> Result<String, RenderError>;
}

/// Quote `name` unless it is bare-safe for the dialect: already-quoted
/// names pass through untouched, and a leading underscore, a character
/// outside the dialect's safe pattern, or a reserved word forces quotes.
pub(crate) fn quote_ident(name: &str, case: IdentCase, reserved: &HashSet<&'static str>) -> String {
	if is_quoted(name) {
		return name.to_string();
	}
	let folded = relq_type::case_normalize(name, case);
	if name.starts_with('_') || !safe_bare(name, case) || reserved.contains(folded.as_str()) {
		return format!("{QUOTE}{name}{QUOTE}");
	}
	name.to_string()
}

fn is_quoted(name: &str) -> bool {
	name.len() >= 2 && name.starts_with(QUOTE) && name.ends_with(QUOTE)
}

fn safe_bare(name: &str, case: IdentCase) -> bool {
	let mut chars = name.chars();
	let Some(first) = chars.next() else {
		return false;
	};
	let first_ok = match case {
		IdentCase::FoldUpper => first.is_ascii_uppercase(),
		IdentCase::FoldLower => first.is_ascii_lowercase(),
	};
	first_ok
		&& chars.all(|c| {
			c == '_' || c.is_ascii_digit()
				|| match case {
					IdentCase::FoldUpper => c.is_ascii_uppercase(),
					IdentCase::FoldLower => c.is_ascii_lowercase(),
				}
		})
}

/// JSON member key for an output column: the column name with quoting
/// stripped.
pub(crate) fn object_key(column: &str) -> String {
	column.chars().filter(|c| *c != QUOTE).collect()
}

/// `'key', alias.col, ...` argument list shared by the comma-style
/// object builders.
pub(crate) fn object_field_args(columns: &[String], source_alias: &str, quote: impl Fn(&str) -> String) -> String {
	columns
		.iter()
		.map(|c| format!("'{}', {}.{}", object_key(c), source_alias, quote(c)))
		.collect::<Vec<_>>()
		.join(", ")
}
