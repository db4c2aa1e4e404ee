// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use std::collections::HashSet;

use once_cell::sync::Lazy;
use relq_type::IdentCase;

use crate::{
	dialect::{Dialect, object_field_args, quote_ident},
	error::RenderError,
};

static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
	[
		"all",
		"analyse",
		"analyze",
		"and",
		"any",
		"array",
		"as",
		"asc",
		"asymmetric",
		"both",
		"case",
		"cast",
		"check",
		"collate",
		"column",
		"constraint",
		"create",
		"current_catalog",
		"current_date",
		"current_role",
		"current_time",
		"current_timestamp",
		"current_user",
		"default",
		"deferrable",
		"desc",
		"distinct",
		"do",
		"else",
		"end",
		"except",
		"false",
		"fetch",
		"for",
		"foreign",
		"from",
		"grant",
		"group",
		"having",
		"in",
		"initially",
		"intersect",
		"into",
		"lateral",
		"leading",
		"limit",
		"localtime",
		"localtimestamp",
		"not",
		"null",
		"offset",
		"on",
		"only",
		"or",
		"order",
		"placing",
		"primary",
		"references",
		"returning",
		"select",
		"session_user",
		"some",
		"symmetric",
		"table",
		"then",
		"to",
		"trailing",
		"true",
		"union",
		"unique",
		"user",
		"using",
		"variadic",
		"when",
		"where",
		"window",
		"with",
	]
	.into_iter()
	.collect()
});

#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl Dialect for Postgres {
	fn name(&self) -> &'static str {
		"postgres"
	}

	fn ident_case(&self) -> IdentCase {
		IdentCase::FoldLower
	}

	fn indent_width(&self) -> usize {
		2
	}

	fn reserved_words(&self) -> &'static HashSet<&'static str> {
		&RESERVED
	}

	fn quote_relation_name(&self, name: &str) -> String {
		quote_ident(name, self.ident_case(), &RESERVED)
	}

	fn quote_column_name(&self, name: &str) -> String {
		quote_ident(name, self.ident_case(), &RESERVED)
	}

	fn row_object_expr(&self, columns: &[String], source_alias: &str) -> String {
		format!("jsonb_build_object({})", object_field_args(columns, source_alias, |c| self.quote_column_name(c)))
	}

	fn aggregated_row_objects_expr(
		&self,
		columns: &[String],
		order_by: Option<&str>,
		source_alias: &str,
	) -> Result<String, RenderError> {
		let object = self.row_object_expr(columns, source_alias);
		Ok(aggregated(&object, order_by))
	}

	fn aggregated_column_values_expr(
		&self,
		column: &str,
		order_by: Option<&str>,
		source_alias: &str,
	) -> Result<String, RenderError> {
		let value = format!("{}.{}", source_alias, self.quote_column_name(column));
		Ok(aggregated(&value, order_by))
	}
}

fn aggregated(element: &str, order_by: Option<&str>) -> String {
	match order_by {
		Some(order) => format!("coalesce(jsonb_agg({element} order by {order}), '[]'::jsonb)"),
		None => format!("coalesce(jsonb_agg({element}), '[]'::jsonb)"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_row_object() {
		let columns = vec!["id".to_string(), "title".to_string()];
		assert_eq!(Postgres.row_object_expr(&columns, "q"), "jsonb_build_object('id', q.id, 'title', q.title)");
	}

	#[test]
	fn test_quoted_column_key_is_bare() {
		let columns = vec!["\"Title\"".to_string()];
		assert_eq!(Postgres.row_object_expr(&columns, "q"), "jsonb_build_object('Title', q.\"Title\")");
	}

	#[test]
	fn test_aggregated_rows_with_order() {
		let columns = vec!["id".to_string()];
		assert_eq!(
			Postgres.aggregated_row_objects_expr(&columns, Some("q.seq"), "q").unwrap(),
			"coalesce(jsonb_agg(jsonb_build_object('id', q.id) order by q.seq), '[]'::jsonb)"
		);
	}

	#[test]
	fn test_aggregated_values() {
		assert_eq!(
			Postgres.aggregated_column_values_expr("stars", None, "q").unwrap(),
			"coalesce(jsonb_agg(q.stars), '[]'::jsonb)"
		);
	}
}
