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
		"abort",
		"action",
		"add",
		"after",
		"all",
		"alter",
		"always",
		"analyze",
		"and",
		"as",
		"asc",
		"attach",
		"autoincrement",
		"before",
		"begin",
		"between",
		"by",
		"cascade",
		"case",
		"cast",
		"check",
		"collate",
		"column",
		"commit",
		"conflict",
		"constraint",
		"create",
		"cross",
		"current",
		"current_date",
		"current_time",
		"current_timestamp",
		"database",
		"default",
		"deferrable",
		"deferred",
		"delete",
		"desc",
		"detach",
		"distinct",
		"do",
		"drop",
		"each",
		"else",
		"end",
		"escape",
		"except",
		"exclude",
		"exclusive",
		"exists",
		"explain",
		"fail",
		"filter",
		"first",
		"following",
		"for",
		"foreign",
		"from",
		"full",
		"generated",
		"glob",
		"group",
		"groups",
		"having",
		"if",
		"ignore",
		"immediate",
		"in",
		"index",
		"indexed",
		"initially",
		"inner",
		"insert",
		"instead",
		"intersect",
		"into",
		"is",
		"isnull",
		"join",
		"key",
		"last",
		"left",
		"like",
		"limit",
		"match",
		"materialized",
		"natural",
		"no",
		"not",
		"nothing",
		"notnull",
		"null",
		"nulls",
		"of",
		"offset",
		"on",
		"or",
		"order",
		"others",
		"outer",
		"over",
		"partition",
		"plan",
		"pragma",
		"preceding",
		"primary",
		"query",
		"raise",
		"range",
		"recursive",
		"references",
		"regexp",
		"reindex",
		"release",
		"rename",
		"replace",
		"restrict",
		"returning",
		"right",
		"rollback",
		"row",
		"rows",
		"savepoint",
		"select",
		"set",
		"table",
		"temp",
		"temporary",
		"then",
		"ties",
		"to",
		"transaction",
		"trigger",
		"unbounded",
		"union",
		"unique",
		"update",
		"using",
		"vacuum",
		"values",
		"view",
		"virtual",
		"when",
		"where",
		"window",
		"with",
		"without",
	]
	.into_iter()
	.collect()
});

#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl Dialect for Sqlite {
	fn name(&self) -> &'static str {
		"sqlite"
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
		format!("json_object({})", object_field_args(columns, source_alias, |c| self.quote_column_name(c)))
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

// json_group_array yields '[]' over zero rows, no coalesce needed.
fn aggregated(element: &str, order_by: Option<&str>) -> String {
	match order_by {
		Some(order) => format!("json_group_array({element} order by {order})"),
		None => format!("json_group_array({element})"),
	}
}
