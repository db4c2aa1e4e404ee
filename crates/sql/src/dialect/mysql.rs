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
		"accessible",
		"add",
		"all",
		"alter",
		"analyze",
		"and",
		"as",
		"asc",
		"asensitive",
		"before",
		"between",
		"bigint",
		"binary",
		"blob",
		"both",
		"by",
		"call",
		"cascade",
		"case",
		"change",
		"char",
		"character",
		"check",
		"collate",
		"column",
		"condition",
		"constraint",
		"continue",
		"convert",
		"create",
		"cross",
		"cube",
		"cume_dist",
		"current_date",
		"current_time",
		"current_timestamp",
		"current_user",
		"cursor",
		"database",
		"databases",
		"day_hour",
		"day_microsecond",
		"day_minute",
		"day_second",
		"dec",
		"decimal",
		"declare",
		"default",
		"delayed",
		"delete",
		"dense_rank",
		"desc",
		"describe",
		"deterministic",
		"distinct",
		"distinctrow",
		"div",
		"double",
		"drop",
		"dual",
		"each",
		"else",
		"elseif",
		"empty",
		"enclosed",
		"escaped",
		"except",
		"exists",
		"exit",
		"explain",
		"false",
		"fetch",
		"first_value",
		"float",
		"float4",
		"float8",
		"for",
		"force",
		"foreign",
		"from",
		"fulltext",
		"function",
		"generated",
		"get",
		"grant",
		"group",
		"grouping",
		"groups",
		"having",
		"high_priority",
		"hour_microsecond",
		"hour_minute",
		"hour_second",
		"if",
		"ignore",
		"in",
		"index",
		"infile",
		"inner",
		"inout",
		"insensitive",
		"insert",
		"int",
		"int1",
		"int2",
		"int3",
		"int4",
		"int8",
		"integer",
		"interval",
		"into",
		"is",
		"iterate",
		"join",
		"json_table",
		"key",
		"keys",
		"kill",
		"lag",
		"last_value",
		"lateral",
		"lead",
		"leading",
		"leave",
		"left",
		"like",
		"limit",
		"linear",
		"lines",
		"load",
		"localtime",
		"localtimestamp",
		"lock",
		"long",
		"longblob",
		"longtext",
		"loop",
		"low_priority",
		"match",
		"maxvalue",
		"mediumblob",
		"mediumint",
		"mediumtext",
		"middleint",
		"minute_microsecond",
		"minute_second",
		"mod",
		"modifies",
		"natural",
		"no_write_to_binlog",
		"not",
		"nth_value",
		"ntile",
		"null",
		"numeric",
		"of",
		"on",
		"optimize",
		"optimizer_costs",
		"option",
		"optionally",
		"or",
		"order",
		"out",
		"outer",
		"outfile",
		"over",
		"partition",
		"percent_rank",
		"precision",
		"primary",
		"procedure",
		"purge",
		"range",
		"rank",
		"read",
		"read_write",
		"reads",
		"real",
		"recursive",
		"references",
		"regexp",
		"release",
		"rename",
		"repeat",
		"replace",
		"require",
		"resignal",
		"restrict",
		"return",
		"revoke",
		"right",
		"rlike",
		"row",
		"row_number",
		"rows",
		"schema",
		"schemas",
		"second_microsecond",
		"select",
		"sensitive",
		"separator",
		"set",
		"show",
		"signal",
		"smallint",
		"spatial",
		"specific",
		"sql",
		"sql_big_result",
		"sql_calc_found_rows",
		"sql_small_result",
		"sqlexception",
		"sqlstate",
		"sqlwarning",
		"ssl",
		"starting",
		"stored",
		"straight_join",
		"system",
		"table",
		"terminated",
		"then",
		"tinyblob",
		"tinyint",
		"tinytext",
		"to",
		"trailing",
		"trigger",
		"true",
		"undo",
		"union",
		"unique",
		"unlock",
		"unsigned",
		"update",
		"usage",
		"use",
		"using",
		"utc_date",
		"utc_time",
		"utc_timestamp",
		"values",
		"varbinary",
		"varchar",
		"varcharacter",
		"varying",
		"virtual",
		"when",
		"where",
		"while",
		"window",
		"with",
		"write",
		"xor",
		"year_month",
		"zerofill",
	]
	.into_iter()
	.collect()
});

#[derive(Debug, Clone, Copy)]
pub struct Mysql;

impl Dialect for Mysql {
	fn name(&self) -> &'static str {
		"mysql"
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
		self.aggregated(&object, order_by)
	}

	fn aggregated_column_values_expr(
		&self,
		column: &str,
		order_by: Option<&str>,
		source_alias: &str,
	) -> Result<String, RenderError> {
		let value = format!("{}.{}", source_alias, self.quote_column_name(column));
		self.aggregated(&value, order_by)
	}
}

impl Mysql {
	/// `json_arrayagg` accepts no `order by` clause; a requested
	/// aggregation order must fail here, not be dropped.
	fn aggregated(&self, element: &str, order_by: Option<&str>) -> Result<String, RenderError> {
		if let Some(order) = order_by {
			return Err(RenderError::OrderedAggregationUnsupported {
				dialect: self.name(),
				order: order.to_string(),
			});
		}
		Ok(format!("coalesce(json_arrayagg({element}), json_array())"))
	}
}
