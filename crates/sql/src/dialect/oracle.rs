// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use std::collections::HashSet;

use once_cell::sync::Lazy;
use relq_type::IdentCase;

use crate::{
	dialect::{Dialect, object_key, quote_ident},
	error::RenderError,
};

static RESERVED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
	[
		"ACCESS",
		"ADD",
		"ALL",
		"ALTER",
		"AND",
		"ANY",
		"AS",
		"ASC",
		"AUDIT",
		"BETWEEN",
		"BY",
		"CHAR",
		"CHECK",
		"CLUSTER",
		"COLUMN",
		"COLUMN_VALUE",
		"COMMENT",
		"COMPRESS",
		"CONNECT",
		"CREATE",
		"CURRENT",
		"DATE",
		"DECIMAL",
		"DEFAULT",
		"DELETE",
		"DESC",
		"DISTINCT",
		"DROP",
		"ELSE",
		"EXCLUSIVE",
		"EXISTS",
		"FILE",
		"FLOAT",
		"FOR",
		"FROM",
		"GRANT",
		"GROUP",
		"HAVING",
		"IDENTIFIED",
		"IMMEDIATE",
		"IN",
		"INCREMENT",
		"INDEX",
		"INITIAL",
		"INSERT",
		"INTEGER",
		"INTERSECT",
		"INTO",
		"IS",
		"LEVEL",
		"LIKE",
		"LOCK",
		"LONG",
		"MAXEXTENTS",
		"MINUS",
		"MLSLABEL",
		"MODE",
		"MODIFY",
		"NESTED_TABLE_ID",
		"NOAUDIT",
		"NOCOMPRESS",
		"NOT",
		"NOWAIT",
		"NULL",
		"NUMBER",
		"OF",
		"OFFLINE",
		"ON",
		"ONLINE",
		"OPTION",
		"OR",
		"ORDER",
		"PCTFREE",
		"PRIOR",
		"PUBLIC",
		"RAW",
		"RENAME",
		"RESOURCE",
		"REVOKE",
		"ROW",
		"ROWID",
		"ROWNUM",
		"ROWS",
		"SELECT",
		"SESSION",
		"SET",
		"SHARE",
		"SIZE",
		"SMALLINT",
		"START",
		"SUCCESSFUL",
		"SYNONYM",
		"SYSDATE",
		"TABLE",
		"THEN",
		"TO",
		"TRIGGER",
		"UID",
		"UNION",
		"UNIQUE",
		"UPDATE",
		"USER",
		"VALIDATE",
		"VALUES",
		"VARCHAR",
		"VARCHAR2",
		"VIEW",
		"WHENEVER",
		"WHERE",
		"WITH",
	]
	.into_iter()
	.collect()
});

#[derive(Debug, Clone, Copy)]
pub struct Oracle;

impl Dialect for Oracle {
	fn name(&self) -> &'static str {
		"oracle"
	}

	fn ident_case(&self) -> IdentCase {
		IdentCase::FoldUpper
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
		// Oracle's key/value pairs use `value`, not a comma.
		let fields = columns
			.iter()
			.map(|c| format!("'{}' value {}.{}", object_key(c), source_alias, self.quote_column_name(c)))
			.collect::<Vec<_>>()
			.join(", ");
		format!("json_object({fields} returning clob)")
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
		Some(order) => format!("coalesce(json_arrayagg({element} order by {order} returning clob), to_clob('[]'))"),
		None => format!("coalesce(json_arrayagg({element} returning clob), to_clob('[]'))"),
	}
}
