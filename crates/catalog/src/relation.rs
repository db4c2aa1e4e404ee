// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use std::fmt::{self, Display, Formatter};

use relq_type::{IdentCase, QUOTE, case_normalize};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Identity of a relation, held in case-normalized form.
///
/// Two `RelId`s compare equal exactly when they name the same relation
/// under the case policy they were parsed with, independent of how the
/// original text was typed. Quoted segments keep their exact spelling,
/// quotes included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelId {
	pub schema: Option<String>,
	pub name: String,
}

impl RelId {
	pub fn new(schema: Option<&str>, name: &str, case: IdentCase) -> Self {
		Self {
			schema: schema.map(|s| case_normalize(s, case)),
			name: case_normalize(name, case),
		}
	}

	/// Parse an optionally schema-qualified, optionally quoted relation
	/// name, falling back to `default_schema` when no qualifier is given.
	///
	/// A dot inside a quoted segment is part of the name, not a
	/// qualifier separator.
	pub fn parse(text: &str, default_schema: Option<&str>, case: IdentCase) -> Result<Self, CatalogError> {
		let segments = split_qualified(text).ok_or_else(|| CatalogError::InvalidRelationName {
			text: text.to_string(),
		})?;

		match segments.as_slice() {
			[name] => Ok(Self::new(default_schema, name, case)),
			[schema, name] => Ok(Self::new(Some(schema), name, case)),
			_ => Err(CatalogError::InvalidRelationName {
				text: text.to_string(),
			}),
		}
	}
}

impl Display for RelId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match &self.schema {
			Some(schema) => write!(f, "{}.{}", schema, self.name),
			None => f.write_str(&self.name),
		}
	}
}

/// Split `a.b` into segments, honoring quotes. Returns `None` for empty
/// input, an empty segment, or an unterminated quote.
fn split_qualified(text: &str) -> Option<Vec<String>> {
	let mut segments = Vec::new();
	let mut current = String::new();
	let mut in_quote = false;

	for c in text.chars() {
		if c == QUOTE {
			in_quote = !in_quote;
			current.push(c);
		} else if c == '.' && !in_quote {
			if current.is_empty() {
				return None;
			}
			segments.push(std::mem::take(&mut current));
		} else {
			current.push(c);
		}
	}

	if in_quote || current.is_empty() {
		return None;
	}
	segments.push(current);
	Some(segments)
}
