// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use serde::{Deserialize, Serialize};

/// Quote character wrapped around identifiers that cannot be written bare.
pub const QUOTE: char = '"';

/// The case an engine folds unquoted identifiers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentCase {
	FoldUpper,
	FoldLower,
}

/// Quote `name` unless it can be written bare under `case`.
///
/// An already-quoted name is returned unchanged, whatever it contains.
/// An unquoted name starting with an underscore is always quoted; such
/// names are reserved for system-style identifiers. Everything else stays
/// bare only when it consists of letters and underscores entirely in the
/// policy's case.
pub fn quote_if_needed(name: &str, case: IdentCase) -> String {
	if is_quoted(name) {
		return name.to_string();
	}
	if name.starts_with('_') || !matches_required_case(name, case) {
		return quoted(name);
	}
	name.to_string()
}

/// Fold an unquoted `name` to the policy's case.
///
/// Used to compare identifiers for equality independent of how they were
/// typed. A quoted name is returned byte for byte; quoting is the escape
/// hatch for case-sensitive names.
pub fn case_normalize(name: &str, case: IdentCase) -> String {
	if is_quoted(name) {
		return name.to_string();
	}
	match case {
		IdentCase::FoldUpper => name.to_ascii_uppercase(),
		IdentCase::FoldLower => name.to_ascii_lowercase(),
	}
}

fn is_quoted(name: &str) -> bool {
	name.len() >= 2 && name.starts_with(QUOTE) && name.ends_with(QUOTE)
}

fn quoted(name: &str) -> String {
	format!("{QUOTE}{name}{QUOTE}")
}

fn matches_required_case(name: &str, case: IdentCase) -> bool {
	!name.is_empty()
		&& name.chars().all(|c| match case {
			IdentCase::FoldUpper => c.is_ascii_uppercase() || c == '_',
			IdentCase::FoldLower => c.is_ascii_lowercase() || c == '_',
		})
}
