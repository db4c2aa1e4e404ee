// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use crate::relation::RelId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
	#[error("invalid relation name: '{text}'")]
	InvalidRelationName {
		text: String,
	},

	#[error("relation not found: {rel}")]
	RelationNotFound {
		rel: RelId,
	},

	#[error("foreign key from {from} to {to} is ambiguous (field filter: {fields:?})")]
	AmbiguousForeignKey {
		from: RelId,
		to: RelId,
		fields: Option<Vec<String>>,
	},
}
