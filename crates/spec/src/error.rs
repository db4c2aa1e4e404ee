// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use relq_catalog::{CatalogError, RelId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpecError {
	#[error("merged query parts must not carry an order-by; ordering is owned by the enclosing query level")]
	MergeWithOrderBy,

	#[error("merged query parts must not carry a result type name; naming is owned by the enclosing query level")]
	MergeWithResultTypeName,

	#[error("no foreign key from {from} to {to}")]
	NoForeignKey {
		from: RelId,
		to: RelId,
	},

	#[error(transparent)]
	Catalog(#[from] CatalogError),
}
