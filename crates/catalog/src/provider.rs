// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

use serde::{Deserialize, Serialize};

use crate::{error::CatalogError, relation::RelId};

/// One foreign-key column paired with the primary-key column it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPair {
	pub foreign_key_field: String,
	pub primary_key_field: String,
}

/// A foreign-key constraint from a child relation to its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
	/// The relation holding the foreign-key columns.
	pub from: RelId,
	/// The relation holding the referenced primary key.
	pub to: RelId,
	/// Column pairs in constraint order.
	pub pairs: Vec<FieldPair>,
}

/// Authoritative source of discovered schema information.
///
/// Implementations live outside this core (database metadata readers,
/// serialized schema snapshots). The spec builder consults one when wiring
/// parent/child join conditions; it never performs discovery itself.
pub trait SchemaMetadata {
	/// Ordered primary-key column names of `rel`, each prefixed with
	/// `alias.` when an alias is given.
	fn primary_key_columns(&self, rel: &RelId, alias: Option<&str>) -> Result<Vec<String>, CatalogError>;

	/// The foreign key from `from` to `to`, restricted to constraints
	/// whose foreign-key columns exactly match `field_filter` when one is
	/// given.
	///
	/// Returns `Ok(None)` when no constraint matches. When more than one
	/// constraint still matches, implementations must fail with
	/// [`CatalogError::AmbiguousForeignKey`] rather than pick one.
	fn foreign_key(
		&self,
		from: &RelId,
		to: &RelId,
		field_filter: Option<&[String]>,
	) -> Result<Option<ForeignKey>, CatalogError>;
}
