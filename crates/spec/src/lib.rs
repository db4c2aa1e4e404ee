// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

//! The Relq query-specification tree and its builder.
//!
//! This crate provides:
//! - The immutable query IR via the [`spec`] module: [`QuerySpec`] and
//!   its select/from/where entry variants, owned recursively
//! - Mutable bottom-up accumulation via [`SpecBuilder`], with scoped
//!   alias allocation and a consuming [`SpecBuilder::freeze`]
//! - Result-shape deduplication and stable naming via [`shape`]
//!
//! Specs are produced by higher-level query-language frontends and
//! consumed by the SQL renderer; this crate itself reads no external
//! format and emits no text.

pub mod builder;
pub mod error;
pub mod shape;
pub mod spec;

pub use builder::SpecBuilder;
pub use error::SpecError;
pub use shape::{ResultShape, ShapeProperty, assign_names};
pub use spec::{
	ChildCollectionEntry, ConditionAnchor, ExpressionEntry, FieldEntry, FromEntry, GeneralCondition,
	HiddenPrimaryKeyEntry, InlineParentPropertyEntry, Join, JoinType, OrderBy, OutputColumn, ParentChildCondition,
	ParentReferenceEntry, QueryFromEntry, QuerySpec, SelectEntry, TableFromEntry, WhereEntry,
	DEFAULT_ALIAS_PLACEHOLDER, substitute_alias,
};
