// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

//! Relation identity and the schema metadata contract.
//!
//! This crate provides:
//! - Parsing and normalized comparison of relation names via [`RelId`]
//! - The [`SchemaMetadata`] trait implemented by whatever component owns
//!   discovered schema information (tables, primary keys, foreign keys)
//! - [`CatalogError`], including the ambiguous-foreign-key failure that a
//!   metadata provider must raise instead of guessing
//!
//! The spec builder and SQL renderer treat a [`SchemaMetadata`]
//! implementation as authoritative input and perform no discovery of
//! their own.

pub mod error;
pub mod provider;
pub mod relation;

pub use error::CatalogError;
pub use provider::{FieldPair, ForeignKey, SchemaMetadata};
pub use relation::RelId;
