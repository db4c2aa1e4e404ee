// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

//! SQL generation for Relq query specs.
//!
//! This crate provides:
//! - The [`Dialect`] contract an engine implements: identifier quoting,
//!   reserved words, and JSON row-object/array construction idioms
//! - Four concrete dialects via the [`dialect`] module: Postgres, MySQL,
//!   Oracle, and SQLite
//! - The recursive renderer via [`render`], turning an immutable
//!   [`relq_spec::QuerySpec`] tree into dialect SQL text
//!
//! Rendering is a pure function of the spec, the dialect, and a
//! [`RenderConfig`]; the same inputs always produce byte-identical text.

pub mod dialect;
pub mod error;
pub mod render;

pub use dialect::{Dialect, Mysql, Oracle, Postgres, Sqlite};
pub use error::RenderError;
pub use render::{RenderConfig, render};
