// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Relq

//! Identifier handling shared by the Relq spec builder and SQL renderer.
//!
//! Relational engines disagree on what happens to an identifier that is
//! written without quotes: some fold it to upper case, some to lower case.
//! This crate captures that policy as [`IdentCase`] and provides the two
//! operations everything else is built on:
//!
//! - Quoting of names that cannot survive unquoted under a given policy
//!   via [`quote_if_needed`]
//! - Case folding for comparison independent of typed case via
//!   [`case_normalize`], leaving quoted names untouched

pub mod ident;

pub use ident::{IdentCase, QUOTE, case_normalize, quote_if_needed};
