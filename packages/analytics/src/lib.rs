#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Derivation pipeline for the violations dashboard.
//!
//! Each public function in [`pipeline`] produces one derived view from a
//! dataset (or a date-filtered slice of one). They are pure: the same
//! inputs always give the same output, and nothing is cached between
//! calls. Empty inputs produce empty outputs rather than errors.

pub mod pipeline;
