//! Upstream news fetching, normalization and selection.

pub mod gateway;
pub mod selection;
pub mod story;
