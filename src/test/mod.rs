//! Shared fixtures for unit tests.

mod helpers;

pub(crate) use helpers::*;
