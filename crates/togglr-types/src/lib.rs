//! Shared types, repository traits, and error types for the togglr platform.
//!
//! This crate contains the foundational types that are shared between the
//! core crate and all store adapter implementations. Extracting these into a
//! separate crate keeps adapters free of any dependency on the hub logic.

pub mod access;
pub mod configuration;
pub mod error;
pub mod event;
pub mod feature;
pub mod prelude;
pub mod property;
pub mod repository;
pub mod types;

// vim: ts=4
