//! Core logic of the togglr platform.
//!
//! This crate consumes the repository traits of `togglr-types` only; it
//! never names a concrete backend. The [`hub::FlagHub`] facade weaves
//! access control and audit emission into every mutation, whatever store
//! backs it.

pub mod access;
pub mod audit;
pub mod hub;
pub mod mem;
pub mod strategy;

// vim: ts=4
