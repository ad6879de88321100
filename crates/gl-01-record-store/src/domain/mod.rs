//! # Domain Layer
//!
//! Pure world-state logic for the Record Store.
//!
//! This module contains NO I/O dependencies. Locking, persistence and
//! cursor bookkeeping live in `adapters/` and `ports/`.

pub mod entities;
pub mod errors;
pub mod index;
pub mod selector;
pub mod value_objects;
pub mod world_state;
pub mod write_log;
