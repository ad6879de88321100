//! Gradient record model, wire codec and errors.

pub mod codec;
pub mod entities;
pub mod errors;
