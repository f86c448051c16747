//! JavaScript engine adapter using V8 backend.
//!
//! This crate installs the LESS environment into a V8 context and drives the
//! guest compiler through it.

mod bindings;
mod compiler;
mod conversions;
mod engine;

pub use compiler::V8LessCompiler;
pub use engine::V8Engine;
