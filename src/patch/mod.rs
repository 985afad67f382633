//! Patch phase: rewriting the lock manifest and emitted bootstrap chunks once
//! every final path is known.

pub mod code;
pub mod manifest;
