//! Face extraction and per-person sorting for photo folders.
//!
//! Bounded contexts follow a `domain` / `infrastructure` split: domain
//! modules hold traits and pure logic, infrastructure modules hold the
//! `image`, ONNX Runtime and filesystem backed implementations.

pub mod clustering;
pub mod detection;
pub mod imaging;
pub mod persons;
pub mod pipeline;
pub mod shared;
