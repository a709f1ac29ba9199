//! Template sets: discovery, manifests and rendering of artifact records.

pub mod builtin;
pub mod dir;
pub mod kind;
pub mod manager;

pub use dir::*;
pub use kind::*;
pub use manager::*;
