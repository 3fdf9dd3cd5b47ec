//! Core orchestration building blocks: pipeline parameters and the
//! per-subject stage driver. These are internal primitives consumed by the
//! high-level `api` module.
pub mod params;
pub mod pipeline;
