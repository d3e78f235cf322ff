//! Layers composited after the per-pixel stage, in this order: per-filter
//! wash, grain, light leak, prism.

pub mod grain;
pub mod leak;
pub mod prism;
pub mod wash;
