//! Floe - sea-ice visualization
//!
//! A shader-driven water surface rendered with wgpu, and a downloader for the
//! NSIDC monthly sea-ice concentration image archive.

pub mod core;
pub mod render;
pub mod scene;
pub mod water;
pub mod archive;
