// THEORY:
// This file is the main entry point for the `skin_face` library crate. It exposes
// the detector through `pipeline` (the synchronous, stateless `detect` call and
// its `DetectorConfig`) and `parallel_pipeline` (batch detection and the polling
// loop for live sources).
//
// The stages themselves live in `core_modules`: the per-pixel skin classifier,
// the grid scanner, the star clusterer and the bounding-box aggregator. They are
// public so they can be exercised and reused on their own, but most callers only
// need `detect`.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use error::{DetectorError, Result};
pub use pipeline::{DetectorConfig, FaceBox, FaceDetector, detect};
