// Reconstruction of marker trajectories from unlabeled motion capture
// point clouds, and repair of the fragments that occlusions leave behind.

pub mod all;
pub mod consolidate;
pub mod error;
pub mod fragment;
pub mod frame;
pub mod gap_filler;
pub mod input;
pub mod math;
pub mod merger;
pub mod parameters;
pub mod pipeline;
pub mod progress;
pub mod synthetic;
pub mod track_set;
pub mod tracker;
pub mod types;
pub mod util;
