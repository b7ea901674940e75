// Data conditions the caller is expected to fix and retry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProcessingError {
  #[error("Same name trajectories overlap: {name} has {overlap} frame(s) covered twice starting at frame {frame}. \
    Make sure trajectories are labeled correctly and average trajectories by name (consolidate) to correct minor overlaps.")]
  Overlap {
    name: String,
    frame: i64,
    overlap: i64,
  },
}
