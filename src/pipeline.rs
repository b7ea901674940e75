use crate::all::*;

// Turns a raw capture into unlabeled fragments: deduplicate points, track
// frame to frame, join abutting fragments, then join across gaps.
pub fn trajectorize(
  capture: &mut Capture,
  p: &ParameterSet,
  progress: &mut dyn Progress,
) -> TrackSet {
  if p.join_distance > 0. {
    progress.set_label("Merging close points");
    let removed = capture.join_close_points(p.join_distance, progress);
    info!("Removed {} duplicate points.", removed);
  }

  progress.set_label("Distance based trajectorization");
  let mut track_set = Tracker::new(p.distance_threshold).process(&capture.frames, progress);
  info!("Tracked {} fragments over {} frames.", track_set.len(), capture.num_frames());

  // Cheap pass first so that the extrapolation pass sees longer fragments.
  Merger::new(Metric::Endpoint, p.max_deviation())
    .process(&mut track_set, 0, 0, progress);
  match_fragments(&mut track_set, p, progress);

  if p.min_length > 0 {
    let n = track_set.delete_short(p.min_length);
    info!("Removed {} fragments shorter than {} frames.", n, p.min_length);
  }
  track_set
}

// Joins broken fragments across gaps of `p.min_gap..=p.max_gap` frames.
pub fn match_fragments(
  track_set: &mut TrackSet,
  p: &ParameterSet,
  progress: &mut dyn Progress,
) -> usize {
  let before = track_set.len();
  let merges = Merger::new(Metric::Extrapolation, p.max_deviation())
    .process(track_set, p.min_gap, p.max_gap, progress);
  info!("Matching: {} -> {} fragments.", before, track_set.len());
  merges
}

pub fn fill_gaps(
  track_set: &mut TrackSet,
  p: &ParameterSet,
  progress: &mut dyn Progress,
) -> std::result::Result<usize, ProcessingError> {
  progress.set_label("Filling small gaps");
  GapFiller::from_times(p.max_gap_time, p.max_sample_time, p.frame_rate)
    .process(track_set, &p.passthrough(), progress)
}
