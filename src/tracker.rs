use crate::all::*;

// Frames between progress reports and cancellation checks.
const CHECK_INTERVAL: usize = 100;

// Frame-to-frame distance tracker.
// Each frame the closest remaining (fragment, point) pair is committed
// first, until the closest remaining distance exceeds the threshold. This is
// greedy, not an optimal assignment. Ties go to the earlier fragment, then
// to the earlier point.
pub struct Tracker {
  distance_threshold: f64,
}

// Fragment being extended, not yet in the track set.
struct ActiveFragment {
  name: String,
  begin_frame: i64,
  points: Vec<Point>,
}

impl ActiveFragment {
  fn into_fragment(self) -> Fragment {
    Fragment::new(self.name, self.begin_frame, self.points)
  }
}

impl Tracker {
  pub fn new(distance_threshold: f64) -> Tracker {
    Tracker {
      distance_threshold,
    }
  }

  // Stops early if `progress` is cancelled; fragments end at the last
  // processed frame.
  pub fn process(&self, frames: &[Frame], progress: &mut dyn Progress) -> TrackSet {
    let mut track_set = TrackSet::new();
    let mut active: Vec<ActiveFragment> = vec![];
    // Workspace.
    let mut last_points: Vec<Point> = vec![];
    let mut matched_points: Vec<bool> = vec![];

    for (frame_number, frame) in frames.iter().enumerate() {
      if frame_number % CHECK_INTERVAL == 0 {
        progress.report(100. * frame_number as f64 / frames.len() as f64);
        if progress.is_cancelled() {
          info!("Tracking cancelled at frame {}.", frame_number);
          break;
        }
      }
      let frame_number = frame_number as i64;

      last_points.clear();
      last_points.extend(active.iter().map(|x| x.points[x.points.len() - 1]));
      let matches = self.match_points(&last_points, &frame.points);

      matched_points.clear();
      matched_points.resize(frame.points.len(), false);
      let mut next_active = Vec::with_capacity(active.len());
      for (fragment, point) in active.into_iter().zip(matches) {
        match point {
          Some(j) => {
            let mut fragment = fragment;
            fragment.points.push(frame.points[j]);
            matched_points[j] = true;
            next_active.push(fragment);
          },
          None => {
            track_set.add(fragment.into_fragment());
          },
        }
      }
      for (j, point) in frame.points.iter().enumerate() {
        if matched_points[j] { continue }
        next_active.push(ActiveFragment {
          name: track_set.new_name(),
          begin_frame: frame_number,
          points: vec![*point],
        });
      }
      active = next_active;
    }

    for fragment in active {
      track_set.add(fragment.into_fragment());
    }
    progress.report(100.);
    debug!("Tracked {} fragments over {} frames.", track_set.len(), frames.len());
    track_set
  }

  // For each of `previous`, index of the matched point in `current`, if any.
  fn match_points(&self, previous: &[Point], current: &[Point]) -> Vec<Option<usize>> {
    let mut matches = vec![None; previous.len()];
    if previous.is_empty() || current.is_empty() { return matches }

    let d = distance_matrix(previous, current);
    // Repeatedly taking the global minimum is the same as walking the
    // candidates in sorted order and skipping used rows and columns.
    let mut candidates: Vec<(f64, usize, usize)> = vec![];
    for i in 0..d.nrows() {
      for j in 0..d.ncols() {
        if d[(i, j)] <= self.distance_threshold {
          candidates.push((d[(i, j)], i, j));
        }
      }
    }
    // Stable, so equal distances keep row-major order.
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut used_points = vec![false; current.len()];
    for (_, i, j) in candidates {
      if matches[i].is_some() || used_points[j] { continue }
      matches[i] = Some(j);
      used_points[j] = true;
    }
    matches
  }
}
