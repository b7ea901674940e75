use crate::all::*;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

// Candidate pairs between progress reports and cancellation checks.
const CHECK_INTERVAL: usize = 100;

// How well the end of one fragment continues into the start of another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
  // Distance from the last point of the first fragment to the first point
  // of the second. Only meaningful for abutting fragments.
  Endpoint,
  // Distance between both fragments' polynomial extrapolations at the
  // middle of the gap.
  Extrapolation,
}

impl Metric {
  pub fn deviation(self, a: &Fragment, b: &Fragment, gap: i64) -> f64 {
    match self {
      Metric::Endpoint => {
        debug_assert_eq!(gap, 0, "Endpoint metric is for abutting fragments.");
        (b.first() - a.last()).norm()
      },
      Metric::Extrapolation => {
        let m = (gap as f64 - 1.) / 2.;
        let pa = a.tail_polynomial().eval(m);
        let pb = b.head_polynomial().eval(m - gap as f64);
        (pb - pa).norm()
      },
    }
  }
}

// Proposal to append `b` to `a`. The lengths record the fragments the
// deviation was computed from.
#[derive(Clone, Debug)]
struct Candidate {
  deviation: f64,
  a: FragmentId,
  b: FragmentId,
  a_len: usize,
  b_len: usize,
}

impl Candidate {
  fn new(track_set: &TrackSet, a: FragmentId, b: FragmentId, gap: i64, metric: Metric) -> Candidate {
    assert_ne!(a, b, "Fragment cannot be merged with itself.");
    let fa = track_set.get(a).expect("Candidate fragment must exist.");
    let fb = track_set.get(b).expect("Candidate fragment must exist.");
    assert_eq!(fa.gap_to(fb), gap, "Candidate gap mismatch.");
    Candidate {
      deviation: metric.deviation(fa, fb, gap),
      a,
      b,
      a_len: fa.num_frames(),
      b_len: fb.num_frames(),
    }
  }
}

// `BinaryHeap` is a max-heap: the smallest deviation must compare greatest.
// Ties prefer smaller fragment ids.
impl Ord for Candidate {
  fn cmp(&self, other: &Self) -> Ordering {
    other.deviation.total_cmp(&self.deviation)
      .then_with(|| other.a.cmp(&self.a))
      .then_with(|| other.b.cmp(&self.b))
  }
}

impl PartialOrd for Candidate {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl PartialEq for Candidate {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for Candidate {}

// Joins fragments separated by small gaps when they continue each other
// well enough.
// For each gap size the lowest deviation pair is merged first, greedily,
// until the lowest remaining deviation exceeds `max_deviation`. Gap frames
// are filled with the mean of both fragments' extrapolations. Overlapping
// fragments (negative gap) lose the overlapping head of the second one.
pub struct Merger {
  metric: Metric,
  max_deviation: f64,
}

impl Merger {
  pub fn new(metric: Metric, max_deviation: f64) -> Merger {
    Merger {
      metric,
      max_deviation,
    }
  }

  // Runs one pass per gap in `min_gap..=max_gap`. Returns the number of
  // merges. On cancellation the committed merges stand.
  pub fn process(
    &self,
    track_set: &mut TrackSet,
    min_gap: i64,
    max_gap: i64,
    progress: &mut dyn Progress,
  ) -> usize {
    let mut merges = 0;
    for gap in min_gap..=max_gap {
      progress.set_label(&format!("Matching fragments (gap={})", gap));
      let before = track_set.len();
      let (n, cancelled) = self.process_gap(track_set, gap, progress);
      merges += n;
      info!("Gap {}: {} merges, {} -> {} fragments.", gap, n, before, track_set.len());
      if cancelled {
        info!("Matching cancelled.");
        break;
      }
    }
    merges
  }

  fn process_gap(
    &self,
    track_set: &mut TrackSet,
    gap: i64,
    progress: &mut dyn Progress,
  ) -> (usize, bool) {
    let mut by_begin_frame: HashMap<i64, Vec<FragmentId>> = HashMap::new();
    let mut by_end_frame: HashMap<i64, Vec<FragmentId>> = HashMap::new();
    for (id, fragment) in track_set.iter() {
      by_begin_frame.entry(fragment.begin_frame).or_default().push(id);
      by_end_frame.entry(fragment.end_frame()).or_default().push(id);
    }
    let mut heap = match self.find_candidates(track_set, gap, &by_begin_frame, progress) {
      Some(heap) => heap,
      None => return (0, true),
    };
    let total = heap.len();
    let mut merges = 0;
    let mut steps = 0;

    while let Some(candidate) = heap.pop() {
      steps += 1;
      if steps % CHECK_INTERVAL == 0 {
        progress.report(100. * (total - usize::min(total, heap.len())) as f64 / total as f64);
        if progress.is_cancelled() { return (merges, true) }
      }

      let (a, b) = (candidate.a, candidate.b);
      let (fa, fb) = match (track_set.get(a), track_set.get(b)) {
        (Some(fa), Some(fb)) => (fa, fb),
        // `b` was merged away.
        _ => continue,
      };
      // `a` already received its successor.
      if fa.gap_to(fb) != gap { continue }
      // Superseded by a rescored entry pushed after the join that changed it.
      if fa.num_frames() != candidate.a_len || fb.num_frames() != candidate.b_len { continue }

      if candidate.deviation > self.max_deviation { break }

      debug!("Merging {} ({}) <- {} ({}), gap {}, deviation {:.3}.",
        fa.name, a, fb.name, b, gap, candidate.deviation);
      join(track_set, a, b, gap);
      merges += 1;

      // Only `a` changed. Pairs that continued from `b` now continue from `a`,
      // and pairs into `a` see a longer head.
      let Some(fa) = track_set.get(a) else { continue };
      let (begin, end) = (fa.begin_frame, fa.end_frame());
      by_end_frame.entry(end).or_default().push(a);
      let followers = by_begin_frame.get(&(end + gap)).into_iter().flatten().map(|&c| (a, c));
      let predecessors = by_end_frame.get(&(begin - gap)).into_iter().flatten().map(|&x| (x, a));
      for (x, y) in followers.chain(predecessors) {
        if let Some(c) = self.candidate(track_set, x, y, gap) {
          heap.push(c);
        }
      }
    }
    progress.report(100.);
    (merges, false)
  }

  // Returns `None` if cancelled.
  fn find_candidates(
    &self,
    track_set: &TrackSet,
    gap: i64,
    by_begin_frame: &HashMap<i64, Vec<FragmentId>>,
    progress: &mut dyn Progress,
  ) -> Option<BinaryHeap<Candidate>> {
    let ids = track_set.ids();
    let mut heap = BinaryHeap::new();
    for (i, &a) in ids.iter().enumerate() {
      if i % CHECK_INTERVAL == 0 {
        progress.report(100. * i as f64 / ids.len() as f64);
        if progress.is_cancelled() { return None }
      }
      let Some(fa) = track_set.get(a) else { continue };
      let Some(followers) = by_begin_frame.get(&(fa.end_frame() + gap)) else { continue };
      for &b in followers {
        if let Some(c) = self.candidate(track_set, a, b, gap) {
          heap.push(c);
        }
      }
    }
    debug!("Gap {}: {} candidate pairs.", gap, heap.len());
    Some(heap)
  }

  // Scored pair if `b` can follow `a` at `gap` in the current track set.
  fn candidate(&self, track_set: &TrackSet, a: FragmentId, b: FragmentId, gap: i64) -> Option<Candidate> {
    if a == b { return None }
    let fa = track_set.get(a)?;
    let fb = track_set.get(b)?;
    if fa.gap_to(fb) != gap { return None }
    // The overlap would consume all of `b`.
    if gap < 0 && fb.num_frames() as i64 <= -gap { return None }
    Some(Candidate::new(track_set, a, b, gap, self.metric))
  }
}

// Appends `b` to `a`, interpolating any gap frames between them.
fn join(track_set: &mut TrackSet, a: FragmentId, b: FragmentId, gap: i64) {
  let fb = track_set.remove(b).expect("Merged fragment must exist.");
  let fa = track_set.get_mut(a).expect("Merged fragment must exist.");
  assert_eq!(fa.gap_to(&fb), gap, "Merge gap mismatch.");
  if gap > 0 {
    let pa = fa.tail_polynomial();
    let pb = fb.head_polynomial();
    for i in 0..gap {
      let t = i as f64;
      fa.points.push((pa.eval(t) + pb.eval(t - gap as f64)) / 2.);
    }
  }
  let skip = if gap < 0 { (-gap) as usize } else { 0 };
  fa.points.extend(fb.points.into_iter().skip(skip));
}
