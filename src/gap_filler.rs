use crate::all::*;

// Fit degree over the samples on both sides of a gap.
const FILL_DEGREE: usize = 2;

// Closes short gaps between successive fragments sharing a name, using a
// polynomial fit to samples on both sides of each gap.
pub struct GapFiller {
  // Frames.
  max_gap: i64,
  max_sample: usize,
}

impl GapFiller {
  pub fn new(max_gap: i64, max_sample: usize) -> GapFiller {
    GapFiller {
      max_gap,
      // A fit needs at least one sample from each side.
      max_sample: usize::max(max_sample, 1),
    }
  }

  // Converts seconds to whole frames, rounding down.
  pub fn from_times(max_gap_time: f64, max_sample_time: f64, frame_rate: f64) -> GapFiller {
    GapFiller::new(
      (frame_rate * max_gap_time).floor() as i64,
      (frame_rate * max_sample_time).floor() as usize,
    )
  }

  // Returns the number of joins. Overlapping same-named fragments are an
  // error, detected before anything is modified.
  pub fn process(
    &self,
    track_set: &mut TrackSet,
    passthrough: &Passthrough,
    progress: &mut dyn Progress,
  ) -> std::result::Result<usize, ProcessingError> {
    let groups: Vec<Vec<FragmentId>> = track_set.group_by_name().into_iter()
      .filter(|(name, _)| !passthrough.matches(name))
      .map(|(_, ids)| sorted_by_begin_frame(track_set, ids))
      .collect();

    for ids in &groups {
      check_overlaps(track_set, ids)?;
    }

    let mut joins = 0;
    for (i, ids) in groups.iter().enumerate() {
      progress.report(100. * i as f64 / groups.len() as f64);
      joins += self.fill_group(track_set, ids);
    }
    progress.report(100.);
    info!("Filled {} gaps, {} fragments remain.", joins, track_set.len());
    Ok(joins)
  }

  fn fill_group(&self, track_set: &mut TrackSet, ids: &[FragmentId]) -> usize {
    let mut joins = 0;
    let mut t0 = ids[0];
    for &t in &ids[1..] {
      let (gap, gap_points) = {
        let f0 = track_set.get(t0).expect("Grouped fragment must exist.");
        let f = track_set.get(t).expect("Grouped fragment must exist.");
        let gap = f0.gap_to(f);
        if gap > self.max_gap {
          t0 = t;
          continue;
        }
        (gap, self.interpolate(f0, f, gap))
      };
      let f = track_set.remove(t).expect("Grouped fragment must exist.");
      let f0 = track_set.get_mut(t0).expect("Grouped fragment must exist.");
      debug!("Joining {} frames {}..{} and {}..{}, gap {}.",
        f0.name, f0.begin_frame, f0.end_frame(), f.begin_frame, f.end_frame(), gap);
      f0.points.extend(gap_points);
      f0.points.extend(f.points);
      joins += 1;
    }
    joins
  }

  // Points for the `gap` frames between `a` and `b`.
  fn interpolate(&self, a: &Fragment, b: &Fragment, gap: i64) -> Vec<Point> {
    if gap <= 0 { return vec![] }
    let from = &a.points[a.points.len() - usize::min(a.points.len(), self.max_sample)..];
    let to = &b.points[..usize::min(b.points.len(), self.max_sample)];
    let mut times: Vec<f64> = (0..from.len()).map(|i| i as f64).collect();
    times.extend((0..to.len()).map(|i| (from.len() as i64 + gap + i as i64) as f64));
    let samples: Vec<Point> = from.iter().chain(to.iter()).copied().collect();
    let p = Polynomial::fit(&times, &samples, FILL_DEGREE);
    (0..gap).map(|i| p.eval((from.len() as i64 + i) as f64)).collect()
  }
}

fn sorted_by_begin_frame(track_set: &TrackSet, mut ids: Vec<FragmentId>) -> Vec<FragmentId> {
  ids.sort_by_key(|&id| track_set.get(id).map(|f| f.begin_frame));
  ids
}

fn check_overlaps(track_set: &TrackSet, ids: &[FragmentId]) -> std::result::Result<(), ProcessingError> {
  for pair in ids.windows(2) {
    let (Some(a), Some(b)) = (track_set.get(pair[0]), track_set.get(pair[1])) else { continue };
    let gap = a.gap_to(b);
    if gap < 0 {
      return Err(ProcessingError::Overlap {
        name: a.name.clone(),
        frame: b.begin_frame,
        overlap: -gap,
      });
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parabola(name: &str, begin_frame: i64, n: usize) -> Fragment {
    let points = (0..n).map(|i| {
      let t = (begin_frame + i as i64) as f64;
      Point::new(t, 0.1 * t * t, -t)
    }).collect();
    Fragment::new(name.to_string(), begin_frame, points)
  }

  fn lens(track_set: &TrackSet) -> Vec<(String, i64, usize)> {
    let mut v: Vec<_> = track_set.fragments()
      .map(|f| (f.name.clone(), f.begin_frame, f.num_frames()))
      .collect();
    v.sort();
    v
  }

  #[test]
  fn test_fill_quadratic() {
    let mut s = TrackSet::from_fragments(vec![parabola("a", 0, 10), parabola("a", 14, 10)]);
    let joins = GapFiller::new(5, 5).process(&mut s, &Passthrough::default(), &mut NoProgress).unwrap();
    assert_eq!(joins, 1);
    let f = s.fragments().next().unwrap();
    assert_eq!(f.num_frames(), 24);
    let expected = parabola("a", 0, 24);
    for (p, q) in f.points.iter().zip(expected.points.iter()) {
      assert!((p - q).norm() < 1e-6);
    }
  }

  #[test]
  fn test_gap_boundary() {
    let mut s = TrackSet::from_fragments(vec![parabola("a", 0, 5), parabola("a", 8, 5)]);
    GapFiller::new(3, 5).process(&mut s, &Passthrough::default(), &mut NoProgress).unwrap();
    assert_eq!(lens(&s), vec![("a".to_string(), 0, 13)]);

    let mut s = TrackSet::from_fragments(vec![parabola("a", 0, 5), parabola("a", 9, 5)]);
    GapFiller::new(3, 5).process(&mut s, &Passthrough::default(), &mut NoProgress).unwrap();
    assert_eq!(lens(&s), vec![("a".to_string(), 0, 5), ("a".to_string(), 9, 5)]);
  }

  #[test]
  fn test_from_times() {
    let filler = GapFiller::from_times(0.2, 0.05, 100.);
    assert_eq!(filler.max_gap, 20);
    assert_eq!(filler.max_sample, 5);
    assert_eq!(GapFiller::from_times(0.2, 0., 100.).max_sample, 1);
  }

  #[test]
  fn test_overlap_is_error() {
    let fragments = vec![parabola("a", 0, 10), parabola("a", 8, 10), parabola("b", 0, 3), parabola("b", 3, 3)];
    let mut s = TrackSet::from_fragments(fragments.clone());
    let err = GapFiller::new(5, 5).process(&mut s, &Passthrough::default(), &mut NoProgress).unwrap_err();
    assert_eq!(err, ProcessingError::Overlap { name: "a".to_string(), frame: 8, overlap: 2 });
    assert!(err.to_string().contains("consolidate"));
    // Nothing was joined, not even the valid group.
    assert_eq!(s.into_fragments(), fragments);
  }

  #[test]
  fn test_chain_and_names() {
    let mut s = TrackSet::from_fragments(vec![
      parabola("a", 20, 5),
      parabola("a", 0, 5),
      parabola("a", 5, 5),
      parabola("a", 11, 5),
      parabola("b", 7, 5),
      parabola("Hd1", 0, 5),
      parabola("Hd1", 6, 5),
    ]);
    let passthrough = Passthrough::new(vec!["Hd".to_string()]);
    let joins = GapFiller::new(2, 3).process(&mut s, &passthrough, &mut NoProgress).unwrap();
    assert_eq!(joins, 2);
    assert_eq!(lens(&s), vec![
      ("Hd1".to_string(), 0, 5),
      ("Hd1".to_string(), 6, 5),
      ("a".to_string(), 0, 16),
      ("a".to_string(), 20, 5),
      ("b".to_string(), 7, 5),
    ]);
  }

  #[test]
  fn test_two_samples_linear() {
    let mut s = TrackSet::from_fragments(vec![
      Fragment::new("a".to_string(), 0, vec![Point::new(0., 0., 0.)]),
      Fragment::new("a".to_string(), 4, vec![Point::new(4., 8., 0.)]),
    ]);
    GapFiller::new(3, 10).process(&mut s, &Passthrough::default(), &mut NoProgress).unwrap();
    let f = s.fragments().next().unwrap();
    assert_eq!(f.num_frames(), 5);
    assert!((f.points[2] - Point::new(2., 4., 0.)).norm() < 1e-9);
  }
}
