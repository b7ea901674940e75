use crate::all::*;

// Replaces all fragments sharing a name with their per-frame average, so
// that afterwards no frame is covered twice by one name. Frames covered by
// none of them still split the output into separate fragments.
// Returns the number of fragments produced.
pub fn consolidate(
  track_set: &mut TrackSet,
  passthrough: &Passthrough,
  progress: &mut dyn Progress,
) -> usize {
  progress.set_label("Averaging trajectories by name");
  let groups: Vec<(String, Vec<FragmentId>)> = track_set.group_by_name().into_iter()
    .filter(|(name, _)| !passthrough.matches(name))
    .collect();

  let mut output = vec![];
  for (i, (name, ids)) in groups.iter().enumerate() {
    progress.report(100. * i as f64 / groups.len() as f64);
    let fragments: Vec<Fragment> = ids.iter()
      .filter_map(|&id| track_set.remove(id))
      .collect();
    let before = output.len();
    average_fragments(name, &fragments, &mut output);
    if fragments.len() > 1 {
      debug!("Averaged {} fragments named {} into {}.", fragments.len(), name, output.len() - before);
    }
  }

  let n = output.len();
  for fragment in output {
    track_set.add(fragment);
  }
  progress.report(100.);
  info!("Consolidated {} names into {} fragments.", groups.len(), n);
  n
}

fn average_fragments(name: &str, fragments: &[Fragment], output: &mut Vec<Fragment>) {
  let begin_frame = match fragments.iter().map(|f| f.begin_frame).min() {
    Some(x) => x,
    None => return,
  };
  let end_frame = fragments.iter().map(|f| f.end_frame()).max().unwrap_or(begin_frame);

  let mut current: Option<Fragment> = None;
  for frame in begin_frame..end_frame {
    let mut sum = Point::zeros();
    let mut count = 0;
    for p in fragments.iter().filter_map(|f| f.get_frame(frame)) {
      sum += p;
      count += 1;
    }
    if count == 0 {
      output.extend(current.take());
      continue;
    }
    let average = sum / count as f64;
    match current {
      Some(ref mut fragment) => fragment.points.push(average),
      None => current = Some(Fragment::from_point(name.to_string(), frame, average)),
    }
  }
  output.extend(current);
}
