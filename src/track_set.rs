use crate::all::*;

// All fragments at one point of the pipeline.
// Fragments live in an arena so that merge bookkeeping can refer to them by
// `FragmentId` while others are removed. Removed slots are never reused.
#[derive(Clone, Debug, Default)]
pub struct TrackSet {
  fragments: Vec<Option<Fragment>>,
  name_counter: usize,
}

impl TrackSet {
  pub fn new() -> TrackSet {
    TrackSet::default()
  }

  pub fn from_fragments(fragments: impl IntoIterator<Item = Fragment>) -> TrackSet {
    let mut track_set = TrackSet::new();
    for fragment in fragments {
      track_set.add(fragment);
    }
    track_set
  }

  pub fn new_name(&mut self) -> String {
    self.name_counter += 1;
    format!("tr_{}", self.name_counter)
  }

  pub fn add(&mut self, fragment: Fragment) -> FragmentId {
    self.fragments.push(Some(fragment));
    FragmentId(self.fragments.len() - 1)
  }

  pub fn remove(&mut self, id: FragmentId) -> Option<Fragment> {
    self.fragments.get_mut(id.0).and_then(|x| x.take())
  }

  pub fn get(&self, id: FragmentId) -> Option<&Fragment> {
    self.fragments.get(id.0).and_then(|x| x.as_ref())
  }

  pub fn get_mut(&mut self, id: FragmentId) -> Option<&mut Fragment> {
    self.fragments.get_mut(id.0).and_then(|x| x.as_mut())
  }

  pub fn contains(&self, id: FragmentId) -> bool {
    self.get(id).is_some()
  }

  pub fn len(&self) -> usize {
    self.fragments.iter().filter(|x| x.is_some()).count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn ids(&self) -> Vec<FragmentId> {
    self.iter().map(|(id, _)| id).collect()
  }

  pub fn iter(&self) -> impl Iterator<Item = (FragmentId, &Fragment)> {
    self.fragments.iter().enumerate()
      .filter_map(|(i, x)| x.as_ref().map(|f| (FragmentId(i), f)))
  }

  pub fn fragments(&self) -> impl Iterator<Item = &Fragment> {
    self.fragments.iter().flatten()
  }

  pub fn into_fragments(self) -> Vec<Fragment> {
    self.fragments.into_iter().flatten().collect()
  }

  // Fragment ids by name, names in sorted order and ids in arena order.
  pub fn group_by_name(&self) -> BTreeMap<String, Vec<FragmentId>> {
    let mut groups: BTreeMap<String, Vec<FragmentId>> = BTreeMap::new();
    for (id, fragment) in self.iter() {
      groups.entry(fragment.name.clone()).or_default().push(id);
    }
    groups
  }

  pub fn min_frame(&self) -> Option<i64> {
    self.fragments().map(|f| f.begin_frame).min()
  }

  pub fn max_frame(&self) -> Option<i64> {
    self.fragments().map(|f| f.end_frame()).max()
  }

  pub fn num_frames(&self) -> usize {
    match (self.min_frame(), self.max_frame()) {
      (Some(a), Some(b)) => (b - a) as usize,
      _ => 0,
    }
  }

  // Removes fragments with fewer than `min_length` frames.
  // Returns the number of removed fragments.
  pub fn delete_short(&mut self, min_length: usize) -> usize {
    let mut n = 0;
    for slot in self.fragments.iter_mut() {
      if slot.as_ref().map_or(false, |f| f.num_frames() < min_length) {
        *slot = None;
        n += 1;
      }
    }
    n
  }

  pub fn rename(&mut self) {
    for (i, fragment) in self.fragments.iter_mut().flatten().enumerate() {
      fragment.name = format!("tr_{}", i + 1);
    }
  }

  // Drops all data at `frame` and after.
  pub fn cut_right(&mut self, frame: i64) {
    for slot in self.fragments.iter_mut() {
      let Some(fragment) = slot else { continue };
      if fragment.begin_frame >= frame {
        *slot = None;
      }
      else if fragment.end_frame() > frame {
        fragment.points.truncate((frame - fragment.begin_frame) as usize);
      }
    }
  }

  // Drops all data before `frame` and renumbers so that `frame` becomes frame 0.
  pub fn cut_left(&mut self, frame: i64) {
    for slot in self.fragments.iter_mut() {
      let Some(fragment) = slot else { continue };
      if fragment.end_frame() <= frame {
        *slot = None;
        continue;
      }
      if fragment.begin_frame < frame {
        fragment.points.drain(..(frame - fragment.begin_frame) as usize);
        fragment.begin_frame = frame;
      }
      fragment.begin_frame -= frame;
    }
  }
}

// Names left alone by the by-name operations, matched by prefix. Names are
// opaque here, the prefixes come from whoever assigned the labels.
#[derive(Clone, Debug, Default)]
pub struct Passthrough {
  prefixes: Vec<String>,
}

impl Passthrough {
  pub fn new(prefixes: Vec<String>) -> Passthrough {
    Passthrough { prefixes }
  }

  pub fn matches(&self, name: &str) -> bool {
    self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
  }
}

// Serialized form of a track set.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackFile {
  pub frame_rate: f64,
  pub tracks: Vec<TrackRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
  pub name: String,
  pub begin_frame: i64,
  pub points: Vec<[f64; 3]>,
}

impl TrackFile {
  pub fn new(track_set: &TrackSet, frame_rate: f64) -> TrackFile {
    TrackFile {
      frame_rate,
      tracks: track_set.fragments().map(|f| TrackRecord {
        name: f.name.clone(),
        begin_frame: f.begin_frame,
        points: f.points.iter().map(to_array).collect(),
      }).collect(),
    }
  }

  pub fn load(path: &Path) -> Result<TrackFile> {
    let s = std::fs::read_to_string(path)
      .context(format!("Failed to read file {}.", path.display()))?;
    serde_json::from_str(&s)
      .context(format!("Failed to parse {}.", path.display()))
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    let file = File::create(path)
      .context(format!("Failed to create file {}.", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), self)
      .context(format!("Failed to write {}.", path.display()))
  }

  pub fn into_track_set(self) -> Result<TrackSet> {
    let mut track_set = TrackSet::new();
    for record in self.tracks {
      if record.points.is_empty() {
        warn!("Skipping empty track {}.", record.name);
        continue;
      }
      let points = record.points.iter().map(from_array).collect();
      track_set.add(Fragment::new(record.name, record.begin_frame, points));
    }
    Ok(track_set)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fragment(name: &str, begin_frame: i64, n: usize) -> Fragment {
    Fragment::new(name.to_string(), begin_frame, vec![Point::zeros(); n])
  }

  #[test]
  fn test_arena() {
    let mut s = TrackSet::new();
    let a = s.add(fragment("a", 0, 3));
    let b = s.add(fragment("b", 5, 2));
    assert_eq!(s.len(), 2);
    assert_eq!(s.remove(a).unwrap().name, "a");
    assert!(s.remove(a).is_none());
    assert!(!s.contains(a));
    assert!(s.contains(b));
    assert_eq!(s.ids(), vec![b]);
    // Slots are not reused.
    let c = s.add(fragment("c", 0, 1));
    assert_ne!(a, c);
    assert_eq!(s.min_frame(), Some(0));
    assert_eq!(s.max_frame(), Some(7));
    assert_eq!(s.num_frames(), 7);
  }

  #[test]
  fn test_new_name() {
    let mut s = TrackSet::new();
    assert_eq!(s.new_name(), "tr_1");
    assert_eq!(s.new_name(), "tr_2");
  }

  #[test]
  fn test_delete_short_and_rename() {
    let mut s = TrackSet::from_fragments(vec![
      fragment("x", 0, 1),
      fragment("y", 0, 10),
      fragment("z", 3, 5),
    ]);
    assert_eq!(s.delete_short(5), 1);
    s.rename();
    let names: Vec<_> = s.fragments().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["tr_1", "tr_2"]);
  }

  #[test]
  fn test_group_by_name() {
    let s = TrackSet::from_fragments(vec![
      fragment("b", 0, 1),
      fragment("a", 0, 1),
      fragment("b", 4, 1),
    ]);
    let groups = s.group_by_name();
    let names: Vec<_> = groups.keys().cloned().collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(groups["b"], vec![FragmentId(0), FragmentId(2)]);
  }

  #[test]
  fn test_cut() {
    let mut s = TrackSet::from_fragments(vec![
      fragment("a", 0, 10),
      fragment("b", 8, 4),
      fragment("c", 2, 2),
    ]);
    s.cut_right(9);
    let lens: Vec<_> = s.fragments().map(|f| f.num_frames()).collect();
    assert_eq!(lens, vec![9, 1, 2]);

    s.cut_left(5);
    let ranges: Vec<_> = s.fragments().map(|f| (f.begin_frame, f.end_frame())).collect();
    assert_eq!(ranges, vec![(0, 4), (3, 4)]);
  }

  #[test]
  fn test_track_file() {
    let s = TrackSet::from_fragments(vec![
      Fragment::new("a".to_string(), 2, vec![Point::new(1., 2., 3.)]),
    ]);
    let file = TrackFile::new(&s, 100.);
    let json = serde_json::to_string(&file).unwrap();
    assert!(json.contains("\"beginFrame\":2"));
    assert!(json.contains("\"frameRate\":100"));
    let s2 = serde_json::from_str::<TrackFile>(&json).unwrap().into_track_set().unwrap();
    assert_eq!(s2.fragments().next(), s.fragments().next());
  }
}
