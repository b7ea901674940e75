use crate::all::*;

// Samples used at most when extrapolating past either end of a fragment.
pub const EXTRAPOLATION_SAMPLES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FragmentId(pub usize);

impl fmt::Display for FragmentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

// Dense run of observations of one marker, covering frames
// `[begin_frame, end_frame())` with exactly one point per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
  pub name: String,
  pub begin_frame: i64,
  pub points: Vec<Point>,
}

impl Fragment {
  pub fn new(name: String, begin_frame: i64, points: Vec<Point>) -> Fragment {
    assert!(!points.is_empty(), "Fragments must contain at least one frame.");
    Fragment { name, begin_frame, points }
  }

  pub fn from_point(name: String, frame: i64, point: Point) -> Fragment {
    Fragment::new(name, frame, vec![point])
  }

  pub fn end_frame(&self) -> i64 {
    self.begin_frame + self.points.len() as i64
  }

  pub fn num_frames(&self) -> usize {
    self.points.len()
  }

  pub fn first(&self) -> &Point {
    &self.points[0]
  }

  pub fn last(&self) -> &Point {
    &self.points[self.points.len() - 1]
  }

  // Number of frames from the end of `self` to the start of `next`.
  pub fn gap_to(&self, next: &Fragment) -> i64 {
    next.begin_frame - self.end_frame()
  }

  pub fn has_frame(&self, frame: i64) -> bool {
    frame >= self.begin_frame && frame < self.end_frame()
  }

  pub fn get_frame(&self, frame: i64) -> Option<&Point> {
    if !self.has_frame(frame) { return None }
    Some(&self.points[(frame - self.begin_frame) as usize])
  }

  pub fn average(&self) -> Point {
    mean(&self.points)
  }

  // Splits so that the second part begins at `frame`. Returns `None` unless
  // both parts would be non-empty.
  pub fn split(&self, frame: i64) -> Option<(Fragment, Fragment)> {
    if frame <= self.begin_frame || frame >= self.end_frame() { return None }
    let i = (frame - self.begin_frame) as usize;
    Some((
      Fragment::new(self.name.clone(), self.begin_frame, self.points[..i].to_vec()),
      Fragment::new(self.name.clone(), frame, self.points[i..].to_vec()),
    ))
  }

  // Fit to the trailing samples. Time zero is `end_frame()`, so the last
  // point sits at `t = -1`.
  pub fn tail_polynomial(&self) -> Polynomial {
    let n = usize::min(self.points.len(), EXTRAPOLATION_SAMPLES);
    let samples = &self.points[self.points.len() - n..];
    let times: Vec<f64> = (0..n).map(|i| i as f64 - n as f64).collect();
    Polynomial::fit(&times, samples, extrapolation_degree(n))
  }

  // Fit to the leading samples. Time zero is `begin_frame`.
  pub fn head_polynomial(&self) -> Polynomial {
    let n = usize::min(self.points.len(), EXTRAPOLATION_SAMPLES);
    let times: Vec<f64> = (0..n).map(|i| i as f64).collect();
    Polynomial::fit(&times, &self.points[..n], extrapolation_degree(n))
  }

  // Position `offset` frames past the end, offset 0 being the first frame after.
  pub fn predict(&self, offset: f64) -> Point {
    self.tail_polynomial().eval(offset)
  }

  // Position `offset` frames before the start, offset 0 being the first frame before.
  pub fn back_predict(&self, offset: f64) -> Point {
    self.head_polynomial().eval(-1. - offset)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line(begin_frame: i64, n: usize) -> Fragment {
    let points = (0..n).map(|i| Point::new((begin_frame + i as i64) as f64, 0., 0.)).collect();
    Fragment::new("a".to_string(), begin_frame, points)
  }

  #[test]
  fn test_frames() {
    let f = line(3, 4);
    assert_eq!(f.end_frame(), 7);
    assert_eq!(f.num_frames(), 4);
    assert!(!f.has_frame(2));
    assert!(f.has_frame(3));
    assert!(f.has_frame(6));
    assert!(!f.has_frame(7));
    assert_eq!(f.get_frame(5), Some(&Point::new(5., 0., 0.)));
    assert_eq!(f.get_frame(7), None);
    assert_eq!(f.gap_to(&line(9, 1)), 2);
    assert_eq!(f.gap_to(&line(5, 1)), -2);
    assert_eq!(f.average(), Point::new(4.5, 0., 0.));
  }

  #[test]
  fn test_split() {
    let f = line(0, 5);
    let (a, b) = f.split(2).unwrap();
    assert_eq!(a.begin_frame, 0);
    assert_eq!(a.num_frames(), 2);
    assert_eq!(b.begin_frame, 2);
    assert_eq!(b.num_frames(), 3);
    assert_eq!(b.name, "a");
    assert!(f.split(0).is_none());
    assert!(f.split(5).is_none());
  }

  #[test]
  fn test_predict() {
    let f = line(0, 12);
    // Linear motion extrapolates exactly whatever the fit degree.
    assert!((f.predict(0.) - Point::new(12., 0., 0.)).norm() < 1e-9);
    assert!((f.predict(2.5) - Point::new(14.5, 0., 0.)).norm() < 1e-9);
    assert!((f.back_predict(0.) - Point::new(-1., 0., 0.)).norm() < 1e-9);
    assert!((f.back_predict(3.) - Point::new(-4., 0., 0.)).norm() < 1e-9);

    let single = Fragment::from_point("b".to_string(), 4, Point::new(1., 2., 3.));
    assert_eq!(single.predict(5.), Point::new(1., 2., 3.));
    assert_eq!(single.back_predict(5.), Point::new(1., 2., 3.));
  }

  #[test]
  fn test_predict_quadratic() {
    let points = (0..6).map(|i| {
      let t = i as f64;
      Point::new(t * t, 0., 1.)
    }).collect();
    let f = Fragment::new("c".to_string(), 0, points);
    assert!((f.predict(0.) - Point::new(36., 0., 1.)).norm() < 1e-9);
    assert!((f.back_predict(0.) - Point::new(1., 0., 1.)).norm() < 1e-9);
  }
}
