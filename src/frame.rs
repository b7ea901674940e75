use crate::all::*;

// Unlabeled marker observations of a single capture instant. Point order
// carries no meaning.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
  pub points: Vec<Point>,
}

impl Frame {
  pub fn new(points: Vec<Point>) -> Frame {
    Frame { points }
  }

  pub fn len(&self) -> usize {
    self.points.len()
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  // Drops duplicate observations. Of any two points closer than
  // `max_distance`, the later one is removed.
  pub fn join_close_points(&mut self, max_distance: f64) {
    let n = self.points.len();
    if n == 0 { return }
    let d = distance_matrix(&self.points, &self.points);
    let mut unique = vec![true; n];
    for i in 0..n {
      for j in (i + 1)..n {
        if d[(i, j)] < max_distance {
          unique[j] = false;
        }
      }
    }
    let mut i = 0;
    self.points.retain(|_| {
      i += 1;
      unique[i - 1]
    });
  }
}

pub struct Capture {
  pub frame_rate: f64,
  pub frames: Vec<Frame>,
}

impl Capture {
  pub fn new(frame_rate: f64, frames: Vec<Frame>) -> Capture {
    Capture { frame_rate, frames }
  }

  pub fn num_frames(&self) -> usize {
    self.frames.len()
  }

  // Returns number of points removed.
  pub fn join_close_points(&mut self, max_distance: f64, progress: &mut dyn Progress) -> usize {
    let n = self.frames.len();
    let mut removed = 0;
    for (i, frame) in self.frames.iter_mut().enumerate() {
      if i % 1000 == 0 {
        progress.report(100. * i as f64 / n as f64);
        if progress.is_cancelled() { break }
      }
      let before = frame.len();
      frame.join_close_points(max_distance);
      removed += before - frame.len();
    }
    progress.report(100.);
    removed
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_join_close_points() {
    let mut frame = Frame::new(vec![
      Point::new(0., 0., 0.),
      Point::new(0.5, 0., 0.),
      Point::new(10., 0., 0.),
      Point::new(10., 0.2, 0.),
      Point::new(0., 0., 0.9),
    ]);
    frame.join_close_points(1.);
    assert_eq!(frame.points, vec![Point::new(0., 0., 0.), Point::new(10., 0., 0.)]);

    let mut empty = Frame::default();
    empty.join_close_points(1.);
    assert!(empty.is_empty());
  }

  #[test]
  fn test_capture_join_close_points() {
    let frame = Frame::new(vec![Point::new(0., 0., 0.), Point::new(0., 0., 0.)]);
    let mut capture = Capture::new(100., vec![frame.clone(), frame]);
    assert_eq!(capture.join_close_points(1., &mut NoProgress), 2);
    assert_eq!(capture.frames[1].len(), 1);
  }
}
