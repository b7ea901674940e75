// Generates captures of smoothly moving markers, for trying out parameters
// and for tests.

use crate::all::*;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

#[derive(Clone, Debug)]
#[derive(clap::Parser)]
pub struct SyntheticParameters {
  #[clap(long, default_value = "10")]
  pub markers: usize,
  #[clap(long, default_value = "1000")]
  pub frames: usize,
  // Distance between marker starting positions, millimeters.
  #[clap(long, default_value = "200")]
  pub spacing: f64,
  // Maximum speed, millimeters per frame.
  #[clap(long, default_value = "1")]
  pub max_speed: f64,
  // Maximum change of velocity per frame and axis.
  #[clap(long, default_value = "0.05")]
  pub max_acceleration: f64,
  // Per frame and marker probability that the marker disappears.
  #[clap(long, default_value = "0")]
  pub dropout_probability: f64,
  #[clap(long, default_value = "3")]
  pub max_dropout: usize,
  // Per frame probability of an extra point unrelated to any marker.
  #[clap(long, default_value = "0")]
  pub spurious_probability: f64,
  #[clap(long, default_value = "0")]
  pub seed: u64,
}

struct Marker {
  position: Vector3d,
  velocity: Vector3d,
  missing_for: usize,
}

pub fn generate(p: &SyntheticParameters, frame_rate: f64) -> Capture {
  let mut rng = Xoshiro256PlusPlus::seed_from_u64(p.seed);
  let mut markers: Vec<Marker> = (0..p.markers).map(|i| Marker {
    position: Vector3d::new(
      i as f64 * p.spacing,
      rng.gen_range(-0.1..0.1) * p.spacing,
      rng.gen_range(-0.1..0.1) * p.spacing,
    ),
    velocity: Vector3d::zeros(),
    missing_for: 0,
  }).collect();

  let mut frames = Vec::with_capacity(p.frames);
  for _ in 0..p.frames {
    let mut points = vec![];
    for marker in markers.iter_mut() {
      if p.max_acceleration > 0. {
        for i in 0..3 {
          marker.velocity[i] += rng.gen_range(-p.max_acceleration..p.max_acceleration);
        }
      }
      let speed = marker.velocity.norm();
      if speed > p.max_speed {
        marker.velocity *= p.max_speed / speed;
      }
      marker.position += marker.velocity;

      if marker.missing_for > 0 {
        marker.missing_for -= 1;
        continue;
      }
      if p.max_dropout > 0 && p.dropout_probability > 0. && rng.gen_bool(p.dropout_probability) {
        marker.missing_for = rng.gen_range(1..=p.max_dropout) - 1;
        continue;
      }
      points.push(marker.position);
    }
    let extent = p.spacing * p.markers as f64;
    if extent > 0. && p.spurious_probability > 0. && rng.gen_bool(p.spurious_probability) {
      points.push(Vector3d::new(
        rng.gen_range(0.0..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
      ));
    }
    points.shuffle(&mut rng);
    frames.push(Frame::new(points));
  }
  Capture::new(frame_rate, frames)
}
