use crate::all::*;

#[derive(Clone, Debug)]
#[derive(clap::Parser)]
pub struct ParameterSet {
  #[clap(long, default_value = "100")]
  pub frame_rate: f64,

  // Distance tracking, millimeters.
  #[clap(long, default_value = "10")]
  pub distance_threshold: f64,
  // Points of one frame closer than this are the same marker.
  #[clap(long, default_value = "1")]
  pub join_distance: f64,

  // Fragment matching, frames.
  #[clap(long, default_value = "0", allow_hyphen_values = true)]
  pub min_gap: i64,
  #[clap(long, default_value = "5", allow_hyphen_values = true)]
  pub max_gap: i64,
  // Merges stop at `max_deviation_factor * distance_threshold`.
  #[clap(long, default_value = "2")]
  pub max_deviation_factor: f64,
  // Fragments shorter than this are dropped after matching, 0 keeps all.
  #[clap(long, default_value = "0")]
  pub min_length: usize,

  // Gap filling, seconds.
  #[clap(long, default_value = "0.2")]
  pub max_gap_time: f64,
  #[clap(long, default_value = "0.2")]
  pub max_sample_time: f64,

  // Names starting with these are left alone by gap filling and consolidation.
  #[clap(long)]
  pub passthrough_prefix: Vec<String>,
}

impl ParameterSet {
  pub fn max_deviation(&self) -> f64 {
    self.max_deviation_factor * self.distance_threshold
  }

  pub fn passthrough(&self) -> Passthrough {
    Passthrough::new(self.passthrough_prefix.clone())
  }

  pub fn validate(&self) -> Result<()> {
    if self.frame_rate <= 0. {
      bail!("Frame rate must be positive.");
    }
    if self.distance_threshold < 0. {
      bail!("Distance threshold must not be negative.");
    }
    if self.min_gap > self.max_gap {
      bail!("Min gap {} is larger than max gap {}.", self.min_gap, self.max_gap);
    }
    if self.max_gap_time < 0. || self.max_sample_time < 0. {
      bail!("Gap filling times must not be negative.");
    }
    Ok(())
  }
}

// Same defaults as on the command line.
impl Default for ParameterSet {
  fn default() -> ParameterSet {
    use clap::Parser;
    ParameterSet::parse_from(["trajectorize"])
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  #[test]
  fn test_defaults() {
    let p = ParameterSet::default();
    assert_eq!(p.distance_threshold, 10.);
    assert_eq!(p.max_deviation(), 20.);
    assert_eq!((p.min_gap, p.max_gap), (0, 5));
    assert!(p.passthrough_prefix.is_empty());
    assert!(p.validate().is_ok());
  }

  #[test]
  fn test_parse() {
    let p = ParameterSet::parse_from([
      "trajectorize", "--min-gap", "-1", "--max-gap", "3",
      "--passthrough-prefix", "Hd", "--passthrough-prefix", "Ref",
    ]);
    assert_eq!((p.min_gap, p.max_gap), (-1, 3));
    assert!(p.passthrough().matches("Hd2"));
    assert!(p.passthrough().matches("Ref"));
    assert!(!p.passthrough().matches("UBL1"));

    let p = ParameterSet::parse_from(["trajectorize", "--min-gap", "4", "--max-gap", "3"]);
    assert!(p.validate().is_err());
  }
}
