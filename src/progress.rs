use crate::all::*;

use std::time::{Duration, Instant};

// Progress reporting and cooperative cancellation for long-running stages.
// Stages poll `is_cancelled()` at their check points and return whatever
// they have committed so far. Cancellation is not an error.
pub trait Progress {
  fn report(&mut self, percent: f64);
  fn is_cancelled(&self) -> bool;

  fn set_label(&mut self, _label: &str) {}
}

pub struct NoProgress;

impl Progress for NoProgress {
  fn report(&mut self, _percent: f64) {}

  fn is_cancelled(&self) -> bool {
    false
  }
}

// Logs at every `LOG_STEP` percent.
const LOG_STEP: f64 = 10.;

pub struct LogProgress {
  label: String,
  last_logged: Option<f64>,
  deadline: Option<Instant>,
}

impl LogProgress {
  pub fn new(time_limit: Option<Duration>) -> LogProgress {
    LogProgress {
      label: String::new(),
      last_logged: None,
      deadline: time_limit.map(|d| Instant::now() + d),
    }
  }
}

impl Progress for LogProgress {
  fn report(&mut self, percent: f64) {
    let step = (percent / LOG_STEP).floor() * LOG_STEP;
    if self.last_logged.map_or(true, |x| step > x) {
      self.last_logged = Some(step);
      debug!("{}: {:.0}%", self.label, step);
    }
  }

  fn is_cancelled(&self) -> bool {
    self.deadline.map_or(false, |d| Instant::now() >= d)
  }

  fn set_label(&mut self, label: &str) {
    info!("{}", label);
    self.label = label.to_string();
    self.last_logged = None;
  }
}
