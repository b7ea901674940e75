use crate::all::*;

// Reads a capture stored as JSON lines. Each line is either a header
// `{"frameRate": 100.0}` or a frame `{"points": [[x, y, z], ...]}`.
pub struct Input {
  reader: BufReader<File>,
  line: String,
  line_number: usize,
}

pub enum InputData {
  FrameRate(f64),
  Frame(Frame),
}

impl Input {
  pub fn new(path: &Path) -> Result<Input> {
    let file = File::open(path)
      .context(format!("Failed to open capture {}.", path.display()))?;
    Ok(Input {
      reader: BufReader::new(file),
      line: String::new(),
      line_number: 0,
    })
  }

  // Not using `impl Iterator` to allow returning `Result`.
  // End of data is signaled by `Result::Ok(Option::None)`.
  pub fn next(&mut self) -> Result<Option<InputData>> {
    loop {
      self.line.clear();
      self.line_number += 1;
      match self.reader.read_line(&mut self.line) {
        Ok(0) => return Ok(None),
        Err(err) => bail!("Failed to read line {}. {}", self.line_number, err),
        _ => {},
      }
      if self.line.trim().is_empty() { continue }
      let value: serde_json::Value = serde_json::from_str(&self.line)
        .context(format!("Input::next JSON deserialization failed for line {}: {}", self.line_number, self.line))?;
      let value = value.as_object()
        .ok_or(anyhow!("JSONL line {} is not a map.", self.line_number))?;

      if let Some(points) = value.get("points") {
        let points = points.as_array()
          .ok_or(anyhow!("Points field on line {} is not an array.", self.line_number))?;
        let points = points.iter()
          .map(|p| parse_point(p).context(format!("Bad point on line {}.", self.line_number)))
          .collect::<Result<Vec<_>>>()?;
        return Ok(Some(InputData::Frame(Frame::new(points))));
      }
      else if let Some(frame_rate) = value.get("frameRate") {
        let frame_rate = frame_rate.as_f64()
          .ok_or(anyhow!("Frame rate is not a number."))?;
        return Ok(Some(InputData::FrameRate(frame_rate)));
      }
      else {
        warn!("Unrecognized data on line {}: {}", self.line_number, self.line.trim());
        continue;
      }
    }
  }

  // Reads the whole capture. The frame rate in the file, if any, overrides
  // `default_frame_rate`.
  pub fn read_capture(path: &Path, default_frame_rate: f64) -> Result<Capture> {
    let mut input = Input::new(path)?;
    let mut capture = Capture::new(default_frame_rate, vec![]);
    while let Some(data) = input.next()? {
      match data {
        InputData::FrameRate(frame_rate) => capture.frame_rate = frame_rate,
        InputData::Frame(frame) => capture.frames.push(frame),
      }
    }
    if capture.frame_rate <= 0. {
      bail!("Frame rate must be positive, got {}.", capture.frame_rate);
    }
    Ok(capture)
  }
}

fn parse_point(value: &serde_json::Value) -> Result<Point> {
  let v = value.as_array().ok_or(anyhow!("Point is not an array."))?;
  if v.len() != 3 {
    bail!("Point must have 3 coordinates, got {}.", v.len());
  }
  let mut p = Point::zeros();
  for i in 0..3 {
    p[i] = v[i].as_f64().ok_or(anyhow!("Coordinate is not a number."))?;
  }
  Ok(p)
}

pub fn write_capture(path: &Path, capture: &Capture) -> Result<()> {
  let file = File::create(path)
    .context(format!("Failed to create file {}.", path.display()))?;
  let mut writer = BufWriter::new(file);
  writeln!(writer, "{}", serde_json::json!({ "frameRate": capture.frame_rate }))?;
  for frame in &capture.frames {
    let points: Vec<[f64; 3]> = frame.points.iter().map(to_array).collect();
    writeln!(writer, "{}", serde_json::json!({ "points": points }))?;
  }
  writer.flush()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_point() {
    let v: serde_json::Value = serde_json::from_str("[1, 2.5, -3]").unwrap();
    assert_eq!(parse_point(&v).unwrap(), Point::new(1., 2.5, -3.));
    let v: serde_json::Value = serde_json::from_str("[1, 2]").unwrap();
    assert!(parse_point(&v).is_err());
    let v: serde_json::Value = serde_json::from_str("[1, \"a\", 2]").unwrap();
    assert!(parse_point(&v).is_err());
  }

  #[test]
  fn test_capture_file() {
    let path = std::env::temp_dir().join(format!("trajectorize-input-{}.jsonl", std::process::id()));
    let capture = Capture::new(120., vec![
      Frame::new(vec![Point::new(0., 1., 2.), Point::new(3., 4., 5.)]),
      Frame::default(),
    ]);
    write_capture(&path, &capture).unwrap();
    let read = Input::read_capture(&path, 100.).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(read.frame_rate, 120.);
    assert_eq!(read.frames, capture.frames);
  }
}
