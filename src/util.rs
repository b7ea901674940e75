pub fn format_log(
  buf: &mut env_logger::fmt::Formatter,
  record: &log::Record,
) -> std::io::Result<()> {
  use std::io::Write;
  let mut style = buf.style();
  use env_logger::fmt::Color::*;
  use log::Level::*;
  style.set_color(match record.level() {
    Error => Red,
    Warn => Yellow,
    Info => Green,
    Debug => Magenta,
    Trace => Blue,
  });

  // Library modules only, the binary logs plain messages.
  let location = match record.file() {
    Some(file) if file.starts_with("src/") && !file.ends_with("main.rs") => {
      format!("{}:{}", file, record.line().unwrap_or(0))
    },
    _ => String::new(),
  };
  let s = format!("{:30}{}", location, record.args());
  writeln!(buf, "{}", style.value(s))
}

pub fn parse_level(s: &str) -> Option<log::LevelFilter> {
  s.parse().ok()
}
