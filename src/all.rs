// NOTE This kind of import-all file isn't a common Rust idiom.

pub use crate::{
  consolidate::*,
  error::*,
  fragment::*,
  frame::*,
  gap_filler::*,
  input::*,
  math::*,
  merger::*,
  parameters::*,
  pipeline::*,
  progress::*,
  track_set::*,
  tracker::*,
  types::*,
};

pub use {
  std::{
    collections::{BTreeMap, HashMap},
    fmt,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
  },
  log::{debug, error, info, warn, LevelFilter},
  nalgebra::DMatrix,
  serde::{Deserialize, Serialize},
  anyhow::{anyhow, bail, Context as AnyhowContext, Result},
};
