//! The aggregated example pool.
use crate::{error::MimicError, Frame, RolloutEntry};
use anyhow::Result;
use log::{info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A labeled steering example persisted in a [`DatasetPool`].
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledExample {
    /// Path of the frame image.
    pub path: PathBuf,

    /// Collection run the example belongs to.
    pub run_id: u32,

    /// Timestep index within that run.
    pub t: usize,

    /// Reference steering label.
    pub steer: f32,
}

impl LabeledExample {
    /// Loads the observation frame of this example.
    pub fn load_frame(&self) -> Result<Frame> {
        Frame::load(&self.path)
    }
}

/// An append-only pool of labeled examples, one PNG file per example.
///
/// The file name carries the label: `expert_{run_id}_{t}_{steer}.png`.
/// Distinct run ids keep examples from different collection runs from
/// colliding, so the pool grows monotonically across runs; nothing ever
/// removes or rewrites an example.
pub struct DatasetPool {
    dir: PathBuf,
}

impl DatasetPool {
    /// Opens the pool at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    /// The pool directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends the given entries under `run_id` and returns how many were
    /// written.
    pub fn append(&self, run_id: u32, entries: &[RolloutEntry]) -> Result<usize> {
        for e in entries {
            let name = format!("expert_{}_{}_{:.6}.png", run_id, e.t, e.expert_steer);
            e.frame.save(self.dir.join(name))?;
        }
        info!("Appended {} examples to {:?}", entries.len(), self.dir);
        Ok(entries.len())
    }

    /// Number of examples in the pool.
    pub fn len(&self) -> Result<usize> {
        Ok(self.examples()?.len())
    }

    /// Returns true if the pool holds no examples.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Fails with [`MimicError::EmptyPool`] when the pool is empty.
    pub fn ensure_non_empty(&self) -> Result<()> {
        if self.is_empty()? {
            return Err(MimicError::EmptyPool(self.dir.clone()).into());
        }
        Ok(())
    }

    /// Lists the examples in the pool, sorted by file name.
    ///
    /// Files that do not parse as examples are skipped with a warning.
    pub fn examples(&self) -> Result<Vec<LabeledExample>> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|e| e.path())
            .collect();
        paths.sort();

        let mut examples = Vec::with_capacity(paths.len());
        for path in paths {
            match parse_example(&path) {
                Some(ex) => examples.push(ex),
                None => warn!("Skipping non-example file {:?}", path),
            }
        }
        Ok(examples)
    }
}

fn parse_example(path: &Path) -> Option<LabeledExample> {
    if path.extension()?.to_str()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let rest = stem.strip_prefix("expert_")?;
    let mut fields = rest.splitn(3, '_');
    let run_id = fields.next()?.parse().ok()?;
    let t = fields.next()?.parse().ok()?;
    let steer = fields.next()?.parse().ok()?;
    Some(LabeledExample {
        path: path.to_path_buf(),
        run_id,
        t,
        steer,
    })
}
