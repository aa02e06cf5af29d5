//! Run storage API.
//!
//! Layout: `<root>/<run_id>/manifest.json` plus one `<unit>.jsonl` file of
//! augmented samples per analyzed unit.

use crate::types::{AugmentedSample, RunManifest};
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn for_config(config_path: &Path) -> ResultsResult<Self> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "config path has no parent directory".to_string(),
            })?;
        Self::new(config_dir.join(".coolwatch").join("runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    fn unit_path(&self, run_id: &str, unit: &str) -> ResultsResult<PathBuf> {
        if unit.is_empty() || unit.contains(['/', '\\']) || unit == "." || unit == ".." {
            return Err(ResultsError::InvalidPath {
                message: format!("unit key '{unit}' is not a valid file name"),
            });
        }
        Ok(self.run_dir(run_id).join(format!("{unit}.jsonl")))
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    pub fn save_run<'a, I>(&self, manifest: &RunManifest, units: I) -> ResultsResult<()>
    where
        I: IntoIterator<Item = (&'a str, &'a [AugmentedSample])>,
    {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join("manifest.json"), manifest_json)?;

        for (unit, rows) in units {
            let mut content = String::new();
            for row in rows {
                content.push_str(&serde_json::to_string(row)?);
                content.push('\n');
            }
            fs::write(self.unit_path(&manifest.run_id, unit)?, content)?;
        }

        tracing::debug!(run_id = %manifest.run_id, "run saved");
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_unit(&self, run_id: &str, unit: &str) -> ResultsResult<Vec<AugmentedSample>> {
        let path = self.unit_path(run_id, unit)?;

        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: format!("{run_id}/{unit}"),
            });
        }

        let content = fs::read_to_string(path)?;
        let mut rows = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row = serde_json::from_str(line).map_err(|e| ResultsError::InvalidRecord {
                line: idx + 1,
                message: e.to_string(),
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// All stored runs for a plant, oldest first.
    pub fn list_runs(&self, plant_name: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().to_string();
            if let Ok(manifest) = self.load_manifest(&run_id) {
                if manifest.plant_name == plant_name {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}
