use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::demographics::{BlockAxis, BlockLayout, Granularity};
use crate::error::{BanzhafError, LayoutError};
use crate::hierarchy::{Hierarchy, Member};

pub const BUILTIN_ESTIMATOR_CONFIG: &str = include_str!("data/estimator_config.json");
pub const BUILTIN_MEMBER_TABLE: &str = include_str!("data/electoral_college.json");

pub const ESTIMATOR_CONFIG_ENV: &str = "BANZHAF_CONFIG_PATH";
pub const MEMBER_TABLE_ENV: &str = "BANZHAF_MEMBERS_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {what} from {path:?}: {source}")]
    ReadFailed {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("mode {mode} cannot run with {axes} block axes")]
    ModeMismatch { mode: Granularity, axes: usize },
    #[error("share tolerance must lie in [0, 1), got {0}")]
    InvalidTolerance(f64),
    #[error("invalid block axes: {0}")]
    InvalidLayout(#[from] LayoutError),
    #[error("invalid member table: {0}")]
    InvalidMembers(#[from] BanzhafError),
}

fn read_file(what: &'static str, path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        what,
        path: path.to_path_buf(),
        source,
    })
}

/// Run parameters for one estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    trials: u64,
    mode: Granularity,
    seed: u64,
    workers: usize,
    share_tolerance: f64,
    axes: Vec<BlockAxis>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            trials: 2_000,
            mode: Granularity::Flat,
            seed: 0,
            workers: 1,
            share_tolerance: 1e-6,
            axes: Vec::new(),
        }
    }
}

impl EstimatorConfig {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_ESTIMATOR_CONFIG)
            .expect("builtin estimator config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EstimatorConfig =
            serde_json::from_str(json).map_err(|source| ConfigError::Parse {
                what: "estimator config",
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_str(&read_file("estimator config", path)?)
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn mode(&self) -> Granularity {
        self.mode
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn workers(&self) -> usize {
        self.workers.max(1)
    }

    pub fn share_tolerance(&self) -> f64 {
        self.share_tolerance
    }

    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Switches granularity; explicit axes belonging to another mode are dropped.
    pub fn with_mode(mut self, mode: Granularity) -> Self {
        if !mode.accepts_axes(self.axes.len()) {
            self.axes.clear();
        }
        self.mode = mode;
        self
    }

    pub fn with_axes(mut self, axes: Vec<BlockAxis>) -> Result<Self, ConfigError> {
        self.axes = axes;
        self.validate()?;
        Ok(self)
    }

    /// Block layout for the configured mode: explicit axes, else the builtin one.
    pub fn layout(&self) -> BlockLayout {
        if self.axes.is_empty() {
            self.mode.default_layout()
        } else {
            BlockLayout::new(self.axes.clone())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.axes.is_empty() && !self.mode.accepts_axes(self.axes.len()) {
            return Err(ConfigError::ModeMismatch {
                mode: self.mode,
                axes: self.axes.len(),
            });
        }
        if !(0.0..1.0).contains(&self.share_tolerance) {
            return Err(ConfigError::InvalidTolerance(self.share_tolerance));
        }
        BlockLayout::new(self.axes.clone()).check()?;
        Ok(())
    }
}

/// Member weights and populations, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberTable {
    members: Vec<Member>,
}

impl MemberTable {
    /// US electoral college: 2010 apportionment with 2019 population estimates.
    ///
    /// Alabama carries its apportioned 9 votes, so the body totals 538 and
    /// the threshold is 269.
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_MEMBER_TABLE).expect("builtin member table should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            what: "member table",
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_str(&read_file("member table", path)?)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn into_hierarchy(self) -> Result<Hierarchy, ConfigError> {
        Ok(Hierarchy::new(self.members)?)
    }
}

fn load_from_env<T, F>(env_var: &str, what: &'static str, load: F, builtin: fn() -> T) -> T
where
    F: Fn(&Path) -> Result<T, ConfigError>,
{
    if let Some(path) = env::var(env_var).ok().map(PathBuf::from) {
        match load(&path) {
            Ok(value) => {
                tracing::info!(
                    target: "banzhaf::config",
                    path = %path.display(),
                    what,
                    "config.loaded=file"
                );
                return value;
            }
            Err(err) => {
                tracing::warn!(
                    target: "banzhaf::config",
                    path = %path.display(),
                    what,
                    error = %err,
                    "config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "banzhaf::config", what, "config.loaded=builtin");
    builtin()
}

/// Estimator config from `BANZHAF_CONFIG_PATH`, falling back to the builtin.
pub fn load_estimator_config_from_env() -> EstimatorConfig {
    load_from_env(
        ESTIMATOR_CONFIG_ENV,
        "estimator config",
        EstimatorConfig::from_file,
        EstimatorConfig::builtin,
    )
}

/// Member table from `BANZHAF_MEMBERS_PATH`, falling back to the builtin.
pub fn load_member_table_from_env() -> MemberTable {
    load_from_env(
        MEMBER_TABLE_ENV,
        "member table",
        MemberTable::from_file,
        MemberTable::builtin,
    )
}
