mod dataset;
pub mod domain;

pub use dataset::DatasetMetadata;
pub use domain::{
    AverageWageFactor, CheckRule, DurationCap, InvalidStateCode, MinimumWageSource, ModuleKind,
    MonetaryCheck, OutsideHqThreshold, StateCode, StateRuleBatch, WageAggregate, WageContext,
    WagePeriod, WeeklyBenefitFormula,
};

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

const EMBEDDED_DATASET: &str = include_str!("../../../../data/state-rules-2025.json");

/// Raised when a caller asks for a state the loaded dataset does not cover.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("state '{code}' is not supported")]
pub struct StateNotSupported {
    pub code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RuleStoreError {
    #[error("failed to read rules dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("rules dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rules dataset contains no states")]
    EmptyDataset,
    #[error("invalid rule batch for {state}: {reason}")]
    InvalidBatch { state: String, reason: String },
}

/// Read-only catalog of state rule batches, validated once at load time.
#[derive(Debug, Clone)]
pub struct RuleStore {
    metadata: DatasetMetadata,
    batches: BTreeMap<StateCode, StateRuleBatch>,
}

impl RuleStore {
    /// Loads the dataset compiled into the crate.
    pub fn embedded() -> Result<Self, RuleStoreError> {
        Self::from_json(EMBEDDED_DATASET)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RuleStoreError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| RuleStoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_reader(file)?;
        info!(path = %path.display(), states = store.len(), "loaded state rules dataset");
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RuleStoreError> {
        let raw: dataset::RawDataset = serde_json::from_reader(reader)?;
        let (metadata, batches) = dataset::validate_dataset(raw)?;
        Ok(Self { metadata, batches })
    }

    pub fn from_json(raw: &str) -> Result<Self, RuleStoreError> {
        let raw: dataset::RawDataset = serde_json::from_str(raw)?;
        let (metadata, batches) = dataset::validate_dataset(raw)?;
        Ok(Self { metadata, batches })
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Looks a batch up by state code, case-insensitively.
    pub fn get_state_batch(&self, state_code: &str) -> Result<&StateRuleBatch, StateNotSupported> {
        let not_supported = || StateNotSupported {
            code: state_code.trim().to_ascii_uppercase(),
        };
        let code = StateCode::parse(state_code).map_err(|_| not_supported())?;
        self.batches.get(&code).ok_or_else(not_supported)
    }

    pub fn supported_states(&self) -> impl Iterator<Item = &StateCode> {
        self.batches.keys()
    }

    pub fn batches(&self) -> impl Iterator<Item = &StateRuleBatch> {
        self.batches.values()
    }

    pub fn states_requiring_hours(&self) -> BTreeSet<StateCode> {
        self.states_with_module(ModuleKind::HoursWorked)
    }

    pub fn states_requiring_weeks(&self) -> BTreeSet<StateCode> {
        self.states_with_module(ModuleKind::WeeksWorked)
    }

    pub fn states_by_primary_module(&self) -> BTreeMap<ModuleKind, BTreeSet<StateCode>> {
        let mut grouped: BTreeMap<ModuleKind, BTreeSet<StateCode>> = BTreeMap::new();
        for batch in self.batches.values() {
            grouped
                .entry(batch.primary_module)
                .or_default()
                .insert(batch.state_code.clone());
        }
        grouped
    }

    fn states_with_module(&self, kind: ModuleKind) -> BTreeSet<StateCode> {
        self.batches
            .values()
            .filter(|batch| batch.has_module(kind))
            .map(|batch| batch.state_code.clone())
            .collect()
    }
}
