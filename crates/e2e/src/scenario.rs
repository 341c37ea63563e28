//! Per-test state shared by API setup and UI verification

use std::path::Path;

use lockstep_common::{MentalModel, TestData};
use tracing::info;

use crate::config::HarnessConfig;
use crate::error::E2eResult;
use crate::matcher::Matcher;

/// One test's mental model, test data and configuration.
///
/// Drivers that create fixtures write into [`Scenario::model_mut`]; UI and API
/// checks read back through [`Scenario::expect`], so both channels work from
/// the same expectations.
#[derive(Debug)]
pub struct Scenario {
    model: MentalModel,
    data: TestData,
    config: HarnessConfig,
}

impl Scenario {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            model: MentalModel::new(),
            data: TestData::new(),
            config,
        }
    }

    /// Load configuration (with env overrides) and any test data defaults it names
    pub fn from_config_file(path: &Path) -> E2eResult<Self> {
        let config = HarnessConfig::load(path)?.apply_env()?;

        if let Some(defaults) = &config.defaults_path {
            TestData::load_defaults(defaults)?;
        }

        info!("Scenario configured from {}", path.display());
        Ok(Self::new(config))
    }

    /// Matcher for `collection_key` using the configured retry policy
    pub fn expect(&mut self, collection_key: &str) -> Matcher {
        Matcher::with_policy(&mut self.model, collection_key, self.config.retry)
    }

    pub fn model(&self) -> &MentalModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut MentalModel {
        &mut self.model
    }

    pub fn data(&self) -> &TestData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut TestData {
        &mut self.data
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }
}
