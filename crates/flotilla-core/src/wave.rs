use crate::stage::StageDefinition;
use crate::CoreResult;
use flotilla_config::{load_account_configs, AccountConfig};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Wave grouping handed to the external pipeline construct.
///
/// Pre-production stages deploy first, production stages after them. Which
/// accounts count as production is the caller's call, typically a fixed
/// name-set like `{"prod", "prod-dr"}`.
#[derive(Debug, Clone, Default)]
pub struct WavePlan {
    pub pre_production: Vec<StageDefinition>,
    pub production: Vec<StageDefinition>,
}

impl WavePlan {
    /// Partition resolved account configs by the production name-set.
    /// Relative input order is preserved within each side.
    pub fn partition(accounts: Vec<AccountConfig>, production_names: &HashSet<String>) -> Self {
        let mut plan = WavePlan::default();
        for account in accounts {
            let stage = StageDefinition::from_account(account);
            if production_names.contains(&stage.name) {
                plan.production.push(stage);
            } else {
                plan.pre_production.push(stage);
            }
        }
        plan
    }

    /// Resolve every account configuration in `config_dir` and partition
    /// the result. This is the single entry point pipeline assembly uses.
    pub fn from_config_dir(
        config_dir: &Path,
        production_names: &HashSet<String>,
    ) -> CoreResult<Self> {
        let accounts = load_account_configs(config_dir)?;
        let plan = Self::partition(accounts, production_names);
        info!(
            pre_production = plan.pre_production.len(),
            production = plan.production.len(),
            "Planned deployment waves"
        );
        Ok(plan)
    }

    pub fn total_stages(&self) -> usize {
        self.pre_production.len() + self.production.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_stages() == 0
    }
}
