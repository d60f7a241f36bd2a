use flotilla_config::{AccountConfig, ConfigValue};
use std::path::PathBuf;

/// One deployable unit of the pipeline: a single account's resolved
/// configuration, ready to be handed to the external stack-construct
/// collaborator.
///
/// The collaborator owns translating the configuration tree into cloud
/// resource definitions; this record only carries the inputs it needs.
#[derive(Debug, Clone)]
pub struct StageDefinition {
    /// Stage name, taken from the account's config name.
    pub name: String,

    /// Path of the account document the configuration came from.
    pub config_path: PathBuf,

    /// Target AWS account id, when the document declares one.
    pub aws_account: Option<String>,

    /// Target AWS region, when the document declares one.
    pub aws_region: Option<String>,

    /// The fully resolved configuration tree.
    pub config: ConfigValue,
}

impl StageDefinition {
    pub fn from_account(account: AccountConfig) -> Self {
        Self {
            name: account.name,
            config_path: account.config_path,
            aws_account: account.aws_account,
            aws_region: account.aws_region,
            config: account.full_config,
        }
    }

    /// Returns `true` when both target account and region are known.
    /// Stages without a full target are still valid records; the stack
    /// collaborator decides how to treat them.
    pub fn has_target(&self) -> bool {
        self.aws_account.is_some() && self.aws_region.is_some()
    }
}
