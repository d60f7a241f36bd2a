pub mod error;
pub mod notify;
pub mod stage;
pub mod wave;

pub use error::{CoreError, CoreResult};
pub use notify::{NotificationSettings, DEFAULT_PIPELINE_EVENTS};
pub use stage::StageDefinition;
pub use wave::WavePlan;
