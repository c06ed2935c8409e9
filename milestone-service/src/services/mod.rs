pub mod generator;
pub mod metrics;
pub mod prompt;
pub mod providers;

pub use generator::MilestoneGenerator;
pub use metrics::{get_metrics, init_metrics};
pub use prompt::PromptTemplate;
