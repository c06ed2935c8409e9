pub mod milestone;

pub use milestone::{
    GenerationRequest, Milestone, MilestoneIssue, MilestoneSet, EXPECTED_MILESTONES,
    REQUIRED_FIELDS_MESSAGE,
};
