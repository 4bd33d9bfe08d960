pub mod job;
pub mod loaders;
pub mod outcome;
pub mod resume;

pub use job::{partition_jobs, Job, JobPartition, JobRecord};
pub use loaders::{load_jobs_from_toml, TomlJobSource};
pub use outcome::{ApplicationOutcome, ApplicationStatus, OutcomeSummary};
pub use resume::{ResumeProfile, ResumeSection};
