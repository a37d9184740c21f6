pub mod classifier;
pub mod collector;
pub mod detection;
pub mod status;

pub use classifier::{ResignationClassifier, Verdict, assess};
pub use collector::{Candidate, CandidateCollector, CollectionStats, WorkPlan};
pub use detection::{DetectionService, DetectionSummary, LEAGUE_DATA_FILE};
pub use status::{StatusReport, StatusService};
