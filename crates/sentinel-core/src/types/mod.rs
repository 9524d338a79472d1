//! Data model shared by every Sentinel crate.

pub mod alert;
pub mod competitive;
pub mod content;
pub mod detector;
pub mod feedback;
pub mod investigation;
pub mod pipeline;
pub mod scope;
pub mod situation;
pub mod snapshot;
pub mod threshold;
pub mod vlds;

pub use alert::{Alert, AlertDraft, AlertFilter, AlertStatus, CooldownKey, Severity};
pub use competitive::{BrandWatch, CompetitiveSnapshot, Competitor};
pub use content::{Channel, ContentItem, ContentScore};
pub use detector::{DetectorClass, DetectorType};
pub use feedback::{AlertFeedback, FeedbackAction, FeedbackTally};
pub use investigation::{
    ChainStatus, Investigation, Recommendation, StepKind, StepResult, StepStatus,
};
pub use pipeline::{CycleSummary, PipelineRun, RunStatus};
pub use scope::Scope;
pub use situation::SituationReport;
pub use snapshot::{metrics, MetricSnapshot};
pub use threshold::{AdjustmentSource, AlertThreshold, ThresholdAuditEntry};
pub use vlds::VldsScore;
