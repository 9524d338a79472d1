//! Multi-step alert investigation.
//!
//! Plans pick the steps per detector type, prompts carry the transcript from
//! step to step, and the orchestrator runs the chain against a
//! `ReasoningService` with retries, timeouts and bailout.

pub mod frameworks;
pub mod orchestrator;
pub mod parse;
pub mod plan;
pub mod prompts;

pub use frameworks::{framework_prompt, select_frameworks, Framework, FRAMEWORKS};
pub use orchestrator::{alert_status_for, running_confidence, ChainOrchestrator, ChainPolicy};
pub use plan::plan_for;
pub use prompts::{build_prompt, ChainContext};
