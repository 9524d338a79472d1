//! Seams between the engine and the world around it.

pub mod cancellation;
pub mod collaborators;
pub mod cooldown;
pub mod reasoning;

pub use cancellation::{Cancellable, CancellationToken};
pub use collaborators::{
    CompetitorDiscovery, ContentFeed, ContentScorer, DeliveryOutcome, FeedbackCapture,
    MarketDataProvider, Notification, NotificationDispatcher,
};
pub use cooldown::{CooldownLedger, Reservation};
pub use reasoning::{ReasoningPrompt, ReasoningService};
