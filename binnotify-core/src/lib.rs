//! Core types and run wiring for the bin-notifier collection reminder.

/// Date matching and N-weekly rotation arithmetic.
pub mod dates;
/// Decides which messages a location should produce for tomorrow.
pub mod engine;
/// Small text helpers shared by the HTML-scraping providers.
pub mod html;
/// Domain models shared by scrapers, notifiers, and the engine.
pub mod model;
/// Registry for plugging council-specific scrapers into a run.
pub mod plugin;
/// Traits describing the scraper and notifier collaborators.
pub mod ports;
/// Run orchestrator used by the binary.
pub mod service;

pub use dates::*;
pub use engine::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use service::*;
