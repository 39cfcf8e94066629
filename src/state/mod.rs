//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the Idle / Running(month) / Complete state machine of one crawl
//! - `CrawlTally`: per-crawl counters driven by the coordinator

mod crawl_phase;
mod tally;

// Re-export main types
pub use crawl_phase::CrawlPhase;
pub use tally::CrawlTally;
