// * Reel-Harvest
// * Resilient movie and series metadata harvester: structured data first, DOM fallbacks
// * second, every field normalized into a typed record and stored in SQLite.

pub mod config;
pub mod engine;
pub mod network;
pub mod ops;
pub mod persistence;
pub mod refinery;
