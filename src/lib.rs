//! EverQuest-style melee DPS simulator: combat formulas, a seeded fight loop, fight reports,
//! seed sweeps, and a small HTTP service with an anonymous usage log.

pub mod cli;
pub mod combat;
pub mod parallel;
pub mod report;
pub mod server;
pub mod usage;
