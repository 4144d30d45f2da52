pub mod classifier;
pub mod clock;
pub mod config;
pub mod counters;
pub mod directory;
pub mod helpers;
pub mod moderation;
pub mod permits;
pub mod platform;
pub mod sanction_log;
pub mod sanctions;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
