pub mod event;
pub mod similarity;
pub mod clustering;
pub mod ordering;
pub mod frequency;
pub mod template;
pub mod preprocess;
pub mod config;
pub mod miner;
pub mod input;
pub mod report;

pub use config::{Config, ConfigError, FreqThresholdStrategy, PartialConfig, SortingStrategy};
pub use event::{LogEvent, PLACEHOLDER};
pub use miner::TemplateMiner;
