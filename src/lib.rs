pub mod audit;
pub mod backtester;
pub mod broker;
pub mod config;
pub mod data_feed;
pub mod dedupe;
pub mod factory;
pub mod filters;
pub mod report;
pub mod risk;
pub mod strategy;
pub mod types;
