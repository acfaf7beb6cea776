//! Reconciliation of the WSC feeds into one coherent view per station:
//! range planning, timeline merging, statistics, trend, caching and the
//! snapshot pipeline.

pub mod cache;
pub mod merge;
pub mod planner;
pub mod service;
pub mod statistics;
pub mod trend;
