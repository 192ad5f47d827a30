//! Native model representations.

pub mod gbdt;
