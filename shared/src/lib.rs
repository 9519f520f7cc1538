pub mod data;
pub mod prune;
