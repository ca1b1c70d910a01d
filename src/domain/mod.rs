pub mod evasive;
pub mod lines;
pub mod phase;
