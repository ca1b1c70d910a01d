pub mod event;
pub mod scheduler;
pub mod show;
