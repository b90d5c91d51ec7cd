pub mod checkpoints;
pub mod controller;
pub mod progress;
pub mod scheduler;
pub mod studio;
