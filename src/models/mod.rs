pub mod job;
pub mod studio;
