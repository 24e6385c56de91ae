pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod payments;
pub mod usecases;
