pub mod assistant;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod generator;
pub mod oee;
pub mod order_generator;
pub mod production_generator;
pub mod report;
pub mod rng;
pub mod seeder;
pub mod store;
pub mod table;
pub mod types;
