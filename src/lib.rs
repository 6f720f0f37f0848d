pub mod chain;
pub mod config;
pub mod db;
pub mod errors;
pub mod intelligence;
pub mod models;
pub mod polymarket;
pub mod services;
