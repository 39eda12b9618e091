pub mod accounts;
pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod db;
pub mod errors;
pub mod identity;
pub mod vault;
