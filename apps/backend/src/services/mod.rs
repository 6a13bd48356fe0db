pub mod auth;
pub mod generator;
pub mod supply;
