// Library root: re-exports all modules so integration tests and the binary
// can reach the tracker's public API.

pub mod app;
pub mod command;
pub mod config;
pub mod db;
pub mod decision;
pub mod error;
pub mod game;
pub mod model;
pub mod persistence;
pub mod roster;
pub mod stats;
pub mod training;
