pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod planner;
pub mod recommend;
pub mod services;
pub mod state;
