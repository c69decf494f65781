pub mod config;
pub mod crawler;
pub mod cutter;
pub mod dtos;
pub mod handlers;
pub mod holds;
pub mod models;
pub mod services;
pub mod startup;
pub mod workers;
