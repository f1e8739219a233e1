pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod ledger;
pub mod models;
pub mod rate_limit;
pub mod response;
pub mod routes;
pub mod services;
pub mod slug;
pub mod state;
