pub mod actions;
pub mod booking;
pub mod config;
pub mod connection;
pub mod db;
pub mod environment;
pub mod errors;
pub mod event;
pub mod normalization;
pub mod routes;
pub mod timestamps;
pub mod urls;
