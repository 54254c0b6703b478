#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;

pub mod configuration;
pub mod connection_pool;
pub mod controllers;
pub mod honeycomb;
pub mod media;
pub mod models;
pub mod schema;
pub mod util;
