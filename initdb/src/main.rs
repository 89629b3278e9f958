//! A helper program to create or upgrade the events schema.

use std::env;

use movine::Movine;
use postgres::{Client, NoTls};

use log::{debug, info, initialize_logger, o};

const MIGRATIONS_DIRECTORY: &str = "./migrations";

fn main() {
    dotenv::dotenv().ok();

    let logger = initialize_logger().new(o!("tool" => "initdb"));
    let connection_string = env::var("BACKEND_DB_CONNECTION_STRING").unwrap_or_else(|_| {
        panic!("Invalid or missing environment variable: \"BACKEND_DB_CONNECTION_STRING\"")
    });

    debug!(logger, "Connecting to database...");

    let client = Client::connect(&connection_string, NoTls).expect("could not connect to database");

    let mut movine = Movine::new(client);
    movine.set_migration_dir(MIGRATIONS_DIRECTORY);

    if movine.status().is_err() {
        debug!(logger, "Initializing movine...");
        movine.initialize().expect("failed to initialize movine")
    }

    debug!(logger, "Running migrations..."; "directory" => MIGRATIONS_DIRECTORY);
    movine.up().expect("failed to run migrations");

    info!(logger, "Schema is up to date.");
}
