extern crate dotenv;

use std::env;
use std::net::SocketAddr;

use dotenv::dotenv;
use lazy_static::lazy_static;
use tokio::net::TcpListener;

use crate::data::db::{self, DB_URL};
use crate::data::repo::rating_repo::RatingRepo;
use crate::rpc::rating_handler::RatingHandler;
use crate::rpc::MAX_WORKERS;
use crate::utils::env_utils::get_env_or;
use crate::utils::result_utils::FatalValueMapper;
use crate::utils::version::VERSION_STRING;

mod data;
mod rpc;
mod utils;

static LISTEN_ADDR_KEY: &str = "LISTEN_ADDR";
static DEFAULT_LISTEN_ADDR: &str = "[::]:50051";
static RUST_LOG_KEY: &str = "RUST_LOG";

lazy_static! {
    static ref LISTEN_ADDR: SocketAddr = get_env_or(LISTEN_ADDR_KEY, DEFAULT_LISTEN_ADDR)
        .parse()
        .map_value_or_exit(format!("Can not parse {}, exiting", LISTEN_ADDR_KEY));
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();
    log::info!("Rating service {}", VERSION_STRING);

    let pool = db::open(&**DB_URL, MAX_WORKERS as u32)
        .await
        .map_value_or_exit(format!("Can not open db {}", *DB_URL));
    log::info!("Database {} is ready.", *DB_URL);

    let listener = TcpListener::bind(*LISTEN_ADDR)
        .await
        .map_value_or_exit(format!("Can not bind {}", *LISTEN_ADDR));
    log::info!("Rating service is listening on {}.", *LISTEN_ADDR);

    let handler = RatingHandler::new(RatingRepo::new(pool.clone()), MAX_WORKERS);
    rpc::serve(listener, handler, shutdown_signal())
        .await
        .map_value_or_exit("Rating service failed".to_string());

    pool.close().await;
    log::info!("Exiting");
}

fn init_logging() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = env::var(RUST_LOG_KEY) {
        builder.parse_filters(&filters);
    }
    builder.init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Can not listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Interrupt received, shutting down.");
}
