pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod turns;

pub use routes::create_router;
