pub mod gateway;
pub mod memory;
pub mod pool;
pub mod postgres;

pub use gateway::Gateway;
pub use memory::MemoryGateway;
pub use pool::create_pool;
pub use postgres::PgGateway;
