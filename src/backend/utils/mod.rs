pub mod crypto;
pub mod guards;
pub mod log;
pub mod rate_limit;
pub mod time;
