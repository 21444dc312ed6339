pub mod channel;
pub mod rate_limit;
