pub mod fetch;
pub mod query_cache;
