pub mod arguments;
pub mod http_client;
pub mod oneinch_api;
pub mod token_catalog;
