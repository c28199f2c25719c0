pub mod classifier;
pub mod http_client_factory;
pub mod news_feed;
pub mod persistence;
pub mod price_api;
