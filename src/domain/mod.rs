pub mod errors;
pub mod indicators;
pub mod instrument;
pub mod news;
pub mod ports;
pub mod price;
pub mod rating;
pub mod repositories;
