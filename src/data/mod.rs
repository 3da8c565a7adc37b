pub mod store;
pub mod trades;
