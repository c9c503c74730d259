pub mod actions;
pub mod error;
pub mod listing;
pub mod model;
pub mod page;
pub mod store;
pub mod urls;
