pub mod address;
pub mod config;
pub mod dispatch;
pub mod format;
pub mod geo;
pub mod geocode;
pub mod pricing;
pub mod routing;
pub mod store;
pub mod suggest;
pub mod trip;
