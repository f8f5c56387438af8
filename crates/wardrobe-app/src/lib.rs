//! wardrobe-app - application services for the wardrobe catalogue
//!
//! The services own view state (catalogue, builder assignment, saved
//! outfits) and drive the stores behind it, enforcing one in-flight
//! mutation per view and dropping responses for views that were closed.

pub mod config;
pub mod report;
pub mod services;
pub mod telemetry;

pub use config::AppConfig;
pub use services::{
    BusyFlag, BusyGuard, CatalogService, NewItem, OutfitBrowserService, OutfitBuilderService,
    ViewScope, ViewTicket,
};
