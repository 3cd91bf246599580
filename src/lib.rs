//! Core library for the asset-content-sync command line application.
//!
//! Reconciles physical-asset records kept in a spreadsheet with the design
//! files held by a content-management service. Remote and local adapters live
//! under [`asset::sync::io`]; [`asset::sync::manager`] ties the pipeline
//! together.

pub mod asset;

pub use asset::sync::{
    Reported, Result, SyncError, Warning, batch, config, content, error, io, manager, mapper,
    model, reconcile, schema,
};
