//! Portfolio allocation module - holdings weighted by market value.

mod allocation_model;
mod allocation_service;

pub use allocation_model::*;
pub use allocation_service::*;
