//! Request handlers, one module per resource

pub mod catalog;
pub mod challan;
pub mod delivery;
pub mod health;
pub mod invoice;
