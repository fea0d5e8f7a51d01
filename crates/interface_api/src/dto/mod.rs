//! Request and response bodies

pub mod challan;
pub mod delivery;
pub mod invoice;
