//! Services over the clinic store.
//!
//! Each service wraps a [`shared::ClinicContext`] and runs every operation as a single read
//! or a single unit-of-work write.

pub mod action_items;
pub mod encounters;
pub mod patients;
pub mod providers;
pub mod referrals;
pub mod roster;
pub mod shared;
