//! Types shared between the launcher client core and its front ends.

pub mod catalog;
pub mod domain;
pub mod error;
pub mod orientation;
pub mod protocol;
