#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]
#![forbid(unsafe_code)]

pub mod box_office;
pub mod checkout;
pub mod entities;
pub mod error;
pub mod framework;
pub mod inventory;
pub mod partners;
pub mod repository;

pub use box_office::BoxOffice;
pub use error::{Error, ErrorKind, Result};
