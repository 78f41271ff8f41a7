#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod exercise;
mod phase;
mod progress;
mod service;
mod user;
mod value;
mod workout;

pub use error::*;
pub use exercise::*;
pub use phase::*;
pub use progress::*;
pub use service::*;
pub use user::*;
pub use value::*;
pub use workout::*;
