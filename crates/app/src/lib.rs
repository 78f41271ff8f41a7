#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod log;

mod clock;
mod error;
mod notification;
mod ongoing;
mod service;
mod session_store;
mod settings;
mod timer;

pub use clock::*;
pub use error::*;
pub use notification::*;
pub use ongoing::*;
pub use service::*;
pub use session_store::*;
pub use settings::*;
pub use timer::*;
