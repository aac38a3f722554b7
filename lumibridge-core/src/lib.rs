pub mod controller;
pub mod error;
pub mod serial;
pub mod settings;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use controller::LightController;
pub use error::Error;
pub use serial::{SerialLink, UartLink};
pub use types::{Command, LedStatus};
