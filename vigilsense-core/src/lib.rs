pub mod error;
pub mod frame;
pub mod hazard;
pub mod presence;
pub mod sensor;
pub mod telemetry;

pub use error::Error;

pub type Result<T> = core::result::Result<T, Error>;
