pub mod alert_handle;
pub mod sensor_handle;
pub mod stream_handle;

pub use alert_handle::*;
pub use sensor_handle::*;
pub use stream_handle::*;
