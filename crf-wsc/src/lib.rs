pub mod error;
pub mod historical;
pub mod model;
pub mod realtime;
pub mod source;
pub mod station;
pub mod window;
