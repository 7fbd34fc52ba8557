pub mod forecast;
pub mod observation;
pub mod serialize_timestamp;

pub use forecast::*;
pub use observation::*;
