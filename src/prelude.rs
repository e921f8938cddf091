/*

This is intended to quickly import commonly used modules across
the kd-tracer crate.

@date: 8 Nov, 2025
*/

// Almost every module uses tracing, so I'm adding it here
pub use tracing::{info, error, warn, debug};
pub use smart_default::SmartDefault;
pub use serde::{Deserialize};

pub use crate::numeric::{*};
