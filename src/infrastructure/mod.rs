//! 基础设施层
//!
//! 只暴露能力，不包含业务规则。

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};
