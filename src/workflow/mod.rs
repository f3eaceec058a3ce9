pub mod packing_flow;

pub use packing_flow::PackingFlow;
