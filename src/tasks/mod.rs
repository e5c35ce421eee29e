pub mod network;
pub mod sampler;
