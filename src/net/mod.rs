pub mod mqtt;
pub mod telegram;
pub mod wifi;
