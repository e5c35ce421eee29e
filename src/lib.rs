// ECG Sentinel — Analysis Core
//
// Hardware-independent half of the firmware: single-lead ECG conditioning,
// beat detection, rate/HRV analysis and the panic-signature state machine.
// The binary wires this to the AD8232 front end and the network on the
// ESP32, or to a recorded capture on the host.

pub mod capture;
pub mod config;
pub mod error;
pub mod events;
pub mod monitor;
pub mod outbox;
pub mod pipeline;
pub mod ring;
pub mod schedule;

pub use config::PipelineConfig;
pub use error::{ConfigError, SampleError};
pub use events::{AdcSample, FrontEndReading, PanicAlert, PipelineSnapshot, Telemetry};
pub use monitor::{Monitor, StepOutput};
pub use outbox::Outbox;
pub use pipeline::{AnyDetector, Pipeline, Tick};
