pub mod probe;

pub use probe::{decode_body, HttpProbe, Probe, ProbeError};

#[cfg(test)]
pub use probe::MockProbe;
