mod capabilities;
mod capture;
mod session;

pub use capabilities::{ActionFallback, ApiFeature, RuntimeCapabilities};
pub use capture::{CaptureDescriptor, CaptureMode, CaptureTarget};
pub use session::{ConnectionSession, SessionCounters, SessionState};
