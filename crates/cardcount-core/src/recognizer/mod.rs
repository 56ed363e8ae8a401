pub mod engine;
pub mod observation;
pub mod timestamp;

pub use engine::{
    CardRecognizer, DEFAULT_THRESHOLD, DEFAULT_WINDOW, RecognizerConfig, RecognizerConfigError,
};
pub use observation::ObservationLog;
pub use timestamp::Timestamp;
