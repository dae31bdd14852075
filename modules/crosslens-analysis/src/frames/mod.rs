mod composer;
mod orchestrator;

pub use composer::{FrameComposer, FrameInput};
pub use orchestrator::FrameAnalysisOrchestrator;
