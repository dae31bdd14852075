pub mod context;
pub mod extraction;
pub mod frames;
pub mod model;
pub mod normalize;
pub mod orientation;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use context::ContextBuilder;
pub use extraction::{extractor_from_config, ArticleExtractor, BrowserlessExtractor, ChromeExtractor};
pub use frames::{FrameAnalysisOrchestrator, FrameComposer, FrameInput};
pub use model::{OpenAiModel, StructuredModel};
pub use normalize::{clean_list, normalize_query};
pub use orientation::OrientationRegistry;
