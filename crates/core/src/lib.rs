pub mod config;
pub mod directive;
pub mod discover;
pub mod error;
pub mod feedback;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod generate;
pub mod normalize;
pub mod plan;
pub mod prompt;
pub mod session;

pub use config::{CrawlConfig, GenerationConfig, ScribeConfig};
pub use directive::{DirectiveBuilder, GenerationDirective, split_lines, split_list};
#[cfg(feature = "fetch")]
pub use discover::LinkDiscoverer;
pub use discover::{DiscoverConfig, LinkSet, extract_links};
pub use error::{
    ConfigError, CrawlError, FeedbackError, GenerationError, GenerationErrorKind, InputError, Result, ScribeError,
};
#[cfg(feature = "smtp")]
pub use feedback::SmtpFeedbackTransport;
pub use feedback::{FeedbackCategory, FeedbackSubmission, FeedbackTransport, SmtpSettings};
#[cfg(feature = "fetch")]
pub use fetch::FetchConfig;
#[cfg(feature = "fetch")]
pub use generate::OpenAiClient;
pub use generate::{CompletionRequest, CompletionService, Credential, GenerationAdapter, GenerationSettings};
pub use normalize::{GeneratedArtifact, TextStats, normalize};
pub use plan::{LengthBounds, Outline, StructurePlan, WordBudget, plan};
pub use prompt::{PromptLanguage, PromptSynthesizer, RenderedPrompt};
pub use session::{CredentialStatus, Pipeline, Session, View};
