//! Per-session state and the actions that change it.
//!
//! A [`Session`] holds everything one user works with: the visible view, the
//! completion-service credential and its verification status, links found by
//! discovery, and the last generated artifact. A fresh session starts with
//! none of these set. Every action recovers at its own boundary: a failed
//! crawl, probe or generation leaves previously stored links and artifacts
//! untouched.

use serde::{Deserialize, Serialize};

#[cfg(feature = "fetch")]
use crate::discover::LinkDiscoverer;
use crate::discover::LinkSet;
use crate::directive::GenerationDirective;
#[cfg(feature = "fetch")]
use crate::error::CrawlError;
use crate::error::GenerationError;
use crate::generate::{Credential, GenerationAdapter};
use crate::normalize::{GeneratedArtifact, normalize};
use crate::prompt::PromptSynthesizer;

/// Panel currently shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Generator,
    Help,
    Feedback,
}

/// Verification state of the session credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    /// No credential has been entered.
    #[default]
    Missing,
    /// Stored but not yet probed, e.g. because the service was unreachable.
    Unverified,
    Valid,
    /// Rejected by the service. Generation is refused until a new one is set.
    Invalid,
}

/// Collaborators shared by all sessions.
#[derive(Debug, Clone)]
pub struct Pipeline {
    #[cfg(feature = "fetch")]
    pub discoverer: LinkDiscoverer,
    pub synthesizer: PromptSynthesizer,
    pub generator: GenerationAdapter,
}

/// State of one user session.
#[derive(Debug, Default)]
pub struct Session {
    view: View,
    credential: Option<Credential>,
    credential_status: CredentialStatus,
    links: LinkSet,
    artifact: Option<GeneratedArtifact>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session to its initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn show(&mut self, view: View) {
        self.view = view;
    }

    pub fn credential_status(&self) -> CredentialStatus {
        self.credential_status
    }

    pub fn links(&self) -> &LinkSet {
        &self.links
    }

    pub fn clear_links(&mut self) {
        self.links = LinkSet::new();
    }

    pub fn artifact(&self) -> Option<&GeneratedArtifact> {
        self.artifact.as_ref()
    }

    /// Stores a credential and probes it against the service.
    ///
    /// A rejected credential is kept with status [`CredentialStatus::Invalid`];
    /// if the probe fails for another reason the credential stays
    /// [`CredentialStatus::Unverified`] and is probed again before generating.
    pub async fn set_credential(&mut self, credential: Credential, pipeline: &Pipeline) -> Result<(), GenerationError> {
        if credential.is_empty() {
            self.credential = None;
            self.credential_status = CredentialStatus::Missing;
            return Err(GenerationError::AuthInvalid);
        }

        self.credential = Some(credential);
        self.credential_status = CredentialStatus::Unverified;
        self.verify(pipeline).await
    }

    async fn verify(&mut self, pipeline: &Pipeline) -> Result<(), GenerationError> {
        let Some(credential) = &self.credential else {
            self.credential_status = CredentialStatus::Missing;
            return Err(GenerationError::AuthInvalid);
        };

        match pipeline.generator.probe(credential).await {
            Ok(()) => {
                self.credential_status = CredentialStatus::Valid;
                Ok(())
            }
            Err(GenerationError::AuthInvalid) => {
                tracing::warn!(key = %credential.fingerprint(), "credential rejected");
                self.credential_status = CredentialStatus::Invalid;
                Err(GenerationError::AuthInvalid)
            }
            Err(other) => {
                tracing::warn!(error = %other, "credential probe failed");
                Err(other)
            }
        }
    }

    /// Discovers links on `url` and adds them to the session cache.
    ///
    /// Returns the links found by this call. On failure the cache is unchanged.
    #[cfg(feature = "fetch")]
    pub async fn discover(&mut self, url: &str, pipeline: &Pipeline) -> Result<LinkSet, CrawlError> {
        match pipeline.discoverer.discover(url).await {
            Ok(found) => {
                self.links.extend(found.clone());
                Ok(found)
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "link discovery failed");
                Err(e)
            }
        }
    }

    /// Runs one generation for `directive` and replaces the stored artifact.
    ///
    /// Refused with [`GenerationError::AuthInvalid`] before any service call
    /// when no valid credential is present. On any failure the previous
    /// artifact is kept.
    pub async fn generate(
        &mut self,
        directive: &GenerationDirective,
        pipeline: &Pipeline,
    ) -> Result<&GeneratedArtifact, GenerationError> {
        match self.credential_status {
            CredentialStatus::Missing | CredentialStatus::Invalid => return Err(GenerationError::AuthInvalid),
            CredentialStatus::Unverified => self.verify(pipeline).await?,
            CredentialStatus::Valid => {}
        }

        let Some(credential) = &self.credential else {
            return Err(GenerationError::AuthInvalid);
        };

        let prompt = pipeline.synthesizer.synthesize(directive);
        let text = match pipeline.generator.generate(credential, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                if e == GenerationError::AuthInvalid {
                    self.credential_status = CredentialStatus::Invalid;
                }
                tracing::warn!(error = %e, "generation failed");
                return Err(e);
            }
        };

        let artifact = normalize(text);
        tracing::info!(words = artifact.markup_stats.word_count, "generated article");

        Ok(self.artifact.insert(artifact))
    }
}
