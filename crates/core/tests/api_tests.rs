//! Library API integration tests
#![cfg(feature = "fetch")]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scribe_core::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

/// Completion service that accepts one key and records every prompt it receives.
struct ScriptedService {
    key: &'static str,
    reply: &'static str,
    prompts: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedService {
    fn new(key: &'static str, reply: &'static str) -> Arc<Self> {
        Arc::new(Self { key, reply, prompts: Mutex::new(Vec::new()) })
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn list_models(&self, credential: &Credential) -> std::result::Result<Vec<String>, GenerationError> {
        if credential.expose() == self.key { Ok(vec!["gpt-4o-mini".into()]) } else { Err(GenerationError::AuthInvalid) }
    }

    async fn complete(
        &self,
        credential: &Credential,
        request: &CompletionRequest,
    ) -> std::result::Result<String, GenerationError> {
        if credential.expose() != self.key {
            return Err(GenerationError::AuthInvalid);
        }
        self.prompts.lock().unwrap().push(request.clone());
        Ok(self.reply.to_string())
    }
}

async fn bakery_site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture("bakery.html")))
        .mount(&server)
        .await;
    server
}

fn pipeline(service: Arc<ScriptedService>) -> Pipeline {
    Pipeline {
        discoverer: LinkDiscoverer::default(),
        synthesizer: PromptSynthesizer::default(),
        generator: GenerationAdapter::new(service, GenerationSettings::default()),
    }
}

#[test]
fn test_extract_links_from_fixture() {
    let page = url::Url::parse("https://bageriet.dk/").unwrap();
    let links = extract_links(&fixture("bakery.html"), &page, &page, &DiscoverConfig::default().denied_extensions);

    assert_eq!(
        links.into_vec(),
        vec![
            "https://bageriet.dk/",
            "https://bageriet.dk/blog?side=2",
            "https://bageriet.dk/kontakt",
            "https://bageriet.dk/om-os",
            "https://bageriet.dk/sortiment/brod",
            "https://bageriet.dk/sortiment/kager#lagkager",
        ]
    );
}

#[tokio::test]
async fn test_full_pipeline() {
    let site = bakery_site().await;
    let service = ScriptedService::new(
        "sk-good",
        "# Bageri i Aarhus\n\nIntro.\n\n## Brød\n\nFriskt **hver** dag.\n\n## Kontakt os\n\nRing til os.",
    );
    let pipeline = pipeline(service.clone());
    let mut session = Session::new();

    let target = format!("{}/", site.uri());
    let found = session.discover(&target, &pipeline).await.unwrap();
    assert_eq!(found.len(), 6);
    assert_eq!(session.links(), &found);

    let directive = GenerationDirective::builder()
        .keywords_input("bageri, surdejsbrød")
        .locations_input("Aarhus")
        .target_page(target.clone())
        .reference_links_input("https://konkurrent.dk/brod")
        .merge_reference_links(session.links().clone())
        .word_bounds(300, 800)
        .outline(2, 2)
        .include_contact(true)
        .build()
        .unwrap();
    assert_eq!(directive.reference_links().len(), 7);

    session.set_credential(Credential::new("sk-good"), &pipeline).await.unwrap();
    let artifact = session.generate(&directive, &pipeline).await.unwrap();

    assert!(artifact.markup_text.starts_with("# Bageri i Aarhus"));
    assert!(!artifact.plain_text.contains('#'));
    assert!(!artifact.plain_text.contains('*'));
    assert_eq!(artifact.markup_stats.word_count, artifact.plain_stats.word_count + 3);

    let prompts = service.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].system, "Du er en professionel SEO-tekstforfatter.");
    assert!(prompts[0].user.contains("bageri, surdejsbrød"));
    assert!(prompts[0].user.contains("https://konkurrent.dk/brod"));
    assert!(prompts[0].user.contains("Ca. 133 ord per afsnit"));
    assert!(prompts[0].user.contains("Kontakt os"));
}

#[tokio::test]
async fn test_invalid_credential_produces_no_artifact() {
    let service = ScriptedService::new("sk-good", "# Tekst");
    let pipeline = pipeline(service.clone());
    let mut session = Session::new();

    let directive = GenerationDirective::builder().keywords(["bageri"]).locations(["Aarhus"]).build().unwrap();

    let probe = session.set_credential(Credential::new("sk-wrong"), &pipeline).await;
    assert_eq!(probe.unwrap_err().kind(), GenerationErrorKind::AuthInvalid);

    let result = session.generate(&directive, &pipeline).await.cloned();
    assert_eq!(result, Err(GenerationError::AuthInvalid));
    assert!(session.artifact().is_none());
    assert!(service.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_site_keeps_cached_links() {
    let site = bakery_site().await;
    let pipeline = pipeline(ScriptedService::new("sk-good", ""));
    let mut session = Session::new();

    session.discover(&format!("{}/", site.uri()), &pipeline).await.unwrap();
    let cached = session.links().clone();

    let result = session.discover("http://127.0.0.1:9/", &pipeline).await;
    assert!(result.is_err());
    assert_eq!(session.links(), &cached);

    let result = session.discover("not a url", &pipeline).await;
    assert!(matches!(result, Err(CrawlError::InvalidUrl(_))));
    assert_eq!(session.links(), &cached);
}

#[test]
fn test_auto_structure_prompt() {
    let directive = GenerationDirective::builder()
        .keywords(["tandlæge"])
        .locations(["Odense", "Svendborg"])
        .word_bounds(500, 900)
        .auto_structure()
        .build()
        .unwrap();

    assert!(directive.structure().is_auto());
    let prompt = PromptSynthesizer::new(PromptLanguage::English).synthesize(&directive);
    assert!(prompt.user.contains("MINIMUM 500"));
    assert!(prompt.user.contains("MAXIMUM 900"));
    assert!(prompt.user.contains("Odense, Svendborg"));
}

#[test]
fn test_out_of_range_input_is_rejected() {
    let result = GenerationDirective::builder().word_bounds(50, 800).build();
    assert!(matches!(result, Err(InputError::OutOfRange { field: "min_words", .. })));

    let result = GenerationDirective::builder().word_bounds(900, 800).build();
    assert_eq!(result.unwrap_err(), InputError::InvertedBounds { min: 900, max: 800 });
}

#[test]
fn test_feedback_submission_text() {
    let submission = FeedbackSubmission::new(FeedbackCategory::FeatureIdea, None, "Eksport til Word");
    assert_eq!(submission.subject(), "SEO-ContentGenerator + FEATURE IDEA");
    assert!(submission.plain_body().contains("Anonymous User"));
    assert!(submission.html_body().contains("Eksport til Word"));
}
