//! Prompt synthesis.
//!
//! Renders a [`GenerationDirective`] into the instruction text sent to the
//! completion service. Rendering is a pure function of the directive and the
//! chosen language: the same inputs always give byte-identical output.

use serde::{Deserialize, Serialize};

use crate::directive::GenerationDirective;
use crate::plan::StructurePlan;

/// Language of the rendered instructions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptLanguage {
    #[default]
    Danish,
    English,
}

struct Phrases {
    system_role: &'static str,
    keywords: &'static str,
    locations: &'static str,
    length: &'static str,
    words: &'static str,
    study_sources: &'static str,
    structure_heading: &'static str,
    main_heading: &'static str,
    subheadings: &'static str,
    paragraphs_per_subheading: &'static str,
    word_distribution: &'static str,
    per_paragraph: &'static str,
    auto_structure: &'static str,
    target_page: &'static str,
    sources: &'static str,
    study_before_writing: &'static str,
    start_heading: &'static str,
    start_h1: &'static str,
    start_intro: &'static str,
    start_sections: &'static str,
    start_auto: &'static str,
    start_tone: &'static str,
    contact: &'static str,
}

const DANISH: Phrases = Phrases {
    system_role: "Du er en professionel SEO-tekstforfatter.",
    keywords: "Søgeord",
    locations: "Geografi",
    length: "Tekst længde",
    words: "ord",
    study_sources: "Gennemgå følgende hjemmesider og deres undersider.\n\
        Teksten skal lyde som om og have samme ordvalg og ordlyd som teksterne fundet på hjemmesiderne.\n\
        Teksten må ikke lyve, love noget der ikke er sandt eller direkte gentage tekster ord for ord.\n\
        Teksten SKAL have den angivne længde og inkludere de angivne søgeord og geografier.",
    structure_heading: "**Tekststruktur:**",
    main_heading: "- **1 Hovedoverskrift** (inkluderende søgeord + geografi)",
    subheadings: "Underoverskrifter",
    paragraphs_per_subheading: "Afsnit per underoverskrift",
    word_distribution: "- **Fordeling af ord:** Ca.",
    per_paragraph: "ord per afsnit",
    auto_structure: "- Vælg selv antallet af underoverskrifter og afsnit, så teksten får en naturlig opbygning.",
    target_page: "Teksten skal være specifikt målrettet denne side",
    sources: "Websites, der skal analyseres",
    study_before_writing: "Studér sproget på disse sider, før du genererer teksten.",
    start_heading: "**Start nu teksten:**",
    start_h1: "- Skriv en H1-overskrift øverst.",
    start_intro: "- Skriv en kort introduktion (1 afsnit).",
    start_sections: "- Fordel teksten, så der er {n} H2-underoverskrifter, med {p} afsnit hver.",
    start_auto: "- Fordel resten af teksten under H2-underoverskrifter efter eget valg.",
    start_tone: "- Teksten skal være naturlig og informativ.",
    contact: "**Tilføj til sidst:**\n\
        - En sektion med en H2-overskrift kaldet \"Kontakt os\".\n\
        - Et kort afsnit om, hvordan læseren kan kontakte virksomheden.",
};

const ENGLISH: Phrases = Phrases {
    system_role: "You are a professional SEO copywriter.",
    keywords: "Keywords",
    locations: "Locations",
    length: "Text length",
    words: "words",
    study_sources: "Review the following websites and their subpages.\n\
        The text must sound like, and use the same word choice and phrasing as, the texts found on those websites.\n\
        The text must not lie, promise anything untrue or repeat texts word for word.\n\
        The text MUST have the given length and include the given keywords and locations.",
    structure_heading: "**Text structure:**",
    main_heading: "- **1 Main heading** (including keyword + location)",
    subheadings: "Subheadings",
    paragraphs_per_subheading: "Paragraphs per subheading",
    word_distribution: "- **Word distribution:** Approx.",
    per_paragraph: "words per paragraph",
    auto_structure: "- Choose the number of subheadings and paragraphs yourself so the text reads naturally.",
    target_page: "The text must specifically target this page",
    sources: "Websites to analyse",
    study_before_writing: "Study the language on these pages before you generate the text.",
    start_heading: "**Now start the text:**",
    start_h1: "- Write an H1 heading at the top.",
    start_intro: "- Write a short introduction (1 paragraph).",
    start_sections: "- Split the text into {n} H2 subheadings, with {p} paragraphs each.",
    start_auto: "- Arrange the rest of the text under H2 subheadings of your choice.",
    start_tone: "- The text must be natural and informative.",
    contact: "**Add at the end:**\n\
        - A section with an H2 heading called \"Contact us\".\n\
        - A short paragraph on how the reader can contact the business.",
};

impl PromptLanguage {
    fn phrases(self) -> &'static Phrases {
        match self {
            PromptLanguage::Danish => &DANISH,
            PromptLanguage::English => &ENGLISH,
        }
    }

    /// Fixed system-role instruction for this language.
    pub fn system_role(self) -> &'static str {
        self.phrases().system_role
    }
}

/// Instruction payload for the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPrompt {
    /// System-role instruction.
    pub system: String,
    /// User-role instruction carrying the serialized directive.
    pub user: String,
}

impl RenderedPrompt {
    /// Both parts joined, system role first.
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

/// Renders directives into prompts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptSynthesizer {
    language: PromptLanguage,
}

impl PromptSynthesizer {
    pub fn new(language: PromptLanguage) -> Self {
        Self { language }
    }

    pub fn language(&self) -> PromptLanguage {
        self.language
    }

    pub fn synthesize(&self, directive: &GenerationDirective) -> RenderedPrompt {
        let prompt = synthesize(directive, self.language);
        tracing::debug!(chars = prompt.user.len(), language = ?self.language, "synthesized prompt");
        prompt
    }
}

/// Renders `directive` in `language`.
pub fn synthesize(directive: &GenerationDirective, language: PromptLanguage) -> RenderedPrompt {
    let ph = language.phrases();
    let bounds = directive.bounds();
    let mut out = String::new();

    out.push_str(&format!("{}: {}\n", ph.keywords, directive.keywords().join(", ")));
    out.push_str(&format!("{}: {}\n", ph.locations, directive.locations().join(", ")));
    out.push_str(&format!(
        "{}: MINIMUM {} {} & MAXIMUM {} {}.\n\n",
        ph.length, bounds.min_words, ph.words, bounds.max_words, ph.words
    ));

    out.push_str(ph.study_sources);
    out.push_str("\n\n");

    out.push_str(ph.structure_heading);
    out.push('\n');
    out.push_str(ph.main_heading);
    out.push('\n');
    match directive.structure() {
        StructurePlan::Fixed { outline, budget, .. } => {
            out.push_str(&format!("- **{} {}**\n", outline.subheadings, ph.subheadings));
            out.push_str(&format!(
                "- **{} {}**\n",
                outline.paragraphs_per_subheading, ph.paragraphs_per_subheading
            ));
            out.push_str(&format!(
                "{} {} {}\n",
                ph.word_distribution, budget.words_per_paragraph, ph.per_paragraph
            ));
        }
        StructurePlan::AutoDecided { .. } => {
            out.push_str(ph.auto_structure);
            out.push('\n');
        }
    }
    out.push('\n');

    out.push_str(&format!("{}: {}\n\n", ph.target_page, directive.target_page()));
    out.push_str(&format!("{}: {}\n\n", ph.sources, directive.reference_links().join(", ")));
    out.push_str(ph.study_before_writing);
    out.push_str("\n\n");

    out.push_str(ph.start_heading);
    out.push('\n');
    out.push_str(ph.start_h1);
    out.push('\n');
    out.push_str(ph.start_intro);
    out.push('\n');
    match directive.structure() {
        StructurePlan::Fixed { outline, .. } => {
            let sections = ph
                .start_sections
                .replace("{n}", &outline.subheadings.to_string())
                .replace("{p}", &outline.paragraphs_per_subheading.to_string());
            out.push_str(&sections);
        }
        StructurePlan::AutoDecided { .. } => out.push_str(ph.start_auto),
    }
    out.push('\n');
    out.push_str(ph.start_tone);
    out.push('\n');

    if directive.include_contact() {
        out.push('\n');
        out.push_str(ph.contact);
        out.push('\n');
    }

    RenderedPrompt { system: ph.system_role.to_string(), user: out }
}
