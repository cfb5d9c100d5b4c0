//! The generation directive: every user-supplied parameter of one generate action.
//!
//! A [`GenerationDirective`] is validated and planned once by
//! [`DirectiveBuilder::build`] and is read-only afterwards.
//!
//! # Example
//!
//! ```rust
//! use scribe_core::GenerationDirective;
//!
//! let directive = GenerationDirective::builder()
//!     .keywords_input("bakery, bread")
//!     .locations_input("Aarhus")
//!     .target_page("https://example.com/bakery")
//!     .word_bounds(300, 800)
//!     .outline(2, 2)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(directive.keywords(), ["bakery", "bread"]);
//! ```

use serde::Serialize;

use crate::error::InputError;
use crate::plan::{LengthBounds, Outline, StructurePlan, plan};

/// Separator between keywords and between locations in free-text input.
pub const LIST_SEPARATOR: &str = ", ";

/// Accepted range for minimum and maximum word counts.
pub const WORD_COUNT_LIMITS: (u32, u32) = (100, 5000);
/// Accepted range for the number of subheadings.
pub const SUBHEADING_LIMITS: (u32, u32) = (0, 10);
/// Accepted range for paragraphs per subheading.
pub const PARAGRAPH_LIMITS: (u32, u32) = (1, 10);

/// Splits comma-separated input on the literal `", "` separator.
///
/// Empty entries are kept: `"a, , b"` yields three items and `""` yields one
/// empty item.
pub fn split_list(input: &str) -> Vec<String> {
    input.split(LIST_SEPARATOR).map(str::to_string).collect()
}

/// Splits one-per-line input on `'\n'`, keeping empty lines.
pub fn split_lines(input: &str) -> Vec<String> {
    input.split('\n').map(str::to_string).collect()
}

fn check_range(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<u32, InputError> {
    if value < min || value > max {
        Err(InputError::OutOfRange { field, min, max, value })
    } else {
        Ok(value)
    }
}

/// Parameters that fully determine a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationDirective {
    keywords: Vec<String>,
    locations: Vec<String>,
    target_page: String,
    reference_links: Vec<String>,
    structure: StructurePlan,
    include_contact: bool,
}

impl GenerationDirective {
    pub fn builder() -> DirectiveBuilder {
        DirectiveBuilder::new()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn target_page(&self) -> &str {
        &self.target_page
    }

    pub fn reference_links(&self) -> &[String] {
        &self.reference_links
    }

    pub fn structure(&self) -> &StructurePlan {
        &self.structure
    }

    pub fn bounds(&self) -> LengthBounds {
        self.structure.bounds()
    }

    pub fn include_contact(&self) -> bool {
        self.include_contact
    }
}

/// Builder for [`GenerationDirective`].
///
/// Defaults: 300 to 800 words, two subheadings with two paragraphs each, no
/// contact section.
#[derive(Debug, Clone)]
pub struct DirectiveBuilder {
    keywords: Vec<String>,
    locations: Vec<String>,
    target_page: String,
    reference_links: Vec<String>,
    min_words: u32,
    max_words: u32,
    outline: Option<Outline>,
    include_contact: bool,
}

impl DirectiveBuilder {
    pub fn new() -> Self {
        Self {
            keywords: Vec::new(),
            locations: Vec::new(),
            target_page: String::new(),
            reference_links: Vec::new(),
            min_words: 300,
            max_words: 800,
            outline: Some(Outline { subheadings: 2, paragraphs_per_subheading: 2 }),
            include_contact: false,
        }
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Sets keywords from comma-separated input.
    pub fn keywords_input(mut self, input: &str) -> Self {
        self.keywords = split_list(input);
        self
    }

    pub fn locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }

    /// Sets locations from comma-separated input.
    pub fn locations_input(mut self, input: &str) -> Self {
        self.locations = split_list(input);
        self
    }

    pub fn target_page(mut self, target_page: impl Into<String>) -> Self {
        self.target_page = target_page.into();
        self
    }

    pub fn reference_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reference_links = links.into_iter().map(Into::into).collect();
        self
    }

    /// Sets reference links from one-per-line input.
    pub fn reference_links_input(mut self, input: &str) -> Self {
        self.reference_links = split_lines(input);
        self
    }

    /// Appends links that are not already in the reference list.
    pub fn merge_reference_links<I>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        for link in links {
            if !self.reference_links.contains(&link) {
                self.reference_links.push(link);
            }
        }
        self
    }

    pub fn word_bounds(mut self, min_words: u32, max_words: u32) -> Self {
        self.min_words = min_words;
        self.max_words = max_words;
        self
    }

    /// Requests a fixed outline.
    pub fn outline(mut self, subheadings: u32, paragraphs_per_subheading: u32) -> Self {
        self.outline = Some(Outline { subheadings, paragraphs_per_subheading });
        self
    }

    /// Leaves the structure to the generation service.
    pub fn auto_structure(mut self) -> Self {
        self.outline = None;
        self
    }

    pub fn include_contact(mut self, value: bool) -> Self {
        self.include_contact = value;
        self
    }

    /// Validates numeric inputs and plans the structure.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] if a word count, subheading count or paragraph
    /// count is outside its accepted range, or the minimum exceeds the maximum.
    pub fn build(self) -> Result<GenerationDirective, InputError> {
        let min_words = check_range("min_words", self.min_words, WORD_COUNT_LIMITS)?;
        let max_words = check_range("max_words", self.max_words, WORD_COUNT_LIMITS)?;
        if min_words > max_words {
            return Err(InputError::InvertedBounds { min: min_words, max: max_words });
        }

        if let Some(outline) = self.outline {
            check_range("subheadings", outline.subheadings, SUBHEADING_LIMITS)?;
            check_range(
                "paragraphs_per_subheading",
                outline.paragraphs_per_subheading,
                PARAGRAPH_LIMITS,
            )?;
        }

        let structure = plan(self.outline, LengthBounds { min_words, max_words }, self.include_contact);

        Ok(GenerationDirective {
            keywords: self.keywords,
            locations: self.locations,
            target_page: self.target_page,
            reference_links: self.reference_links,
            structure,
            include_contact: self.include_contact,
        })
    }
}

impl Default for DirectiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
