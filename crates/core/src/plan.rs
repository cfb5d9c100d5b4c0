//! Paragraph and word budgeting for generated articles.
//!
//! A fixed outline is one introduction paragraph, `subheadings` sections of
//! `paragraphs_per_subheading` paragraphs each, and optionally one contact
//! paragraph. The per-paragraph word target is the maximum word count divided
//! by the paragraph total, rounded down. It is an approximation handed to the
//! generation service, not a cap that is enforced afterwards.

use serde::{Deserialize, Serialize};

/// Minimum and maximum article length in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min_words: u32,
    pub max_words: u32,
}

/// Requested subheading layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub subheadings: u32,
    pub paragraphs_per_subheading: u32,
}

/// Word budget of a fixed outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordBudget {
    pub min_words: u32,
    pub max_words: u32,
    pub words_per_paragraph: u32,
}

/// Structure handed to the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StructurePlan {
    /// Explicit outline with a computed word budget.
    Fixed { outline: Outline, total_paragraphs: u32, budget: WordBudget },
    /// The generation service chooses its own structure.
    AutoDecided { bounds: LengthBounds },
}

impl StructurePlan {
    pub fn bounds(&self) -> LengthBounds {
        match self {
            StructurePlan::Fixed { budget, .. } => {
                LengthBounds { min_words: budget.min_words, max_words: budget.max_words }
            }
            StructurePlan::AutoDecided { bounds } => *bounds,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, StructurePlan::AutoDecided { .. })
    }
}

/// Total paragraph count of an outline: intro + sections (+ contact).
///
/// Always at least one, so it is safe as a divisor.
pub fn total_paragraphs(outline: Outline, include_contact: bool) -> u32 {
    outline
        .subheadings
        .saturating_mul(outline.paragraphs_per_subheading)
        .saturating_add(1)
        .saturating_add(u32::from(include_contact))
}

/// Plans the article structure.
///
/// With an outline the result is [`StructurePlan::Fixed`]; without one the
/// structure is left to the generation service and no budget is computed.
pub fn plan(outline: Option<Outline>, bounds: LengthBounds, include_contact: bool) -> StructurePlan {
    let Some(outline) = outline else {
        tracing::debug!("structure left to the generation service");
        return StructurePlan::AutoDecided { bounds };
    };

    let total = total_paragraphs(outline, include_contact);
    let budget = WordBudget {
        min_words: bounds.min_words,
        max_words: bounds.max_words,
        words_per_paragraph: bounds.max_words / total,
    };

    tracing::debug!(
        subheadings = outline.subheadings,
        paragraphs_per_subheading = outline.paragraphs_per_subheading,
        total_paragraphs = total,
        words_per_paragraph = budget.words_per_paragraph,
        "planned fixed structure"
    );

    StructurePlan::Fixed { outline, total_paragraphs: total, budget }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BOUNDS: LengthBounds = LengthBounds { min_words: 300, max_words: 800 };

    #[rstest]
    #[case(2, 2, false, 5, 160)]
    #[case(2, 2, true, 6, 133)]
    #[case(0, 1, false, 1, 800)]
    #[case(0, 5, true, 2, 400)]
    #[case(10, 10, true, 102, 7)]
    fn test_fixed_budget(
        #[case] subheadings: u32,
        #[case] paragraphs: u32,
        #[case] contact: bool,
        #[case] expected_total: u32,
        #[case] expected_words: u32,
    ) {
        let outline = Outline { subheadings, paragraphs_per_subheading: paragraphs };
        match plan(Some(outline), BOUNDS, contact) {
            StructurePlan::Fixed { total_paragraphs, budget, .. } => {
                assert_eq!(total_paragraphs, expected_total);
                assert_eq!(budget.words_per_paragraph, expected_words);
                assert_eq!(budget.min_words, 300);
                assert_eq!(budget.max_words, 800);
            }
            other => panic!("expected fixed plan, got {:?}", other),
        }
    }

    #[test]
    fn test_auto_skips_budget() {
        let plan = plan(None, BOUNDS, true);
        assert!(plan.is_auto());
        assert_eq!(plan.bounds(), BOUNDS);
    }

    #[test]
    fn test_total_paragraphs_never_zero() {
        for subheadings in 0..=10 {
            for paragraphs in 1..=10 {
                for contact in [false, true] {
                    let outline = Outline { subheadings, paragraphs_per_subheading: paragraphs };
                    assert!(total_paragraphs(outline, contact) >= 1);
                }
            }
        }
    }

    #[test]
    fn test_total_paragraphs_saturates() {
        let outline = Outline { subheadings: u32::MAX, paragraphs_per_subheading: u32::MAX };
        assert_eq!(total_paragraphs(outline, true), u32::MAX);
    }

    #[test]
    fn test_fixed_plan_bounds() {
        let outline = Outline { subheadings: 3, paragraphs_per_subheading: 1 };
        let plan = plan(Some(outline), BOUNDS, false);
        assert!(!plan.is_auto());
        assert_eq!(plan.bounds(), BOUNDS);
    }
}
