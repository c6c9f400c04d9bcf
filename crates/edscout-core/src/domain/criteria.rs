//! Per-category evaluation criteria.
//!
//! A [`CategoryProfile`] is what a scoring stage is built from: the web
//! search query used to gather context and the checklist the scoring
//! collaborator is asked to grade against. The checklists here are the
//! standard ten-question screens; they are configuration data and callers
//! may supply their own.

use serde::{Deserialize, Serialize};

use crate::domain::record::Category;

/// Evaluation profile for one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryProfile {
    pub category: Category,

    /// Query suffix passed to the context provider alongside the candidate
    /// name.
    pub search_query: String,

    /// Checklist questions the scorer grades against.
    pub checklist: Vec<String>,
}

impl CategoryProfile {
    pub fn new(
        category: Category,
        search_query: impl Into<String>,
        checklist: Vec<String>,
    ) -> Self {
        Self {
            category,
            search_query: search_query.into(),
            checklist,
        }
    }
}

fn questions(items: &[&str]) -> Vec<String> {
    items.iter().map(|q| q.to_string()).collect()
}

/// The standard six-category profile set.
pub fn default_profiles() -> Vec<CategoryProfile> {
    vec![
        CategoryProfile::new(
            Category::Technology,
            "education technology innovation product",
            questions(&[
                "Does the product clearly solve an education problem?",
                "Is AI/ML used substantively, not as window dressing?",
                "Is the technology innovative and differentiated?",
                "Is the technical approach feasible to implement?",
                "Can the system scale?",
                "Are stability and security established?",
                "Can learning be optimized from data?",
                "Are APIs and integrations strong?",
                "Is the technology well documented?",
                "Is there open-source use or community contribution?",
            ]),
        ),
        CategoryProfile::new(
            Category::LearningEffectiveness,
            "learning outcomes effectiveness results",
            questions(&[
                "Are learning-outcome metrics clearly defined?",
                "Is learner satisfaction high?",
                "Are completion rates strong?",
                "Are there validated effectiveness case studies?",
                "Is personalized learning supported?",
                "Is learning data analyzed and fed back to learners?",
                "Are there tools supporting teachers and instructors?",
                "Are there mechanisms to raise learner engagement?",
                "Is content quality high?",
                "Are learning-path recommendations effective?",
            ]),
        ),
        CategoryProfile::new(
            Category::Market,
            "education market size revenue model",
            questions(&[
                "Is the target education market large?",
                "Is the market growing quickly?",
                "Is the revenue model clear and realistic?",
                "Is a customer base (B2B/B2C) established?",
                "Is the pricing strategy sound?",
                "Is the go-to-market strategy concrete?",
                "Is customer acquisition cost reasonable?",
                "Is customer lifetime value high?",
                "Are partnerships attainable?",
                "Is global expansion plausible?",
            ]),
        ),
        CategoryProfile::new(
            Category::Competition,
            "competitors comparison differentiation",
            questions(&[
                "Is there clear differentiation from competitors?",
                "Do barriers to entry exist?",
                "Is there a competitive moat (patents, technology, network)?",
                "Is brand awareness established?",
                "Is customer loyalty high?",
                "Is there a first-mover advantage?",
                "Do network effects operate?",
                "Are switching costs high?",
                "Is price/performance strong versus competitors?",
                "Is the competitive edge sustainable?",
            ]),
        ),
        CategoryProfile::new(
            Category::GrowthPotential,
            "growth potential funding expansion",
            questions(&[
                "Is market expansion potential large?",
                "Are there product diversification plans?",
                "Is the global expansion strategy concrete?",
                "Are there partnership growth opportunities?",
                "Is M&A plausible?",
                "Is an IPO plausible?",
                "Is scale-up infrastructure in place?",
                "Is there a fundraising track record?",
                "Is the growth roadmap clear?",
                "Is 10x growth plausible?",
            ]),
        ),
        CategoryProfile::new(
            Category::Risk,
            "risk regulation finance news",
            questions(&[
                "Is financial risk low?",
                "Is legal and regulatory risk low?",
                "Is technology risk low?",
                "Is market risk low?",
                "Is management risk low?",
                "Is operational risk low?",
                "Is reputational risk low?",
                "Is competitive risk low?",
                "Is partnership-dependency risk low?",
                "Is scalability risk low?",
            ]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profiles_cover_every_category_once() {
        let profiles = default_profiles();
        assert_eq!(profiles.len(), Category::ALL.len());
        for category in Category::ALL {
            assert_eq!(
                profiles.iter().filter(|p| p.category == category).count(),
                1,
                "{category} must appear exactly once"
            );
        }
    }

    #[test]
    fn default_profiles_carry_ten_question_checklists() {
        for profile in default_profiles() {
            assert_eq!(profile.checklist.len(), 10, "{}", profile.category);
            assert!(!profile.search_query.is_empty());
        }
    }
}
