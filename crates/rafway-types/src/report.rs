//! Advisory report shown on the parent dashboard.
//!
//! The report is precomputed; nothing in Raf Way derives it from the chat.

use serde::{Deserialize, Serialize};

/// A personality trait score (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTrait {
    pub name: String,
    pub value: u8,
}

/// A school matched to the student's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolRecommendation {
    pub id: String,
    pub name: String,
    /// Match percentage (0-100).
    pub match_score: u8,
    /// Field of study, e.g. "Digital & Tech".
    pub kind: String,
    pub location: String,
}

/// The full advisory report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub personality_traits: Vec<PersonalityTrait>,
    pub recommended_schools: Vec<SchoolRecommendation>,
    pub career_paths: Vec<String>,
}

impl ReportData {
    /// The built-in sample report used when no report file is provided.
    pub fn sample() -> Self {
        let traits = [
            ("Créativité", 85),
            ("Logique", 60),
            ("Social", 75),
            ("Leadership", 90),
            ("Rigueur", 45),
        ];
        let schools = [
            ("1", "HETIC", 95, "Digital & Tech", "Montreuil"),
            ("2", "Gobelins", 88, "Image & Design", "Paris"),
            ("3", "IESEG", 72, "Commerce", "Lille/Paris"),
        ];

        Self {
            personality_traits: traits
                .iter()
                .map(|(name, value)| PersonalityTrait {
                    name: name.to_string(),
                    value: *value,
                })
                .collect(),
            recommended_schools: schools
                .iter()
                .map(|(id, name, score, kind, location)| SchoolRecommendation {
                    id: id.to_string(),
                    name: name.to_string(),
                    match_score: *score,
                    kind: kind.to_string(),
                    location: location.to_string(),
                })
                .collect(),
            career_paths: vec![
                "Product Designer".to_string(),
                "Chef de Projet Digital".to_string(),
                "Directeur Artistique".to_string(),
            ],
        }
    }

    /// The trait with the highest score, if any.
    pub fn strongest_trait(&self) -> Option<&PersonalityTrait> {
        self.personality_traits.iter().max_by_key(|t| t.value)
    }
}
