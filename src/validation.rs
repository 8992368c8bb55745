//! Agent card validation.
//!
//! Every rule runs independently and appends to the outcome; nothing here
//! fails. A card with errors is still connectable, the caller decides how loud
//! to be about it.

use a2a_types::AgentCard;
use serde::Serialize;
use std::collections::HashSet;

/// Errors and warnings collected for one agent card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Validate a possibly absent card.
pub fn validate_agent_card(card: Option<&AgentCard>) -> ValidationOutcome {
    match card {
        Some(card) => validate(card),
        None => {
            let mut outcome = ValidationOutcome::default();
            outcome.error("Agent card is missing");
            outcome
        }
    }
}

pub fn validate(card: &AgentCard) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    validate_required_fields(card, &mut outcome);
    validate_url(card, &mut outcome);
    validate_skills(card, &mut outcome);
    outcome
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn validate_required_fields(card: &AgentCard, outcome: &mut ValidationOutcome) {
    if is_blank(&card.name) {
        outcome.error("Agent name is required");
    }
    if is_blank(&card.description) {
        outcome.warning("Agent description is recommended for better discoverability");
    }
    if is_blank(&card.url) {
        outcome.error("Agent URL is required");
    }
    if is_blank(&card.version) {
        outcome.error("Agent version is required");
    }
}

fn validate_url(card: &AgentCard, outcome: &mut ValidationOutcome) {
    if is_blank(&card.url) {
        return;
    }

    match url::Url::parse(card.url.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        Ok(_) => outcome.error("Agent URL must use HTTP/HTTPS"),
        Err(_) => outcome.error("Invalid URL format: agent URL must be an absolute URI"),
    }
}

fn validate_skills(card: &AgentCard, outcome: &mut ValidationOutcome) {
    if card.skills.is_empty() {
        outcome.warning("No skills defined - agent capabilities may not be discoverable");
        return;
    }

    let mut seen = HashSet::new();
    for (index, skill) in card.skills.iter().enumerate() {
        if is_blank(&skill.name) {
            outcome.error(format!("Skill #{} is missing a required name", index + 1));
        } else if !seen.insert(skill.name.as_str()) {
            outcome.warning(format!("Duplicate skill name '{}' found", skill.name));
        }

        if is_blank(&skill.description) {
            outcome.warning(format!("Skill '{}' is missing a description", skill.name));
        }
    }
}
