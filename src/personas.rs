use crate::prompts::{build_budget_system_prompt, build_premium_system_prompt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pros, cons and a recommendation for one shopper.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProsCons {
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub personalized_recommendation: String,
}

/// Tone used when advising a shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Persona {
    /// Steers toward cheaper alternatives.
    Budget,
    /// Recommends the top-end configuration.
    Premium,
}

impl Persona {
    pub fn system_prompt(&self) -> String {
        match self {
            Persona::Budget => build_budget_system_prompt(),
            Persona::Premium => build_premium_system_prompt(),
        }
    }

    /// Canned summary used when generation is unavailable.
    pub fn fallback(&self) -> ProsCons {
        let (pros, cons, recommendation): (&[&str], &[&str], &str) = match self {
            Persona::Budget => (
                &[
                    "Display quality and size improvements make everything more readable",
                    "Health tracking features including heart rate and sleep monitoring",
                    "Seamless integration with iPhone and Apple ecosystem",
                ],
                &[
                    "Battery life concerns with heavy usage and GPS tracking",
                    "Premium pricing may not justify upgrade from recent models",
                    "Many features require additional subscriptions adding to cost",
                ],
                "While the Apple Watch Series 10 is an excellent device, given your student budget and $500 credit limit, I'd recommend the Xiaomi Mi Band 7 ($50) or Amazfit Band 7 ($50). These alternatives offer essential features you need - step tracking, sleep monitoring, and study timers - without the financial strain. You'll save over $300 and avoid costly subscriptions while still getting reliable fitness tracking for campus life.",
            ),
            Persona::Premium => (
                &[
                    "Display quality and size improvements make everything more readable",
                    "S10 chip delivers exceptional performance for demanding apps",
                    "Advanced health sensors including temperature and blood oxygen monitoring",
                ],
                &[
                    "Battery life still requires daily charging with heavy usage",
                    "Some advanced features require iPhone 15 Pro or newer",
                    "Titanium edition significantly more expensive than aluminum",
                ],
                "For someone with your tech expertise and income, the Apple Watch Series 10 Titanium with Cellular is the perfect choice. The $799 investment delivers cutting-edge health monitoring, seamless ecosystem integration, and premium materials that match your professional image. Add the Milanese Loop ($99) for versatility. The productivity gains alone justify the cost for your $185k salary.",
            ),
        };
        ProsCons {
            pros: pros.iter().map(|s| s.to_string()).collect(),
            cons: cons.iter().map(|s| s.to_string()).collect(),
            personalized_recommendation: recommendation.to_string(),
        }
    }
}

/// Maps usernames to personas, falling back to a default.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    default: Persona,
    overrides: HashMap<String, Persona>,
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::new(Persona::Budget).with_override("TechUser92", Persona::Premium)
    }
}

impl PersonaRegistry {
    pub fn new(default: Persona) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, username: &str, persona: Persona) -> Self {
        self.overrides.insert(username.to_string(), persona);
        self
    }

    /// Exact, case-sensitive match on the username.
    pub fn persona_for(&self, username: &str) -> Persona {
        self.overrides
            .get(username)
            .copied()
            .unwrap_or(self.default)
    }
}

/// Parses a `USERNAME=PERSONA` override pair.
pub fn parse_persona_override(raw: &str) -> Result<(String, Persona), String> {
    use clap::ValueEnum;

    let (username, persona) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected USERNAME=PERSONA, got `{raw}`"))?;
    let username = username.trim();
    if username.is_empty() {
        return Err(format!("missing username in `{raw}`"));
    }
    let persona = Persona::from_str(persona.trim(), true)?;
    Ok((username.to_string(), persona))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_recognizes_one_premium_user() {
        let registry = PersonaRegistry::default();
        assert_eq!(registry.persona_for("TechUser92"), Persona::Premium);
        assert_eq!(registry.persona_for("Student2025"), Persona::Budget);
        assert_eq!(registry.persona_for("techuser92"), Persona::Budget);
        assert_eq!(registry.persona_for(""), Persona::Budget);
    }

    #[test]
    fn fallbacks_have_three_items_and_differ() {
        let budget = Persona::Budget.fallback();
        let premium = Persona::Premium.fallback();
        for summary in [&budget, &premium] {
            assert_eq!(summary.pros.len(), 3);
            assert_eq!(summary.cons.len(), 3);
            assert!(!summary.personalized_recommendation.is_empty());
        }
        assert_ne!(budget.personalized_recommendation, premium.personalized_recommendation);
        assert!(budget.personalized_recommendation.contains("Xiaomi Mi Band 7"));
        assert!(premium.personalized_recommendation.contains("Titanium"));
    }

    #[test]
    fn override_parsing() {
        assert_eq!(
            parse_persona_override("alice=premium").unwrap(),
            ("alice".to_string(), Persona::Premium)
        );
        assert_eq!(
            parse_persona_override(" bob = Budget ").unwrap(),
            ("bob".to_string(), Persona::Budget)
        );
        assert!(parse_persona_override("alice").is_err());
        assert!(parse_persona_override("=premium").is_err());
        assert!(parse_persona_override("alice=luxury").is_err());
    }

    #[test]
    fn custom_default_applies_to_unknown_users() {
        let registry = PersonaRegistry::new(Persona::Premium).with_override("saver", Persona::Budget);
        assert_eq!(registry.persona_for("anyone"), Persona::Premium);
        assert_eq!(registry.persona_for("saver"), Persona::Budget);
    }
}
