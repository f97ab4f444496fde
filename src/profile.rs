//! Model list, parameter bounds and default form values.
//!
//! The form ships with one built-in profile; others can be loaded from JSON so the
//! same controller serves every model family without code changes.

use crate::util::read_to_string;
use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
    pub step: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn contains(&self, v: T) -> bool {
        self.min <= v && v <= self.max
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormDefaults {
    pub system: String,
    pub user: String,
    #[serde(default)]
    pub assistant: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormProfile {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// First entry is the default selection.
    pub models: Vec<String>,
    pub max_tokens: Bounds<u32>,
    pub temperature: Bounds<f64>,
    pub top_p: Bounds<f64>,
    pub top_k: Bounds<u32>,
    pub defaults: FormDefaults,
}

const DEFAULT_SYSTEM: &str = "You are a trained dietitian and nutritionist. You are experienced at providing advice on healthy eating habits.";

const DEFAULT_USER: &str = "I am a busy professional who is worried about my poor eating habits. I will be working late tonight. Provide a dinner suggestion I can prepare.

Consider all of the following requirements:

<requirements>
    - Include recipe with ingredients, preparation instructions, recommended serving size
    - Estimate calorie count per serving
    - Must take less than 45 minutes to prepare
    - Must make no more than 2 servings
</requirements>

Think step-by-step before you choose a meal idea.
";

impl Default for FormProfile {
    fn default() -> Self {
        Self {
            title: "Bedrock Anthropic Claude 3 Prompt Form".to_string(),
            description: "Inference request to an Anthropic Claude 3 foundation model for text generation.".to_string(),
            models: vec![
                "anthropic.claude-3-5-sonnet-20240620-v1:0".to_string(),
                "anthropic.claude-3-haiku-20240307-v1:0".to_string(),
                "anthropic.claude-3-sonnet-20240229-v1:0".to_string(),
                "anthropic.claude-3-opus-20240229-v1:0".to_string(),
            ],
            max_tokens: Bounds { min: 1, max: 8192, step: 1 },
            temperature: Bounds { min: 0.0, max: 1.0, step: 0.1 },
            top_p: Bounds { min: 0.0, max: 1.0, step: 0.01 },
            top_k: Bounds { min: 1, max: 500, step: 1 },
            defaults: FormDefaults {
                system: DEFAULT_SYSTEM.to_string(),
                user: DEFAULT_USER.to_string(),
                assistant: String::new(),
                max_tokens: 1000,
                temperature: 0.2,
                top_p: 0.99,
                top_k: 250,
            },
        }
    }
}

impl FormProfile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = read_to_string(&path)?;
        Self::from_json(&raw).with_context(|| format!("load profile {:?}", path.as_ref()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let profile: FormProfile = serde_json::from_str(raw).context("parse profile json")?;
        profile.check()?;
        Ok(profile)
    }

    pub fn default_model(&self) -> &str {
        self.models.first().map(String::as_str).unwrap_or_default()
    }

    /// Rejects profiles whose bounds or defaults the provider could never accept.
    pub fn check(&self) -> Result<()> {
        ensure!(!self.models.is_empty(), "profile lists no models");
        if let Some(blank) = self.models.iter().find(|m| m.trim().is_empty()) {
            bail!("profile lists a blank model id: {blank:?}");
        }

        ensure!(self.max_tokens.min >= 1, "max_tokens minimum must be at least 1");
        ensure!(self.top_k.min >= 1, "top_k minimum must be at least 1");
        for (name, b) in [("temperature", &self.temperature), ("top_p", &self.top_p)] {
            ensure!(
                0.0 <= b.min && b.max <= 1.0,
                "{name} bounds must lie within [0.0, 1.0]"
            );
        }

        check_bounds("max_tokens", &self.max_tokens, self.defaults.max_tokens)?;
        check_bounds("temperature", &self.temperature, self.defaults.temperature)?;
        check_bounds("top_p", &self.top_p, self.defaults.top_p)?;
        check_bounds("top_k", &self.top_k, self.defaults.top_k)?;
        Ok(())
    }
}

fn check_bounds<T>(name: &str, b: &Bounds<T>, default: T) -> Result<()>
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    ensure!(b.min <= b.max, "{name}: min {} exceeds max {}", b.min, b.max);
    ensure!(
        b.contains(default),
        "{name}: default {default} outside [{}, {}]",
        b.min,
        b.max
    );
    Ok(())
}
