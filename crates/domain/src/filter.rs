//! Scene eligibility policy.
//!
//! Rules are evaluated in strict priority order: opt-in label, exclusions,
//! inclusion labels, inclusion patterns, then the global default.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::SceneId;
use crate::scene::SceneDefinition;

/// Label that opts a scene into validation by default.
pub const DEFAULT_OPT_IN_LABEL: &str = "validate";

/// User-facing filter options. Patterns are compiled by [`SceneFilter::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub opt_in_label: Option<String>,
    /// When non-empty, a scene must carry one of these labels.
    pub include_labels: Vec<String>,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub exclude_labels: Vec<String>,
    pub exclude_scene_ids: Vec<SceneId>,
    pub default_validate: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            opt_in_label: Some(DEFAULT_OPT_IN_LABEL.to_string()),
            include_labels: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            exclude_labels: Vec::new(),
            exclude_scene_ids: Vec::new(),
            default_validate: true,
        }
    }
}

/// Why a scene will be validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateReason {
    OptIn,
    IncludeLabel(String),
    IncludePattern(String),
    Default,
}

/// Why a scene will be skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    ExcludedId,
    ExcludedLabel(String),
    ExcludePattern(String),
    MissingLabel,
    NoIncludeMatch,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Validate(ValidateReason),
    Skip(SkipReason),
}

impl FilterDecision {
    #[must_use]
    pub fn should_validate(&self) -> bool {
        matches!(self, Self::Validate(_))
    }
}

impl fmt::Display for ValidateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OptIn => f.write_str("opt-in label"),
            Self::IncludeLabel(label) => write!(f, "carries include label {label:?}"),
            Self::IncludePattern(p) => write!(f, "matches include pattern {p:?}"),
            Self::Default => f.write_str("default policy"),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("not found"),
            Self::ExcludedId => f.write_str("excluded scene id"),
            Self::ExcludedLabel(label) => write!(f, "excluded label {label:?}"),
            Self::ExcludePattern(p) => write!(f, "matches exclude pattern {p:?}"),
            Self::MissingLabel => f.write_str("no include label"),
            Self::NoIncludeMatch => f.write_str("no include pattern matched"),
            Self::Default => f.write_str("default policy"),
        }
    }
}

#[derive(Debug)]
struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    fn compile(source: &str) -> Result<Self, ValidationError> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|err| {
            ValidationError::InvalidPattern {
                pattern: source.to_string(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }
}

fn compile_all(sources: &[String]) -> Result<Vec<Pattern>, ValidationError> {
    sources.iter().map(|s| Pattern::compile(s)).collect()
}

/// Compiled, immutable eligibility policy.
#[derive(Debug)]
pub struct SceneFilter {
    opt_in_label: Option<String>,
    include_labels: Vec<String>,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    exclude_labels: Vec<String>,
    exclude_scene_ids: Vec<SceneId>,
    default_validate: bool,
}

impl SceneFilter {
    /// Compile the patterns of `config`. Patterns match the whole scene name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPattern`] for the first pattern that
    /// fails to compile.
    pub fn new(config: &FilterConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            opt_in_label: config.opt_in_label.clone(),
            include_labels: config.include_labels.clone(),
            include: compile_all(&config.include_patterns)?,
            exclude: compile_all(&config.exclude_patterns)?,
            exclude_labels: config.exclude_labels.clone(),
            exclude_scene_ids: config.exclude_scene_ids.clone(),
            default_validate: config.default_validate,
        })
    }

    /// Decide whether `scene_id` should be validated.
    #[must_use]
    pub fn evaluate(&self, scene_id: &SceneId, scene: Option<&SceneDefinition>) -> FilterDecision {
        let Some(scene) = scene else {
            return FilterDecision::Skip(SkipReason::NotFound);
        };

        if let Some(label) = &self.opt_in_label
            && scene.has_label(label)
        {
            return FilterDecision::Validate(ValidateReason::OptIn);
        }

        if self.exclude_scene_ids.contains(scene_id) {
            return FilterDecision::Skip(SkipReason::ExcludedId);
        }
        if let Some(label) = self.exclude_labels.iter().find(|l| scene.has_label(l)) {
            return FilterDecision::Skip(SkipReason::ExcludedLabel(label.clone()));
        }
        if let Some(p) = self.exclude.iter().find(|p| p.regex.is_match(&scene.name)) {
            return FilterDecision::Skip(SkipReason::ExcludePattern(p.source.clone()));
        }

        if !self.include_labels.is_empty() {
            return match self.include_labels.iter().find(|l| scene.has_label(l)) {
                Some(label) => FilterDecision::Validate(ValidateReason::IncludeLabel(label.clone())),
                None => FilterDecision::Skip(SkipReason::MissingLabel),
            };
        }

        if !self.include.is_empty() {
            return match self.include.iter().find(|p| p.regex.is_match(&scene.name)) {
                Some(p) => FilterDecision::Validate(ValidateReason::IncludePattern(p.source.clone())),
                None => FilterDecision::Skip(SkipReason::NoIncludeMatch),
            };
        }

        if self.default_validate {
            FilterDecision::Validate(ValidateReason::Default)
        } else {
            FilterDecision::Skip(SkipReason::Default)
        }
    }
}
