//! Scene: a named collection of per-entity target states applied together.
//!
//! A [`SceneDefinition`] is immutable once built. Validation runs share it
//! through an `Arc` held by the [`SceneCatalog`].

mod catalog;
mod command;

pub use catalog::SceneCatalog;
pub use command::EntityCommand;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{SceneGuardError, ValidationError};
use crate::id::{ResourceId, SceneId};

/// How activations of a scene are observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    /// Discrete recall events carrying a "last recalled" timestamp.
    #[default]
    Recall,
    /// Continuous scenes exposing an active/inactive status.
    Transition,
}

/// CIE 1931 xy chromaticity coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorXy {
    pub x: f64,
    pub y: f64,
}

impl ColorXy {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Target state for a single entity within a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetAction {
    /// Opaque external resource id; resolved to a local entity at run time.
    pub target: ResourceId,
    pub on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_xy: Option<ColorXy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_mirek: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

impl TargetAction {
    /// A target that only switches the entity on or off.
    #[must_use]
    pub fn switch(target: ResourceId, on: bool) -> Self {
        Self {
            target,
            on,
            brightness_pct: None,
            color_xy: None,
            color_mirek: None,
            effect: None,
        }
    }

    #[must_use]
    pub fn with_brightness(mut self, pct: f64) -> Self {
        self.brightness_pct = Some(pct);
        self
    }

    #[must_use]
    pub fn with_color_xy(mut self, x: f64, y: f64) -> Self {
        self.color_xy = Some(ColorXy::new(x, y));
        self
    }

    #[must_use]
    pub fn with_color_mirek(mut self, mirek: f64) -> Self {
        self.color_mirek = Some(mirek);
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for brightness outside `0..=100`,
    /// xy components outside `0..=1`, or a non-positive mirek value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(pct) = self.brightness_pct
            && !(0.0..=100.0).contains(&pct)
        {
            return Err(ValidationError::BrightnessOutOfRange(pct));
        }
        if let Some(ColorXy { x, y }) = self.color_xy
            && !((0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y))
        {
            return Err(ValidationError::ColorOutOfRange { x, y });
        }
        if let Some(mirek) = self.color_mirek
            && mirek.partial_cmp(&0.0) != Some(std::cmp::Ordering::Greater)
        {
            return Err(ValidationError::InvalidMirek(mirek));
        }
        Ok(())
    }
}

/// The persisted definition of a scene: what every member entity should
/// look like once the scene is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDefinition {
    pub id: SceneId,
    pub name: String,
    pub kind: SceneKind,
    pub labels: BTreeSet<String>,
    pub actions: Vec<TargetAction>,
}

impl SceneDefinition {
    /// Create a builder for constructing a [`SceneDefinition`].
    #[must_use]
    pub fn builder() -> SceneDefinitionBuilder {
        SceneDefinitionBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SceneGuardError::Validation`] when the name is empty or any
    /// target action carries an out-of-range value.
    pub fn validate(&self) -> Result<(), SceneGuardError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        for action in &self.actions {
            action.validate()?;
        }
        Ok(())
    }

    /// Whether the scene carries `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

/// Step-by-step builder for [`SceneDefinition`].
#[derive(Debug, Default)]
pub struct SceneDefinitionBuilder {
    id: Option<SceneId>,
    name: Option<String>,
    kind: SceneKind,
    labels: BTreeSet<String>,
    actions: Vec<TargetAction>,
}

impl SceneDefinitionBuilder {
    #[must_use]
    pub fn id(mut self, id: SceneId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: SceneKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: TargetAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Consume the builder, validate, and return a [`SceneDefinition`].
    ///
    /// # Errors
    ///
    /// Returns [`SceneGuardError::Validation`] if the id is missing or any
    /// invariant of [`SceneDefinition::validate`] fails.
    pub fn build(self) -> Result<SceneDefinition, SceneGuardError> {
        let scene = SceneDefinition {
            id: self.id.ok_or(ValidationError::EmptyId)?,
            name: self.name.unwrap_or_default(),
            kind: self.kind,
            labels: self.labels,
            actions: self.actions,
        };
        scene.validate()?;
        Ok(scene)
    }
}
