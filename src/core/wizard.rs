//! NF-005: Recipe wizard state machine.
//!
//! Three linear steps — basic info, build recipe, validate — revisitable
//! in any direction via `goto`. Forward movement is gated by
//! `can_proceed_to_next`: step 0 requires a non-blank name and version,
//! step 1 a non-empty base image, step 2 always passes. The terminal
//! action exports `{name}-{version}.yaml`.

use super::types::ContainerRecipe;
use std::fmt;

/// Wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    BasicInfo,
    BuildRecipe,
    ValidateRecipe,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::BasicInfo,
        WizardStep::BuildRecipe,
        WizardStep::ValidateRecipe,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::BasicInfo => 0,
            Self::BuildRecipe => 1,
            Self::ValidateRecipe => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Info",
            Self::BuildRecipe => "Build Recipe",
            Self::ValidateRecipe => "Validate",
        }
    }

    fn next(&self) -> Option<WizardStep> {
        match self {
            Self::BasicInfo => Some(Self::BuildRecipe),
            Self::BuildRecipe => Some(Self::ValidateRecipe),
            Self::ValidateRecipe => None,
        }
    }

    fn previous(&self) -> Option<WizardStep> {
        match self {
            Self::BasicInfo => None,
            Self::BuildRecipe => Some(Self::BasicInfo),
            Self::ValidateRecipe => Some(Self::BuildRecipe),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The wizard — a recipe under construction plus the current step.
#[derive(Debug, Clone)]
pub struct Wizard {
    recipe: ContainerRecipe,
    step: WizardStep,
}

impl Wizard {
    pub fn new(recipe: ContainerRecipe) -> Self {
        Self {
            recipe,
            step: WizardStep::BasicInfo,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn recipe(&self) -> &ContainerRecipe {
        &self.recipe
    }

    pub fn recipe_mut(&mut self) -> &mut ContainerRecipe {
        &mut self.recipe
    }

    pub fn into_recipe(self) -> ContainerRecipe {
        self.recipe
    }

    /// Whether the current step's gate passes.
    pub fn can_proceed_to_next(&self) -> bool {
        match self.step {
            WizardStep::BasicInfo => {
                !self.recipe.name.trim().is_empty() && !self.recipe.version.trim().is_empty()
            }
            WizardStep::BuildRecipe => !self.recipe.build.neurodocker().base_image.is_empty(),
            WizardStep::ValidateRecipe => true,
        }
    }

    /// Advance one step. Fails when the gate does not pass or the wizard
    /// is already on the last step.
    pub fn next(&mut self) -> Result<WizardStep, String> {
        if !self.can_proceed_to_next() {
            return Err(match self.step {
                WizardStep::BasicInfo => "name and version are required".to_string(),
                WizardStep::BuildRecipe => "base image is required".to_string(),
                WizardStep::ValidateRecipe => "already on the last step".to_string(),
            });
        }
        match self.step.next() {
            Some(step) => {
                self.step = step;
                Ok(step)
            }
            None => Err("already on the last step".to_string()),
        }
    }

    /// Step back, staying put on the first step.
    pub fn back(&mut self) -> WizardStep {
        if let Some(step) = self.step.previous() {
            self.step = step;
        }
        self.step
    }

    /// Jump to any step. Steps are revisitable in both directions.
    pub fn goto(&mut self, step: WizardStep) {
        self.step = step;
    }

    /// Filename the terminal action exports under.
    pub fn export_filename(&self) -> String {
        format!("{}-{}.yaml", self.recipe.name, self.recipe.version)
    }
}
