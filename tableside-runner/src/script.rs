//! Scripted composition: a TOML list of cart operations replayed against a
//! catalog, the way a waiter would tap them in.
//!
//! ```toml
//! [[steps]]
//! op = "add"
//! item = 1
//!
//! [[steps]]
//! op = "exclude"
//! key = "1::"
//! ingredient = "Cheese"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tableside_core::{Cart, CartError, Catalog, LineKey, MenuItemId};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("read script file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse script TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("step {step}: menu item {item} is not on the menu")]
    UnknownItem { step: usize, item: MenuItemId },
}

/// One cart operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add { item: MenuItemId },
    SetQuantity { key: LineKey, quantity: u32 },
    Remove { key: LineKey },
    Exclude { key: LineKey, ingredient: String },
    Include { key: LineKey, ingredient: String },
    Clear,
}

/// What happened to a single step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The cart changed. Carries the key now holding the affected unit, for
    /// steps that produce one.
    Applied(Option<LineKey>),
    /// Stale key or an ingredient toggle that did not apply.
    NoOp,
    /// The cart refused the step; replay continues.
    Rejected(CartError),
}

/// Summary of a replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    pub outcomes: Vec<StepOutcome>,
}

impl ReplayReport {
    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StepOutcome::Applied(_)))
            .count()
    }

    pub fn noops(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StepOutcome::NoOp))
            .count()
    }

    /// Rejected steps with their 1-based step numbers.
    pub fn rejected(&self) -> Vec<(usize, &CartError)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| match o {
                StepOutcome::Rejected(err) => Some((i + 1, err)),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply every step to `cart` in order.
    ///
    /// Unknown menu items abort the replay; cart validation failures are
    /// recorded and the replay moves on.
    pub fn replay(&self, catalog: &Catalog, cart: &mut Cart) -> Result<ReplayReport, ScriptError> {
        let mut report = ReplayReport::default();

        for (i, step) in self.steps.iter().enumerate() {
            let outcome = apply_step(step, catalog, cart).map_err(|item| {
                ScriptError::UnknownItem {
                    step: i + 1,
                    item,
                }
            })?;
            debug!(step = i + 1, ?step, ?outcome, "replayed step");
            report.outcomes.push(outcome);
        }

        Ok(report)
    }
}

/// Apply one step. `Err` carries an item id missing from the catalog.
fn apply_step(step: &Step, catalog: &Catalog, cart: &mut Cart) -> Result<StepOutcome, MenuItemId> {
    let outcome = match step {
        Step::Add { item } => {
            let menu_item = catalog.item(*item).ok_or(*item)?;
            match cart.add_item(menu_item) {
                Ok(key) => StepOutcome::Applied(Some(key)),
                Err(err) => StepOutcome::Rejected(err),
            }
        }
        Step::SetQuantity { key, quantity } => {
            if cart.line(key).is_none() {
                StepOutcome::NoOp
            } else {
                cart.set_quantity(key, *quantity);
                StepOutcome::Applied(cart.line(key).map(|l| l.key()))
            }
        }
        Step::Remove { key } => {
            if cart.line(key).is_none() {
                StepOutcome::NoOp
            } else {
                cart.remove_line(key);
                StepOutcome::Applied(None)
            }
        }
        Step::Exclude { key, ingredient } => match cart.exclude_ingredient(key, ingredient) {
            Some(new_key) => StepOutcome::Applied(Some(new_key)),
            None => StepOutcome::NoOp,
        },
        Step::Include { key, ingredient } => match cart.include_ingredient(key, ingredient) {
            Some(new_key) => StepOutcome::Applied(Some(new_key)),
            None => StepOutcome::NoOp,
        },
        Step::Clear => {
            cart.clear();
            StepOutcome::Applied(None)
        }
    };
    Ok(outcome)
}
