//! Scenario selection and loading.
//!
//! A scenario is a named validation script attached to a pipeline monitor.
//! Which scenario (if any) gets attached is driven by a selector string of
//! the form `name` or `name:pattern`; the pattern restricts attachment to
//! pipelines whose name matches the shell glob. Execution of a loaded
//! scenario is the job of an external engine; this module only selects,
//! loads, and binds.

use std::sync::Arc;

use crate::graph::Node;
use crate::report::Runner;

mod error;
mod factory;
mod selector;

pub use error::{Error, Result};
pub use factory::{FileScenarioFactory, SCENARIO_DIR_ENV, ScenarioFactory};
pub use selector::{NamePattern, SCENARIO_ENV, ScenarioSelector};

/// One step of a scenario script: an action name plus free-form parameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScenarioStep {
    pub action: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// On-disk scenario description.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

/// A named validation script bound to a pipeline and the tree's runner.
///
/// Held by the pipeline's container monitor for the monitor's whole
/// lifetime; never reassigned.
#[derive(Debug)]
pub struct Scenario {
    name: String,
    target: Node,
    runner: Arc<Runner>,
    description: Option<String>,
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        target: Node,
        runner: Arc<Runner>,
        description: Option<String>,
        steps: Vec<ScenarioStep>,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            runner,
            description,
            steps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &Node {
        &self.target
    }

    pub fn runner(&self) -> &Arc<Runner> {
        &self.runner
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn steps(&self) -> &[ScenarioStep] {
        &self.steps
    }
}
