use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ResultLogExt;
use crate::graph::Node;
use crate::report::Runner;

use super::{Error, Result, Scenario, ScenarioSpec};

/// Environment variable overriding the scenario lookup directory.
pub const SCENARIO_DIR_ENV: &str = "PIPECHECK_SCENARIO_DIR";

const DEFAULT_SCENARIO_DIR: &str = "scenarios";

/// Produces [`Scenario`] objects by name.
///
/// Returning `None` means the scenario is unavailable; the requesting
/// monitor stays scenario-less.
pub trait ScenarioFactory: Send + Sync {
    fn create(&self, runner: &Arc<Runner>, target: &Node, name: &str) -> Option<Arc<Scenario>>;
}

/// Looks scenarios up as `<dir>/<name>.json` files.
pub struct FileScenarioFactory {
    dir: PathBuf,
}

impl FileScenarioFactory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Builds a factory rooted at [`SCENARIO_DIR_ENV`], falling back to
    /// `scenarios/` relative to the working directory.
    pub fn from_env() -> Self {
        let dir = std::env::var_os(SCENARIO_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCENARIO_DIR));
        Self::new(dir)
    }

    fn load(&self, name: &str) -> Result<ScenarioSpec> {
        let path = self.dir.join(format!("{name}.json"));
        let file = File::open(&path).map_err(|source| Error::ScenarioOpen {
            path: path.clone(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|source| Error::ScenarioParse { path, source })
    }
}

impl ScenarioFactory for FileScenarioFactory {
    fn create(&self, runner: &Arc<Runner>, target: &Node, name: &str) -> Option<Arc<Scenario>> {
        let spec = self.load(name).ok_logged("failed to load scenario")?;
        log::info!(
            "loaded scenario `{}` ({} steps) for pipeline `{}`",
            name,
            spec.steps.len(),
            target.name()
        );
        Some(Arc::new(Scenario::new(
            name,
            target.clone(),
            Arc::clone(runner),
            spec.description,
            spec.steps,
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_scenario(dir: &std::path::Path, name: &str, contents: &str) {
        let mut file = File::create(dir.join(format!("{name}.json"))).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn test_create_loads_scenario_file() {
        let dir = tempfile::tempdir().unwrap();
        write_scenario(
            dir.path(),
            "seek-and-pause",
            r#"{
                "description": "seek forward, then pause",
                "steps": [
                    {"action": "seek", "params": {"position": 5.0}},
                    {"action": "pause"}
                ]
            }"#,
        );

        let factory = FileScenarioFactory::new(dir.path());
        let runner = Arc::new(Runner::default());
        let pipeline = Node::pipeline("pipeline0").unwrap();

        let scenario = factory.create(&runner, &pipeline, "seek-and-pause").unwrap();
        assert_eq!(scenario.name(), "seek-and-pause");
        assert_eq!(scenario.target().id(), pipeline.id());
        assert_eq!(scenario.description(), Some("seek forward, then pause"));
        assert_eq!(scenario.steps().len(), 2);
        assert_eq!(scenario.steps()[0].action, "seek");
        assert!(scenario.steps()[1].params.is_empty());
    }

    #[test]
    fn test_create_missing_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let factory = FileScenarioFactory::new(dir.path());
        let runner = Arc::new(Runner::default());
        let pipeline = Node::pipeline("pipeline0").unwrap();

        assert!(factory.create(&runner, &pipeline, "nope").is_none());
    }

    #[test]
    fn test_create_malformed_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        write_scenario(dir.path(), "broken", "{ not json");

        let factory = FileScenarioFactory::new(dir.path());
        let runner = Arc::new(Runner::default());
        let pipeline = Node::pipeline("pipeline0").unwrap();

        assert!(factory.create(&runner, &pipeline, "broken").is_none());
    }

    #[test]
    fn test_load_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let factory = FileScenarioFactory::new(dir.path());
        let err = factory.load("missing").unwrap_err();
        match err {
            Error::ScenarioOpen { path, .. } => {
                assert!(path.ends_with("missing.json"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
