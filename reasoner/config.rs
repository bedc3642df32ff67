//! Reasoner configuration.

use std::path::PathBuf;

use tempo_solver::{EngineConfig, OnUnsatisfiable};
use tempo_syntax::ActionSet;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The step variable of incremental program sections.
    pub incremental_var: String,

    /// Which fluents are actions, for plan projection.
    pub actions: ActionSet,

    /// Whether a late `UNSATISFIABLE` voids atom groups already read.
    /// Plan and state readings always discard them.
    pub on_unsatisfiable: OnUnsatisfiable,

    /// Where queries are staged and run.
    pub working_directory: PathBuf,

    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            incremental_var: String::from("n"),
            actions: ActionSet::default(),
            on_unsatisfiable: OnUnsatisfiable::default(),
            working_directory: std::env::temp_dir().join("tempo"),
            engine: EngineConfig::default(),
        }
    }
}
