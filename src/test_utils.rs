use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::object::Object;

/// Expected terminal value of a fixture program, as recorded in its
/// `test_outputs/<name>.json` file. Primitive values are matched natively;
/// anything else is matched against the object's inspect text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Expected {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl Expected {
    pub fn matches(&self, object: &Object) -> bool {
        match (self, object) {
            (Self::Boolean(expected), Object::Boolean(actual)) => expected == actual,
            (Self::Integer(expected), Object::Integer(actual)) => expected == actual,
            (Self::Text(expected), object) => expected == &object.to_string(),
            _ => false,
        }
    }
}

/// Loads `test_inputs/<name>.wb` and its recorded result. A JSON `null`
/// means the program ends on a valueless statement.
pub fn load_fixture(name: &str) -> Result<(String, Option<Expected>)> {
    let base_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let input_path = base_path.join("test_inputs").join(format!("{}.wb", name));
    let source = std::fs::read_to_string(&input_path)
        .with_context(|| format!("reading {}", input_path.display()))?;

    let output_path = base_path.join("test_outputs").join(format!("{}.json", name));
    let recorded = std::fs::read_to_string(&output_path)
        .with_context(|| format!("reading {}", output_path.display()))?;
    let expected = serde_json::from_str(&recorded)
        .with_context(|| format!("parsing {}", output_path.display()))?;

    Ok((source, expected))
}
