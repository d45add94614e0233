//! Example configuration documents for newly attached tools

use stash_fs::{NormalizedPath, ProjectPath, io};
use stash_meta::ExperimentDocument;

use crate::Result;

const FOOTER: &str = "\
# Add your experiment-specific parameters here
# model:
#   name: \"example_model\"
#   parameters:
#     learning_rate: 0.001
#     batch_size: 32
";

/// `configs/example_<id>.yaml` and its `.yml` twin.
pub fn example_config_paths(root: &NormalizedPath, id: &str) -> [NormalizedPath; 2] {
    let configs = root.join(ProjectPath::ConfigsDir);
    [
        configs.join(format!("example_{id}.yaml")),
        configs.join(format!("example_{id}.yml")),
    ]
}

/// Render the example document with its usage comments.
pub fn render_example(id: &str) -> Result<String> {
    let body = ExperimentDocument::example(id)
        .to_yaml()
        .map_err(std::io::Error::other)?;
    Ok(format!(
        "# Example config for {id}\n# Copy this file and modify for your experiments\n\n{body}\n{FOOTER}"
    ))
}

/// Write `configs/example_<id>.yaml`, replacing any existing file.
pub fn write_example_config(root: &NormalizedPath, id: &str) -> Result<NormalizedPath> {
    let [path, _] = example_config_paths(root, id);
    io::write_text(&path, &render_example(id)?)?;
    tracing::info!(path = %path, "wrote example config");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn rendered_example_parses_back() {
        let rendered = render_example("demo").unwrap();
        assert!(rendered.starts_with("# Example config for demo\n"));

        let doc = ExperimentDocument::parse(&rendered).unwrap();
        assert_eq!(doc, ExperimentDocument::example("demo"));
    }

    #[test]
    fn write_overwrites() {
        let temp = TempDir::new().unwrap();
        let root = NormalizedPath::new(temp.path());
        std::fs::create_dir_all(temp.path().join("configs")).unwrap();
        std::fs::write(temp.path().join("configs/example_demo.yaml"), "stale").unwrap();

        let path = write_example_config(&root, "demo").unwrap();
        let content = std::fs::read_to_string(path.to_native()).unwrap();
        assert!(content.contains("tool: demo"));
        assert!(!content.contains("stale"));
    }
}
