//! Parsing agent headers and team files

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::source::ResourceKind;
use crate::{Error, Result};

/// First fenced yaml block in an agent markdown file.
static HEADER_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```ya?ml[ \t]*\r?\n(.*?)```").unwrap());

/// `- name: free text` entries under `commands:`.
static COMMAND_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*-\s*)([^:\s][^:]*?)\s*:.*$").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DependencyLists {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub templates: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checklists: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub utils: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub workflows: Vec<String>,
}

impl DependencyLists {
    pub fn ids(&self, kind: ResourceKind) -> &[String] {
        match kind {
            ResourceKind::Tasks => &self.tasks,
            ResourceKind::Templates => &self.templates,
            ResourceKind::Checklists => &self.checklists,
            ResourceKind::Data => &self.data,
            ResourceKind::Utils => &self.utils,
            ResourceKind::Workflows => &self.workflows,
        }
    }

    /// Every declared dependency in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &str)> {
        ResourceKind::ALL
            .into_iter()
            .flat_map(move |kind| self.ids(kind).iter().map(move |id| (kind, id.as_str())))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentIdentity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// The structured header of an agent file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentHeader {
    #[serde(default)]
    pub agent: Option<AgentIdentity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: DependencyLists,
}

/// A team file: the agents it composes and the workflows it ships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TeamDefinition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub workflows: Vec<String>,
}

/// Empty yaml keys (`tasks:` with nothing under it) deserialize as null.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reduce `- name: description` command entries to `- name`.
///
/// Descriptions are free text and routinely contain characters that are
/// not valid YAML scalars.
fn clean_commands(header: &str) -> String {
    let mut cleaned = Vec::new();
    let mut commands_indent: Option<usize> = None;

    for line in header.lines() {
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();

        if let Some(base) = commands_indent {
            if !trimmed.is_empty() && indent <= base && !trimmed.starts_with('-') {
                commands_indent = None;
            } else if let Some(caps) = COMMAND_ENTRY.captures(line) {
                cleaned.push(format!("{}{}", &caps[1], caps[2].trim()));
                continue;
            }
        }

        if trimmed == "commands:" {
            commands_indent = Some(indent);
        }
        cleaned.push(line.to_string());
    }

    cleaned.join("\n")
}

/// Extract and parse the header of the agent file at `path`.
pub fn parse_agent_header(unit: &str, path: &Path, content: &str) -> Result<AgentHeader> {
    let malformed = |reason: String| Error::UnitDefinitionMalformed {
        unit: unit.to_string(),
        path: path.to_path_buf(),
        reason,
    };

    let block = HEADER_BLOCK
        .captures(content)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| malformed("no yaml header block".to_string()))?;

    let cleaned = clean_commands(block.as_str());
    serde_yaml::from_str(&cleaned).map_err(|e| malformed(e.to_string()))
}

pub fn parse_team(unit: &str, path: &Path, content: &str) -> Result<TeamDefinition> {
    serde_yaml::from_str(content).map_err(|e| Error::UnitDefinitionMalformed {
        unit: unit.to_string(),
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AGENT: &str = r#"# dev

Some prose before the header.

```yaml
agent:
  id: dev
  name: James
commands:
  - help: Show numbered list of the following commands: to allow selection
  - run-tests: Execute linting and tests
  - exit
dependencies:
  tasks:
    - execute-checklist
  checklists:
    - story-dod-checklist
```

```yaml
ignored: second block
```
"#;

    #[test]
    fn parses_dependencies_from_first_block() {
        let header = parse_agent_header("dev", Path::new("dev.md"), AGENT).unwrap();

        assert_eq!(header.agent.unwrap().name.as_deref(), Some("James"));
        assert_eq!(header.dependencies.tasks, vec!["execute-checklist"]);
        let all: Vec<_> = header.dependencies.iter().collect();
        assert_eq!(
            all,
            vec![
                (ResourceKind::Tasks, "execute-checklist"),
                (ResourceKind::Checklists, "story-dod-checklist"),
            ]
        );
    }

    #[test]
    fn command_descriptions_are_stripped() {
        let cleaned = clean_commands("commands:\n  - help: a: b\n  - exit\nother: 1");
        assert_eq!(cleaned, "commands:\n  - help\n  - exit\nother: 1");
    }

    #[test]
    fn entries_outside_commands_are_untouched() {
        let source = "dependencies:\n  tasks:\n    - a\nnotes:\n  - key: value";
        assert_eq!(clean_commands(source), source);
    }

    #[test]
    fn empty_dependency_keys_are_empty_lists() {
        let content = "```yml\ndependencies:\n  tasks:\n  data:\n    - kb\n```";
        let header = parse_agent_header("pm", Path::new("pm.md"), content).unwrap();
        assert!(header.dependencies.tasks.is_empty());
        assert_eq!(header.dependencies.data, vec!["kb"]);
    }

    #[test]
    fn missing_header_is_malformed() {
        let err = parse_agent_header("qa", Path::new("qa.md"), "# just prose").unwrap_err();
        assert!(matches!(err, Error::UnitDefinitionMalformed { .. }));
    }

    #[test]
    fn team_with_bad_yaml_is_malformed() {
        let err = parse_team("team-x", Path::new("team-x.yaml"), "agents: [unclosed").unwrap_err();
        assert!(matches!(err, Error::UnitDefinitionMalformed { .. }));
    }

    #[test]
    fn parses_team() {
        let team = parse_team(
            "team-fullstack",
            Path::new("t.yaml"),
            "bundle:\n  name: Full\nagents:\n  - pm\n  - '*'\nworkflows:\n  - greenfield\n",
        )
        .unwrap();
        assert_eq!(team.agents, vec!["pm", "*"]);
        assert_eq!(team.workflows, vec!["greenfield"]);
    }
}
