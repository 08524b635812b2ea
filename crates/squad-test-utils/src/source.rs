//! [`TestSource`] builder for source store scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary source root laid out like the installer's content.
///
/// # Example
///
/// ```rust,no_run
/// use squad_test_utils::TestSource;
///
/// let source = TestSource::new();
/// source.core_version("1.0.0");
/// source.agent("dev", &[("tasks", "implement-story")]);
/// source.primary_file("tasks/implement-story.md", "# Implement");
/// ```
pub struct TestSource {
    temp_dir: TempDir,
}

impl Default for TestSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSource {
    /// Create an empty source root.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn primary_path(&self, relative: &str) -> PathBuf {
        self.root().join("ai-squad-core").join(relative)
    }

    pub fn shared_path(&self, relative: &str) -> PathBuf {
        self.root().join("common").join(relative)
    }

    pub fn pack_path(&self, pack_id: &str, relative: &str) -> PathBuf {
        self.root()
            .join("expansion-packs")
            .join(pack_id)
            .join(relative)
    }

    /// Write `core-config.yaml` with the given version.
    pub fn core_version(&self, version: &str) -> &Self {
        self.primary_file("core-config.yaml", &format!("version: {version}\n"))
    }

    /// Write a file in the primary store.
    pub fn primary_file(&self, relative: &str, content: &str) -> &Self {
        write(&self.primary_path(relative), content);
        self
    }

    /// Write a file in the shared store.
    pub fn shared_file(&self, relative: &str, content: &str) -> &Self {
        write(&self.shared_path(relative), content);
        self
    }

    /// Write an agent whose header declares `dependencies` as
    /// `(kind, id)` pairs.
    pub fn agent(&self, id: &str, dependencies: &[(&str, &str)]) -> &Self {
        self.primary_file(&format!("agents/{id}.md"), &agent_markdown(id, dependencies))
    }

    pub fn team(&self, id: &str, agents: &[&str], workflows: &[&str]) -> &Self {
        self.primary_file(&format!("agent-teams/{id}.yaml"), &team_yaml(id, agents, workflows))
    }

    /// Create a pack directory with a `config.yaml`.
    pub fn pack(&self, pack_id: &str, name: &str, version: &str) -> &Self {
        self.pack_file(
            pack_id,
            "config.yaml",
            &format!("name: {name}\nversion: {version}\ndescription: {name} for tests\n"),
        )
    }

    pub fn pack_file(&self, pack_id: &str, relative: &str, content: &str) -> &Self {
        write(&self.pack_path(pack_id, relative), content);
        self
    }

    pub fn pack_agent(&self, pack_id: &str, id: &str, dependencies: &[(&str, &str)]) -> &Self {
        self.pack_file(pack_id, &format!("agents/{id}.md"), &agent_markdown(id, dependencies))
    }

    /// A small but complete source: meta agents, three agents sharing a
    /// task, two teams, a shared fallback resource, and one pack.
    ///
    /// - `dev` and `qa` both need `tasks/execute-checklist.md`
    /// - `pm` needs `data/technical-preferences.md`, only in the shared
    ///   store, and `utils/missing-util.md`, which exists nowhere
    /// - the `infra` pack's agent needs the core task `execute-checklist`
    pub fn standard() -> Self {
        let source = Self::new();
        source
            .core_version("1.0.0")
            .agent("ai-squad-orchestrator", &[("data", "kb")])
            .agent("ai-squad-master", &[])
            .agent(
                "dev",
                &[
                    ("tasks", "execute-checklist"),
                    ("tasks", "implement-story"),
                    ("checklists", "story-dod-checklist"),
                ],
            )
            .agent("qa", &[("tasks", "execute-checklist"), ("tasks", "review-story")])
            .agent(
                "pm",
                &[
                    ("templates", "prd-tmpl.yaml"),
                    ("data", "technical-preferences"),
                    ("utils", "missing-util"),
                ],
            )
            .primary_file("tasks/execute-checklist.md", "# Execute checklist\n")
            .primary_file("tasks/implement-story.md", "# Implement story\n")
            .primary_file("tasks/review-story.md", "# Review story\n")
            .primary_file("checklists/story-dod-checklist.md", "# Definition of done\n")
            .primary_file("templates/prd-tmpl.yaml", "template:\n  id: prd\n")
            .primary_file("data/kb.md", "# Knowledge base\n")
            .primary_file("workflows/greenfield.yaml", "workflow:\n  id: greenfield\n")
            .team("team-dev", &["dev", "qa"], &["greenfield.yaml"])
            .team("team-all", &["*"], &["greenfield.yaml", "brownfield.yaml"])
            .shared_file(
                "data/technical-preferences.md",
                "Preferences live in {root}/data\n",
            )
            .shared_file(
                "utils/workflow-management.md",
                "Workflows are in {root}/workflows and {root}/agent-teams\n",
            )
            .shared_file("tasks/execute-checklist.md", "# Shared copy, shadowed\n")
            .pack("infra", "Infrastructure Pack", "1.0.0")
            .pack_agent(
                "infra",
                "infra-architect",
                &[
                    ("tasks", "execute-checklist"),
                    ("tasks", "infra-review"),
                    ("templates", "infra-tmpl.yaml"),
                ],
            )
            .pack_file("infra", "tasks/infra-review.md", "# Infra review\n")
            .pack_file("infra", "templates/infra-tmpl.yaml", "template:\n  id: infra\n")
            .pack_file("infra", "agent-teams/infra-team.yaml", &team_yaml("infra-team", &["infra-architect", "dev"], &[]))
            .pack_file("infra", "README.md", "# Infra pack\n");
        source
    }
}

/// Agent markdown with a fenced yaml header.
pub fn agent_markdown(id: &str, dependencies: &[(&str, &str)]) -> String {
    let mut header = format!(
        "agent:\n  id: {id}\n  name: {id}\ncommands:\n  - help: Show commands: numbered list\n  - exit: Leave the persona\n"
    );
    if !dependencies.is_empty() {
        header.push_str("dependencies:\n");
        let mut kinds: Vec<&str> = dependencies.iter().map(|(kind, _)| *kind).collect();
        kinds.dedup();
        for kind in kinds {
            header.push_str(&format!("  {kind}:\n"));
            for (_, dep) in dependencies.iter().filter(|(k, _)| *k == kind) {
                header.push_str(&format!("    - {dep}\n"));
            }
        }
    }
    format!("# {id}\n\nActivation notes.\n\n```yaml\n{header}```\n")
}

pub fn team_yaml(id: &str, agents: &[&str], workflows: &[&str]) -> String {
    let list = |items: &[&str]| {
        items
            .iter()
            .map(|item| format!("  - \"{item}\"\n"))
            .collect::<String>()
    };
    format!(
        "bundle:\n  name: {id}\nagents:\n{}workflows:\n{}",
        list(agents),
        list(workflows)
    )
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
