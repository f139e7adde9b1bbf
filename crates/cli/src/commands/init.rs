//! trellis init command

use clap::Args;
use shared::PolicyDocument;
use std::path::{Path, PathBuf};

/// Default policy file name
pub const POLICY_FILE: &str = "trellis.yaml";

const STARTER_POLICY: &str = r#"# Trellis policy
#
# Roles and resources form single-parent trees. Rules are applied in order
# and later rules take precedence. Omit role/resource for "any", omit
# privileges for "all privileges".

roles:
  - id: guest
  - id: staff
    parent: guest
  - id: editor
    parent: staff
  - id: administrator
  - id: marketing
    parent: staff

resources:
  - id: newsletter
  - id: news
  - id: latest
    parent: news
  - id: announcement
    parent: news

rules:
  - type: allow
    role: guest
    privileges: [view]
  - type: allow
    role: staff
    privileges: [edit, submit, revise]
  - type: allow
    role: editor
    privileges: [publish, archive, delete]
  - type: allow
    role: administrator
  - type: allow
    role: marketing
    resource: newsletter
    privileges: [publish, archive]
  - type: allow
    role: marketing
    resource: latest
    privileges: [publish, archive]
  - type: deny
    role: staff
    resource: latest
    privileges: [revise]
  - type: deny
    resource: announcement
    privileges: [archive]
"#;

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Directory to initialize
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Write an empty policy instead of the example one
    #[arg(long)]
    pub minimal: bool,

    /// Overwrite an existing policy file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        let path = self.write_policy()?;
        println!("✓ Policy written to {}", path.display());
        Ok(())
    }

    fn write_policy(&self) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(POLICY_FILE);

        if path.exists() && !self.force {
            anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
        }

        let content = if self.minimal {
            PolicyDocument::default().to_yaml_string()?
        } else {
            STARTER_POLICY.to_string()
        };
        write_file(&path, &content)?;
        Ok(path)
    }
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(path, content)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote policy file");
    Ok(())
}
