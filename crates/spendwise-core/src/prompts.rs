//! Prompt library for the advisory contracts
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/spendwise/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Users can tune the wording sent to their model without rebuilding, while
//! still picking up new default prompts on upgrade.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const SPENDING_ADVISOR: &str = include_str!("../../../prompts/spending_advisor.md");
    pub const LIFESTYLE_GUIDE: &str = include_str!("../../../prompts/lifestyle_guide.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Personalized suggestions for cutting spending
    SpendingAdvisor,
    /// Lifestyle advice plus over-leveraging tips
    LifestyleGuide,
}

impl PromptId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpendingAdvisor => "spending_advisor",
            Self::LifestyleGuide => "lifestyle_guide",
        }
    }

    pub fn all() -> &'static [PromptId] {
        &[Self::SpendingAdvisor, Self::LifestyleGuide]
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::SpendingAdvisor => defaults::SPENDING_ADVISOR,
            Self::LifestyleGuide => defaults::LIFESTYLE_GUIDE,
        }
    }
}

impl std::str::FromStr for PromptId {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "spending_advisor" | "spending" => Ok(Self::SpendingAdvisor),
            "lifestyle_guide" | "lifestyle" => Ok(Self::LifestyleGuide),
            _ => Err(Error::NotFound(format!("prompt '{}'", s))),
        }
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    pub id: String,
    /// Bumped whenever the default wording changes
    pub version: u32,
    /// Task key used to look up model and timeout settings
    pub task_type: String,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// The prompt content (system + user sections)
    pub content: String,
    pub is_override: bool,
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the whole prompt with template variables replaced
    pub fn render(&self, vars: &HashMap<&str, String>) -> String {
        render_template(&self.content, vars)
    }

    /// Render just the user section, or the whole prompt if it has none
    pub fn render_user(&self, vars: &HashMap<&str, String>) -> String {
        match self.user_section() {
            Some(user) => render_template(user, vars),
            None => self.render(vars),
        }
    }

    /// Render the system section, if present
    pub fn render_system(&self, vars: &HashMap<&str, String>) -> Option<String> {
        self.system_section().map(|s| render_template(s, vars))
    }
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a new prompt library with default paths
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Library that ignores override files
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        match self.cache.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let prompt = load(self.override_dir.as_ref(), id)?;
                Ok(entry.insert(prompt))
            }
        }
    }

    /// List all prompts with their override status
    pub fn list(&mut self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| {
                let override_path = self.override_path(id).filter(|p| p.exists());
                let prompt = self.get(id).ok();
                PromptInfo {
                    id: id.as_str().to_string(),
                    version: prompt.map(|p| p.metadata.version).unwrap_or(0),
                    task_type: prompt
                        .map(|p| p.metadata.task_type.clone())
                        .unwrap_or_default(),
                    has_override: override_path.is_some(),
                    override_path,
                }
            })
            .collect()
    }

    pub fn has_override(&self, id: PromptId) -> bool {
        self.override_path(id).is_some_and(|p| p.exists())
    }

    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    fn override_path(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|d| d.join(format!("{}.md", id.as_str())))
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a prompt for listing
#[derive(Debug, Clone)]
pub struct PromptInfo {
    pub id: String,
    pub version: u32,
    pub task_type: String,
    pub has_override: bool,
    pub override_path: Option<PathBuf>,
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendwise").join("prompts").join("overrides"))
}

/// Load a prompt (checking override first, then default)
fn load(override_dir: Option<&PathBuf>, id: PromptId) -> Result<Prompt> {
    if let Some(dir) = override_dir {
        let override_path = dir.join(format!("{}.md", id.as_str()));
        if override_path.exists() {
            let content = fs::read_to_string(&override_path).map_err(|e| {
                Error::Config(format!("Failed to read prompt override: {}", e))
            })?;
            let (metadata, body) = parse_prompt(&content)?;
            return Ok(Prompt {
                metadata,
                content: body,
                is_override: true,
                override_path: Some(override_path),
            });
        }
    }

    let (metadata, body) = parse_prompt(id.default_content())?;
    Ok(Prompt {
        metadata,
        content: body,
        is_override: false,
        override_path: None,
    })
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    let rest = content.strip_prefix("---").ok_or_else(|| {
        Error::Config("Prompt must start with YAML frontmatter (---)".into())
    })?;

    let end = rest.find("---").ok_or_else(|| {
        Error::Config("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::Config(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Render a template in one left-to-right pass.
///
/// `{{#if var}}...{{/if}}` keeps its body when `var` is non-empty. `{{var}}`
/// is replaced by its value; unknown names stay as written. Inserted values
/// are never scanned again, so user text containing braces passes through.
fn render_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let inner = &rest[open + 2..];
        let Some(close) = inner.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let tag = inner[..close].trim();
        let after = &inner[close + 2..];

        if let Some(var_name) = tag.strip_prefix("#if ") {
            let keep = vars
                .get(var_name.trim())
                .is_some_and(|v| !v.trim().is_empty());
            rest = if keep { after } else { skip_block(after) };
        } else if tag == "/if" {
            rest = after;
        } else if let Some(value) = vars.get(tag) {
            out.push_str(value);
            rest = after;
        } else {
            out.push_str(&rest[open..open + 2 + close + 2]);
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

/// Skip past the `{{/if}}` closing the current block, honouring nesting
fn skip_block(content: &str) -> &str {
    let mut depth = 1usize;
    let mut rest = content;

    while let Some(open) = rest.find("{{") {
        let inner = &rest[open + 2..];
        let Some(close) = inner.find("}}") else {
            return "";
        };
        let tag = inner[..close].trim();
        rest = &inner[close + 2..];

        if tag.starts_with("#if ") {
            depth += 1;
        } else if tag == "/if" {
            depth -= 1;
            if depth == 0 {
                return rest;
            }
        }
    }

    ""
}
