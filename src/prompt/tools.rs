//! Target-tool profiles.
//!
//! Every downstream tool string maps to exactly one [`ToolCategory`]; unknown
//! or malformed strings fall through to [`ToolCategory::General`].

use serde::{Deserialize, Serialize};

/// Full-stack / no-code app builders.
pub const BUILDER_TOOLS: &[&str] = &[
    "lovable",
    "bolt",
    "bolt.new",
    "v0",
    "replit",
    "replit-agent",
    "base44",
    "create",
    "tempo",
    "firebase-studio",
];

/// Coding agents working inside an existing repository.
pub const AGENT_TOOLS: &[&str] = &[
    "cursor",
    "windsurf",
    "claude-code",
    "copilot",
    "github-copilot",
    "cline",
    "roo-code",
    "aider",
    "devin",
    "codex",
    "gemini-cli",
];

/// Design generators and prompt-ops tools.
pub const DESIGN_TOOLS: &[&str] = &[
    "figma",
    "figma-make",
    "uizard",
    "galileo",
    "stitch",
    "relume",
    "framer",
    "promptlayer",
];

/// Prompt-optimisation category of a target tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Builder,
    Agent,
    Designer,
    General,
}

impl ToolCategory {
    /// Categorise a free-text tool identifier. Total: never fails.
    pub fn of(tool: &str) -> Self {
        let key = tool.trim().to_ascii_lowercase();
        if BUILDER_TOOLS.contains(&key.as_str()) {
            Self::Builder
        } else if AGENT_TOOLS.contains(&key.as_str()) {
            Self::Agent
        } else if DESIGN_TOOLS.contains(&key.as_str()) {
            Self::Designer
        } else {
            Self::General
        }
    }

    /// Strategy block appended to the instruction for this category.
    pub const fn strategy(self) -> &'static str {
        match self {
            Self::Builder => BUILDER_STRATEGY,
            Self::Agent => AGENT_STRATEGY,
            Self::Designer => DESIGN_STRATEGY,
            Self::General => GENERAL_STRATEGY,
        }
    }
}

const BUILDER_STRATEGY: &str = "\
TARGET TOOL STRATEGY (full-stack app builder):
- Open with a one-paragraph product vision and the primary user.
- List pages/screens and the core user flows through them, in build order.
- Describe the data model as entities with fields and relations.
- Name auth, storage and third-party integrations explicitly.
- Specify the visual style (palette, typography, layout density) in concrete words.
- Split the build into small incremental milestones the builder can verify one at a time.";

const AGENT_STRATEGY: &str = "\
TARGET TOOL STRATEGY (coding agent):
- State the goal, then the constraints the agent must respect (stack, versions, conventions).
- Reference files, modules and interfaces by path and name where they are known.
- Break the work into ordered, independently reviewable steps.
- Give acceptance criteria per step, including the tests to add or run.
- Call out what must NOT change (public APIs, schemas, unrelated files).
- Ask the agent to report assumptions instead of guessing silently.";

const DESIGN_STRATEGY: &str = "\
TARGET TOOL STRATEGY (design / prompt-ops tool):
- Describe screens as component hierarchies with states (empty, loading, error, filled).
- Specify the design system: spacing scale, colour tokens, type ramp, corner radius.
- Describe interactions and transitions explicitly.
- Name the target breakpoints and how layouts adapt.
- Keep each prompt focused on one screen or flow; list follow-up prompts separately.";

const GENERAL_STRATEGY: &str = "\
TARGET TOOL STRATEGY (general-purpose LLM):
- Assign a clear expert role and state the objective in one sentence.
- Provide context, constraints and the expected output format.
- Use headings and numbered lists so the answer can be followed step by step.
- Ask for reasoning on trade-offs where several approaches are viable.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tools_map_to_their_category() {
        assert_eq!(ToolCategory::of("lovable"), ToolCategory::Builder);
        assert_eq!(ToolCategory::of("Cursor"), ToolCategory::Agent);
        assert_eq!(ToolCategory::of("  figma  "), ToolCategory::Designer);
    }

    #[test]
    fn everything_else_is_general() {
        for tool in ["general", "", "   ", "unknown-tool", "cursor!", "💥"] {
            assert_eq!(ToolCategory::of(tool), ToolCategory::General, "{tool:?}");
        }
    }

    #[test]
    fn membership_sets_are_disjoint() {
        for tool in BUILDER_TOOLS {
            assert!(!AGENT_TOOLS.contains(tool) && !DESIGN_TOOLS.contains(tool));
        }
        for tool in AGENT_TOOLS {
            assert!(!DESIGN_TOOLS.contains(tool));
        }
    }

    #[test]
    fn each_category_has_a_distinct_strategy() {
        let all = [
            ToolCategory::Builder,
            ToolCategory::Agent,
            ToolCategory::Designer,
            ToolCategory::General,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.strategy(), b.strategy());
            }
        }
    }
}
