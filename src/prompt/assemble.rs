//! Prompt assembly: raw input + options → composed payload.

use serde::{Deserialize, Serialize};

use super::options::{EnhancementOptions, GenerationMode};
use super::tools::ToolCategory;

/// Model used when extended reasoning is off.
pub const DEFAULT_STANDARD_MODEL: &str = "gemini-2.5-flash";
/// Model used when extended reasoning is on.
pub const DEFAULT_REASONING_MODEL: &str = "gemini-2.5-pro";
/// Reasoning budget (tokens) for extended-reasoning requests.
pub const THINKING_BUDGET: u32 = 32768;
/// Sampling temperature for standard requests.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// System instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "\
You are DevPrompt Studio, an expert prompt engineer and software architect.
Your job is to turn a rough software or design idea into a precise, structured
prompt that an AI coding or design tool can execute without follow-up questions.

Rules:
1. Preserve every requirement the user stated; never drop or contradict one.
2. Make implicit requirements explicit: users, core features, data, edge cases.
3. Recommend a concrete, current technology stack suited to the domain and platform.
4. Organise the output with markdown headings: Overview, Core Features,
   Technical Requirements, Implementation Steps, Acceptance Criteria.
5. Match depth to the requested complexity; do not pad simple ideas.
6. Output only the enhanced prompt, with no preamble or closing remarks.";

const BASIC_INSTRUCTION: &str = "\
MODE: BASIC REFINEMENT
Keep the user's structure and voice. Fix ambiguity, grammar and missing detail,
and return a single improved paragraph or short list. Do not add headings, a
technology stack or implementation steps unless the user asked for them.";

const OUTLINE_INSTRUCTION: &str = "\
MODE: STRUCTURED OUTLINE
Return a hierarchical project outline instead of a prose prompt:
- Project summary (2-3 sentences)
- Modules/features as numbered sections, each with sub-bullets for tasks
- Data entities and their relations
- Milestones in delivery order with a definition of done for each
Keep each bullet to one line.";

impl GenerationMode {
    /// Mode-specific instruction block. `Prompt` needs none beyond the system
    /// instruction.
    pub const fn instruction(self) -> Option<&'static str> {
        match self {
            Self::Basic => Some(BASIC_INSTRUCTION),
            Self::Outline => Some(OUTLINE_INSTRUCTION),
            Self::Prompt => None,
        }
    }
}

/// Generation parameters. Temperature sampling and extended reasoning are
/// separate variants, so a payload can never carry both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GenerationParams {
    Sampling { temperature: f32 },
    Reasoning { thinking_budget: u32 },
}

impl GenerationParams {
    pub const fn temperature(&self) -> Option<f32> {
        match self {
            Self::Sampling { temperature } => Some(*temperature),
            Self::Reasoning { .. } => None,
        }
    }

    pub const fn thinking_budget(&self) -> Option<u32> {
        match self {
            Self::Reasoning { thinking_budget } => Some(*thinking_budget),
            Self::Sampling { .. } => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfigWire {
    thinking_budget: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfigWire>,
}

// Serialised in the shape of Gemini's `generationConfig`.
impl Serialize for GenerationParams {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GenerationConfigWire {
            temperature: self.temperature(),
            thinking_config: self
                .thinking_budget()
                .map(|thinking_budget| ThinkingConfigWire { thinking_budget }),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GenerationParams {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = GenerationConfigWire::deserialize(deserializer)?;
        match (wire.temperature, wire.thinking_config) {
            (Some(temperature), None) => Ok(Self::Sampling { temperature }),
            (None, Some(t)) => Ok(Self::Reasoning {
                thinking_budget: t.thinking_budget,
            }),
            _ => Err(serde::de::Error::custom(
                "exactly one of `temperature` and `thinkingConfig` must be set",
            )),
        }
    }
}

/// Model identifiers to choose between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub standard_model: String,
    pub reasoning_model: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            standard_model: DEFAULT_STANDARD_MODEL.to_string(),
            reasoning_model: DEFAULT_REASONING_MODEL.to_string(),
        }
    }
}

/// Everything the transport needs to issue one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedPayload {
    pub model: String,
    pub system_instruction: String,
    /// Final user-turn text.
    pub contents: String,
    pub generation: GenerationParams,
}

/// Assemble a payload using the default models.
pub fn assemble(raw_input: &str, options: &EnhancementOptions) -> ComposedPayload {
    assemble_with(raw_input, options, &ModelSelection::default())
}

/// Assemble a payload. Pure and infallible.
pub fn assemble_with(
    raw_input: &str,
    options: &EnhancementOptions,
    models: &ModelSelection,
) -> ComposedPayload {
    let strategy = ToolCategory::of(&options.target_tool).strategy();

    let mut contents = String::with_capacity(raw_input.len() + 2048);
    contents.push_str("Enhance the following idea:\n\"");
    contents.push_str(raw_input);
    contents.push_str("\"\n\nConfiguration:\n");
    contents.push_str(&format!("- domain: {}\n", options.domain.label()));
    contents.push_str(&format!("- platform: {}\n", options.platform.label()));
    contents.push_str(&format!("- complexity: {}\n", options.complexity.label()));
    for (key, value) in options.flags.entries() {
        contents.push_str(&format!("- {key}: {value}\n"));
    }

    if let Some(block) = options.mode.instruction() {
        contents.push('\n');
        contents.push_str(block);
        contents.push('\n');
    }

    if options.mode != GenerationMode::Basic {
        contents.push('\n');
        contents.push_str(strategy);
        contents.push('\n');
    }

    let (model, generation) = if options.use_thinking {
        (
            models.reasoning_model.clone(),
            GenerationParams::Reasoning {
                thinking_budget: THINKING_BUDGET,
            },
        )
    } else {
        (
            models.standard_model.clone(),
            GenerationParams::Sampling {
                temperature: DEFAULT_TEMPERATURE,
            },
        )
    };

    ComposedPayload {
        model,
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        contents,
        generation,
    }
}
