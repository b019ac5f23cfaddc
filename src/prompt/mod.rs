//! Prompt Assembly
//!
//! Turns raw user input and [`EnhancementOptions`] into a [`ComposedPayload`]:
//! the model to call, the system instruction, the final user text, and the
//! generation parameters.

mod assemble;
mod options;
mod tools;

pub use assemble::{
    ComposedPayload, DEFAULT_REASONING_MODEL, DEFAULT_STANDARD_MODEL, DEFAULT_TEMPERATURE,
    GenerationParams, ModelSelection, SYSTEM_INSTRUCTION, THINKING_BUDGET, assemble,
    assemble_with,
};
pub use options::{
    Complexity, Domain, EnhancementOptions, EnhancementRequest, GenerationMode, InclusionFlags,
    OptionParseError, Platform,
};
pub use tools::{AGENT_TOOLS, BUILDER_TOOLS, DESIGN_TOOLS, ToolCategory};
