//! Enhancement options as the web client sends them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Error returned when an option value does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {option} `{value}`, expected one of: {expected}")]
pub struct OptionParseError {
    pub option: &'static str,
    pub value: String,
    pub expected: String,
}

/// Application domain the idea belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Domain {
    #[default]
    #[serde(rename = "web")]
    WebDevelopment,
    #[serde(rename = "mobile")]
    MobileDevelopment,
    #[serde(rename = "data")]
    DataScience,
    #[serde(rename = "ml")]
    MachineLearning,
    #[serde(rename = "devops")]
    DevOps,
    #[serde(rename = "game")]
    GameDevelopment,
    #[serde(rename = "blockchain")]
    Blockchain,
    #[serde(rename = "design")]
    UiUxDesign,
}

impl Domain {
    pub const ALL: [Self; 8] = [
        Self::WebDevelopment,
        Self::MobileDevelopment,
        Self::DataScience,
        Self::MachineLearning,
        Self::DevOps,
        Self::GameDevelopment,
        Self::Blockchain,
        Self::UiUxDesign,
    ];

    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::WebDevelopment => "web",
            Self::MobileDevelopment => "mobile",
            Self::DataScience => "data",
            Self::MachineLearning => "ml",
            Self::DevOps => "devops",
            Self::GameDevelopment => "game",
            Self::Blockchain => "blockchain",
            Self::UiUxDesign => "design",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::WebDevelopment => "Web Development",
            Self::MobileDevelopment => "Mobile Development",
            Self::DataScience => "Data Science",
            Self::MachineLearning => "Machine Learning / AI",
            Self::DevOps => "DevOps & Infrastructure",
            Self::GameDevelopment => "Game Development",
            Self::Blockchain => "Blockchain / Web3",
            Self::UiUxDesign => "UI/UX Design",
        }
    }
}

/// Platform the result should run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Platform {
    #[default]
    #[serde(rename = "web")]
    Web,
    #[serde(rename = "ios")]
    Ios,
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "desktop")]
    Desktop,
    #[serde(rename = "cross-platform")]
    CrossPlatform,
    #[serde(rename = "cloud")]
    Cloud,
    #[serde(rename = "cli")]
    Cli,
}

impl Platform {
    pub const ALL: [Self; 7] = [
        Self::Web,
        Self::Ios,
        Self::Android,
        Self::Desktop,
        Self::CrossPlatform,
        Self::Cloud,
        Self::Cli,
    ];

    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Ios => "ios",
            Self::Android => "android",
            Self::Desktop => "desktop",
            Self::CrossPlatform => "cross-platform",
            Self::Cloud => "cloud",
            Self::Cli => "cli",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Web => "Web Browser",
            Self::Ios => "iOS",
            Self::Android => "Android",
            Self::Desktop => "Desktop",
            Self::CrossPlatform => "Cross-Platform",
            Self::Cloud => "Cloud / Server",
            Self::Cli => "Command Line",
        }
    }
}

/// How elaborate the generated result should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Complexity {
    #[serde(rename = "simple")]
    Simple,
    #[default]
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "complex")]
    Complex,
}

impl Complexity {
    pub const ALL: [Self; 3] = [Self::Simple, Self::Moderate, Self::Complex];

    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Simple => "Simple (MVP)",
            Self::Moderate => "Moderate (production-ready)",
            Self::Complex => "Complex (enterprise scale)",
        }
    }
}

/// Which kind of output the model is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GenerationMode {
    /// Light refinement of the user's own wording.
    #[serde(rename = "basic")]
    Basic,
    /// Full prompt enhancement; the base system instruction covers it.
    #[default]
    #[serde(rename = "prompt")]
    Prompt,
    /// Structured project outline.
    #[serde(rename = "outline")]
    Outline,
}

impl GenerationMode {
    pub const ALL: [Self; 3] = [Self::Basic, Self::Prompt, Self::Outline];

    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Prompt => "prompt",
            Self::Outline => "outline",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic refinement",
            Self::Prompt => "Prompt enhancement",
            Self::Outline => "Structured outline",
        }
    }
}

macro_rules! impl_option_traits {
    ($($ty:ident => $option:literal),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }

            impl FromStr for $ty {
                type Err = OptionParseError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    let wanted = s.trim();
                    Self::ALL
                        .into_iter()
                        .find(|v| v.wire_name().eq_ignore_ascii_case(wanted))
                        .ok_or_else(|| OptionParseError {
                            option: $option,
                            value: s.to_string(),
                            expected: Self::ALL
                                .iter()
                                .map(|v| v.wire_name())
                                .collect::<Vec<_>>()
                                .join(", "),
                        })
                }
            }
        )+
    };
}

impl_option_traits!(
    Domain => "domain",
    Platform => "platform",
    Complexity => "complexity",
    GenerationMode => "mode",
);

/// Content-inclusion switches. Rendered into the prompt as `key: value`
/// lines using the camelCase keys below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InclusionFlags {
    pub include_code_examples: bool,
    pub include_best_practices: bool,
    pub include_testing_strategy: bool,
    pub include_security_considerations: bool,
    pub include_performance_tips: bool,
    pub include_accessibility: bool,
    pub include_documentation: bool,
}

impl Default for InclusionFlags {
    fn default() -> Self {
        Self {
            include_code_examples: true,
            include_best_practices: true,
            include_testing_strategy: false,
            include_security_considerations: false,
            include_performance_tips: false,
            include_accessibility: false,
            include_documentation: false,
        }
    }
}

impl InclusionFlags {
    /// Every flag paired with its wire key, in rendering order.
    pub fn entries(&self) -> [(&'static str, bool); 7] {
        [
            ("includeCodeExamples", self.include_code_examples),
            ("includeBestPractices", self.include_best_practices),
            ("includeTestingStrategy", self.include_testing_strategy),
            (
                "includeSecurityConsiderations",
                self.include_security_considerations,
            ),
            ("includePerformanceTips", self.include_performance_tips),
            ("includeAccessibility", self.include_accessibility),
            ("includeDocumentation", self.include_documentation),
        ]
    }
}

fn default_target_tool() -> String {
    "general".to_string()
}

/// Options chosen by the user for one enhancement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnhancementOptions {
    pub domain: Domain,
    pub platform: Platform,
    pub complexity: Complexity,
    pub mode: GenerationMode,
    /// Downstream tool the prompt is optimised for; free text.
    #[serde(default = "default_target_tool")]
    pub target_tool: String,
    #[serde(flatten)]
    pub flags: InclusionFlags,
    /// Use the extended-reasoning model instead of temperature sampling.
    pub use_thinking: bool,
}

impl Default for EnhancementOptions {
    fn default() -> Self {
        Self {
            domain: Domain::default(),
            platform: Platform::default(),
            complexity: Complexity::default(),
            mode: GenerationMode::default(),
            target_tool: default_target_tool(),
            flags: InclusionFlags::default(),
            use_thinking: false,
        }
    }
}

impl EnhancementOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_target_tool(mut self, tool: impl Into<String>) -> Self {
        self.target_tool = tool.into();
        self
    }

    pub fn with_flags(mut self, flags: InclusionFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_thinking(mut self, use_thinking: bool) -> Self {
        self.use_thinking = use_thinking;
        self
    }
}

/// One user action: the raw idea plus the chosen options.
///
/// The pipeline accepts any input; `validate` enforces the length bounds the
/// front ends apply before calling it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementRequest {
    #[validate(length(min = 10, max = 5000, message = "input must be 10 to 5000 characters"))]
    pub input: String,
    #[serde(default)]
    pub options: EnhancementOptions,
}

impl EnhancementRequest {
    pub fn new(input: impl Into<String>, options: EnhancementOptions) -> Self {
        Self {
            input: input.into(),
            options,
        }
    }
}
