use std::io::Read;

use clap::Parser;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use validator::Validate;

use devprompt::logging::{self, LoggingConfig, OutputFormat};
use devprompt::prelude::*;

/// DevPrompt - turn a rough idea into a structured prompt for an AI coding tool
#[derive(Parser)]
#[command(name = "devprompt")]
#[command(about = "Turn a rough idea into a structured prompt for an AI coding tool")]
#[command(version)]
struct Cli {
    /// The idea to enhance; read from stdin when omitted or `-`
    idea: Option<String>,

    /// Application domain (web, mobile, data, ml, devops, game, blockchain, design)
    #[arg(long)]
    domain: Option<Domain>,

    /// Target platform (web, ios, android, desktop, cross-platform, cloud, cli)
    #[arg(long)]
    platform: Option<Platform>,

    /// Project complexity (simple, moderate, complex)
    #[arg(long)]
    complexity: Option<Complexity>,

    /// Generation mode (basic, prompt, outline)
    #[arg(long)]
    mode: Option<GenerationMode>,

    /// AI tool the prompt is written for, e.g. cursor, lovable, v0
    #[arg(long, short = 't', default_value = "general")]
    tool: String,

    /// Use the extended-reasoning model
    #[arg(long)]
    thinking: bool,

    #[arg(long)]
    no_code_examples: bool,
    #[arg(long)]
    no_best_practices: bool,
    #[arg(long)]
    testing: bool,
    #[arg(long)]
    security: bool,
    #[arg(long)]
    performance: bool,
    #[arg(long)]
    accessibility: bool,
    #[arg(long)]
    docs: bool,

    /// Print the composed request as JSON instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn options(&self) -> EnhancementOptions {
        let mut flags = InclusionFlags::default();
        flags.include_code_examples = !self.no_code_examples;
        flags.include_best_practices = !self.no_best_practices;
        flags.include_testing_strategy = self.testing;
        flags.include_security_considerations = self.security;
        flags.include_performance_tips = self.performance;
        flags.include_accessibility = self.accessibility;
        flags.include_documentation = self.docs;

        EnhancementOptions::new()
            .with_domain(self.domain.unwrap_or_default())
            .with_platform(self.platform.unwrap_or_default())
            .with_complexity(self.complexity.unwrap_or_default())
            .with_mode(self.mode.unwrap_or_default())
            .with_target_tool(self.tool.clone())
            .with_flags(flags)
            .with_thinking(self.thinking)
    }

    fn idea(&self) -> Result<String, EnhanceError> {
        match self.idea.as_deref() {
            Some(idea) if idea != "-" => Ok(idea.to_string()),
            _ => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf).map_err(|e| {
                    EnhanceError::ValidationError(format!("failed to read idea from stdin: {e}"))
                })?;
                Ok(buf.trim().to_string())
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error ({}): {}", e.kind(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), EnhanceError> {
    let format = if cli.json_logs {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    logging::init(&LoggingConfig::default().with_format(format))?;

    let request = EnhancementRequest::new(cli.idea()?, cli.options());
    request.validate()?;

    let enhancer = PromptEnhancer::from_env()?.with_interceptors(std::sync::Arc::new(
        InterceptorRegistry::with_logging(),
    ));

    if cli.dry_run {
        let payload = enhancer.compose(&request.input, &request.options);
        let json = serde_json::to_string_pretty(&payload)?;
        println!("{json}");
        return Ok(());
    }

    let cancel = CancelHandle::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(target: "devprompt::cli", "interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let mut stream = enhancer
        .stream_enhancement_with_cancel(&request.input, &request.options, cancel)
        .await?;

    let mut stdout = tokio::io::stdout();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        stdout
            .write_all(fragment.as_bytes())
            .await
            .map_err(|e| EnhanceError::StreamError(format!("failed to write output: {e}")))?;
        stdout
            .flush()
            .await
            .map_err(|e| EnhanceError::StreamError(format!("failed to write output: {e}")))?;
    }
    println!();
    Ok(())
}
