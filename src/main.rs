//! Formwright 命令行
//!
//! 入口：初始化日志、加载配置、创建合成编排器，按子命令合成 / 编辑表单，
//! 把 `{ "form": ..., "diagnostic": ... }` 以 JSON 写到 stdout。

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use formwright::config::{load_config, AppConfig};
use formwright::form::{form_schema_json, templated_fallback, FormSpecification};
use formwright::synthesis::{enforce, into_specification};
use formwright::{observability, SynthesisDiagnostic, SynthesisOrchestrator};

#[derive(Parser, Debug)]
#[command(name = "formwright")]
#[command(about = "Synthesize multi-step questionnaire forms from a plain-language description")]
#[command(version)]
struct Cli {
    /// 额外的 TOML 配置文件（覆盖 config/default.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "info", help = "Default log level when RUST_LOG is unset")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 由描述生成表单
    Synthesize {
        /// 业务描述，如 "I run a landscaping company"
        prompt: String,
    },
    /// 按指令编辑已有表单
    Edit {
        /// 当前表单 JSON 文件
        #[arg(long)]
        spec: PathBuf,
        instruction: String,
    },
    /// 不调用生成服务，直接输出按描述定制的模板表单
    Template { prompt: String },
    /// 输出表单 JSON Schema
    Schema,
}

#[derive(Serialize)]
struct Output<'a> {
    form: &'a FormSpecification,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<&'a SynthesisDiagnostic>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    observability::init(&cli.log_level);

    let cfg = load_config(cli.config.clone()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    match cli.command {
        Commands::Synthesize { prompt } => {
            let orchestrator = SynthesisOrchestrator::from_config(&cfg);
            let (form, diagnostic) = orchestrator.synthesize(&prompt).await;
            print_json(&Output {
                form: &form,
                diagnostic: Some(&diagnostic),
            })?;
        }
        Commands::Edit { spec, instruction } => {
            let original = read_form(&spec)?;
            let orchestrator = SynthesisOrchestrator::from_config(&cfg);
            let (form, diagnostic) = orchestrator.repair(&original, &instruction).await;
            print_json(&Output {
                form: &form,
                diagnostic: Some(&diagnostic),
            })?;
        }
        Commands::Template { prompt } => {
            let form = enforce(templated_fallback(&prompt));
            print_json(&Output {
                form: &form,
                diagnostic: None,
            })?;
        }
        Commands::Schema => println!("{}", form_schema_json()),
    }

    Ok(())
}

/// 读取表单文件：先经过结构规整，兼容手写或旧格式的 JSON
fn read_form(path: &Path) -> anyhow::Result<FormSpecification> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Form file {} is not valid JSON", path.display()))?;
    let form = value.get("form").cloned().unwrap_or(value);
    let normalized = into_specification(form);
    if normalized.spec.steps.is_empty() {
        anyhow::bail!("Form file {} has no usable steps", path.display());
    }
    Ok(normalized.spec)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}
