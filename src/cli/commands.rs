use clap::{Args, Parser, Subcommand};
use crate::models::{ForceMode, Target, Tone};
use crate::session::OverrideEdit;

#[derive(Parser)]
#[command(name = "reportctl", version, about = "Generate audit campaign reports from templates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Clone)]
pub struct GlobalArgs {
    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// YAML configuration file (defaults to ./reportctl.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Backend API base URL, e.g. https://audit.example.com/api
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Backend API token (or REPORTCTL_BACKEND_TOKEN)
    #[arg(long, global = true)]
    pub api_token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List templates for a scope with their compatibility
    Templates(TemplatesArgs),
    /// Check whether a template can produce the requested report
    Check(CheckArgs),
    /// Show the AI widgets of a template
    Widgets(WidgetsArgs),
    /// Generate a report, or one report per entity of a campaign
    Generate(GenerateArgs),
    /// Start the local HTTP bridge for the report UI
    Serve(ServeArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Exactly one target may be given.
#[derive(Args, Clone, Default)]
#[group(id = "target_kind", multiple = false)]
pub struct TargetArgs {
    /// Single entity id
    #[arg(long)]
    pub entity: Option<String>,

    /// Campaign id (consolidated report)
    #[arg(long)]
    pub campaign: Option<String>,

    /// Scan id
    #[arg(long)]
    pub scan: Option<String>,

    /// Ecosystem-wide scanner report
    #[arg(long)]
    pub ecosystem: bool,

    /// One report per entity of this campaign
    #[arg(long, value_name = "CAMPAIGN_ID")]
    pub all_entities: Option<String>,
}

impl TargetArgs {
    pub fn to_target(&self, name: Option<String>) -> Option<Target> {
        if let Some(id) = &self.entity {
            return Some(Target::Entity { id: id.clone(), name });
        }
        if let Some(id) = &self.campaign {
            return Some(Target::Campaign { id: id.clone(), name });
        }
        if let Some(id) = &self.scan {
            return Some(Target::Scan { id: id.clone(), name });
        }
        if let Some(campaign_id) = &self.all_entities {
            return Some(Target::AllEntities { campaign_id: campaign_id.clone(), campaign_name: name });
        }
        self.ecosystem.then_some(Target::Ecosystem)
    }

    pub fn is_bulk(&self) -> bool {
        self.all_entities.is_some()
    }
}

#[derive(Args, Clone)]
pub struct TemplatesArgs {
    /// Report scope: individual (entity), consolidated (campaign), both, scan-individual, scan-ecosystem, scan-both
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Template category filter
    #[arg(long)]
    pub category: Option<String>,

    /// Only per-entity capable templates count as compatible
    #[arg(long)]
    pub bulk: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct CheckArgs {
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Template id
    #[arg(short, long)]
    pub template: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Clone)]
pub struct WidgetsArgs {
    /// Template id
    pub template: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct GenerateArgs {
    #[arg(short, long)]
    pub scope: Option<String>,

    /// Template id (auto-selected when omitted)
    #[arg(short, long)]
    pub template: Option<String>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Display name of the target, used in the default title
    #[arg(long)]
    pub name: Option<String>,

    /// Report title
    #[arg(long)]
    pub title: Option<String>,

    /// Force every AI widget to ai or manual
    #[arg(long, value_parser = parse_force_mode)]
    pub force_mode: Option<ForceMode>,

    #[arg(long)]
    pub appendix: bool,

    #[arg(long)]
    pub no_ai_summary: bool,

    #[arg(long)]
    pub benchmarking: bool,

    #[arg(long)]
    pub language: Option<String>,

    /// Manual text for an AI widget: WIDGET_ID=TEXT (turns AI off for it)
    #[arg(long = "manual", value_name = "WIDGET_ID=TEXT", value_parser = parse_manual)]
    pub manual: Vec<OverrideEdit>,

    /// Turn AI generation off for a widget
    #[arg(long = "no-ai", value_name = "WIDGET_ID")]
    pub no_ai: Vec<String>,

    /// Tone for an AI widget: WIDGET_ID=executive|technical|detailed
    #[arg(long = "tone", value_name = "WIDGET_ID=TONE", value_parser = parse_tone)]
    pub tone: Vec<OverrideEdit>,

    /// Print the final progress snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    pub fn edits(&self) -> Vec<OverrideEdit> {
        let mut edits = self.tone.clone();
        edits.extend(self.manual.iter().cloned());
        edits.extend(self.no_ai.iter().map(|id| OverrideEdit {
            widget_id: id.clone(),
            use_ai: Some(false),
            ..Default::default()
        }));
        edits
    }
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Listen port
    #[arg(long)]
    pub port: Option<u16>,

    /// Listen address
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub file: String,
}

fn split_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => Ok((id.trim().to_string(), value.to_string())),
        _ => Err(format!("expected WIDGET_ID=VALUE, got '{}'", raw)),
    }
}

fn parse_manual(raw: &str) -> Result<OverrideEdit, String> {
    let (widget_id, text) = split_pair(raw)?;
    Ok(OverrideEdit { widget_id, manual_content: Some(text), ..Default::default() })
}

fn parse_tone(raw: &str) -> Result<OverrideEdit, String> {
    let (widget_id, tone) = split_pair(raw)?;
    Ok(OverrideEdit { widget_id, tone: Some(tone.parse::<Tone>()?), ..Default::default() })
}

fn parse_force_mode(raw: &str) -> Result<ForceMode, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "ai" => Ok(ForceMode::Ai),
        "manual" => Ok(ForceMode::Manual),
        other => Err(format!("expected ai or manual, got '{}'", other)),
    }
}
