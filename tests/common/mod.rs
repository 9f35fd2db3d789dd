#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use reportctl::client::{EventStream, GenerationBackend, TemplateCatalog, TemplateFilter};
use reportctl::errors::ReportError;
use reportctl::models::{
    AiWidgetConfig, GenerationAccepted, GenerationRequest, ReportScope, ReportTemplate, Tone, WidgetSpec,
};
use reportctl::stream::{decode_payload, StreamEvent};

pub struct FakeCatalog {
    pub templates: Vec<ReportTemplate>,
}

#[async_trait]
impl TemplateCatalog for FakeCatalog {
    async fn list(&self, filter: &TemplateFilter) -> Result<Vec<ReportTemplate>, ReportError> {
        Ok(self
            .templates
            .iter()
            .filter(|t| filter.category.as_ref().map_or(true, |c| t.category.as_ref() == Some(c)))
            .cloned()
            .collect())
    }
}

/// Replays a scripted SSE body and records every request it receives.
#[derive(Default)]
pub struct ScriptedBackend {
    pub payloads: Vec<&'static str>,
    pub generate_calls: AtomicUsize,
    pub stream_calls: AtomicUsize,
    pub requests: Mutex<Vec<serde_json::Value>>,
}

impl ScriptedBackend {
    pub fn with_stream(lines: Vec<&'static str>) -> Self {
        Self { payloads: lines, ..Default::default() }
    }

    fn record(&self, request: &GenerationRequest) {
        if let Ok(json) = serde_json::to_value(request) {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(json);
            }
        }
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationAccepted, ReportError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.record(request);
        Ok(GenerationAccepted { accepted: true, report_id: Some("rep-1".into()), message: None })
    }

    async fn open_bulk_stream(
        &self,
        _campaign_id: &str,
        request: &GenerationRequest,
    ) -> Result<EventStream, ReportError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.record(request);
        let events: Vec<Result<StreamEvent, ReportError>> = self
            .payloads
            .iter()
            .filter_map(|line| decode_payload(line).ok().flatten())
            .map(Ok)
            .collect();
        Ok(futures::stream::iter(events).boxed())
    }

    fn backend_name(&self) -> &str {
        "scripted"
    }
}

pub fn widget(id: Option<&str>, widget_type: &str) -> WidgetSpec {
    WidgetSpec { id: id.map(String::from), widget_type: widget_type.into(), title: None, ai: None }
}

pub fn catalog_templates() -> Vec<ReportTemplate> {
    vec![
        ReportTemplate {
            id: "entity-standard".into(),
            name: "Entity standard".into(),
            category: Some("compliance".into()),
            report_scope: ReportScope::Individual,
            structure: vec![
                widget(Some("cover"), "cover_page"),
                widget(Some("summary"), "ai_summary"),
                WidgetSpec {
                    id: None,
                    widget_type: "findings_table".into(),
                    title: Some("Findings narrative".into()),
                    ai: Some(AiWidgetConfig { enabled: false, tone: Some(Tone::Technical), prompt: None }),
                },
            ],
            is_system: true,
            is_default: true,
        },
        ReportTemplate {
            id: "campaign-overview".into(),
            name: "Campaign overview".into(),
            category: Some("compliance".into()),
            report_scope: ReportScope::Consolidated,
            structure: vec![widget(Some("exec"), "executive_summary")],
            is_system: true,
            is_default: true,
        },
        ReportTemplate {
            id: "audit-any".into(),
            name: "Any audit".into(),
            category: None,
            report_scope: ReportScope::Both,
            structure: vec![],
            is_system: false,
            is_default: false,
        },
    ]
}
