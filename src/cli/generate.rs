use tokio::sync::mpsc;
use crate::cli::commands::{GenerateArgs, GlobalArgs};
use crate::cli::context::CliContext;
use crate::cli::progress::GenerationProgress;
use crate::dispatch::GenerationSession;
use crate::errors::{ReportError, CONNECTION_LOST_MESSAGE, PERMISSION_DENIED_MESSAGE};
use crate::models::{GenerationOptions, ProgressPhase, ProgressState, ReportScope, ReportTemplate};
use crate::session::SelectionState;
use tracing::{info, warn};

pub async fn handle_generate(global: &GlobalArgs, args: GenerateArgs) -> Result<(), ReportError> {
    let ctx = CliContext::load(global).await?;
    let scope = ctx.scope(args.scope.as_deref())?;
    let bulk = args.target.is_bulk();
    let template = ctx.template_or_default(args.template.as_deref(), scope, bulk).await?;

    let mut options = ctx.config.generation_options();
    if args.force_mode.is_some() {
        options.force_mode = args.force_mode;
    }
    options.include_appendix |= args.appendix;
    options.include_benchmarking |= args.benchmarking;
    if args.no_ai_summary {
        options.include_ai_summary = false;
    }
    if let Some(language) = &args.language {
        options.language = language.clone();
    }

    let selection = build_selection(&args, scope, template, options)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressState>();
    let session = GenerationSession::new(ctx.client.clone()).with_event_channel(tx);

    let render = !(global.quiet || args.json);
    let renderer = tokio::spawn(async move {
        let mut progress = render.then(GenerationProgress::new);
        while let Some(snapshot) = rx.recv().await {
            if let Some(p) = progress.as_mut() {
                p.handle_snapshot(&snapshot);
            }
        }
    });

    let today = chrono::Local::now().date_naive();
    let run = session.generate(&selection, today);
    let result = tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; abandoning generation");
            session.abandon().await;
            Ok(session.snapshot().await)
        }
    };

    // Closing the channel lets the renderer drain and exit.
    drop(session);
    let _ = renderer.await;

    let state = result?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    }
    info!(
        phase = %state.phase,
        success = state.success_count,
        failed = state.failed_count,
        total = state.total_targets,
        "Generation finished"
    );
    outcome_to_result(&state)
}

/// Assemble the selection from the command line.
///
/// The target goes in before the template: changing the target drops a
/// denied template, which would hide the validator's reason behind a
/// missing-template error.
pub fn build_selection(
    args: &GenerateArgs,
    scope: ReportScope,
    template: ReportTemplate,
    options: GenerationOptions,
) -> Result<SelectionState, ReportError> {
    let mut selection = SelectionState::new(scope).with_options(options);
    selection.set_target(args.target.to_target(args.name.clone()));
    selection.select_template(template);
    selection.title = args.title.clone();
    selection.apply_edits(&args.edits())?;
    Ok(selection)
}

/// Map a terminal snapshot to the process outcome. Per-target failures in a
/// completed run do not fail the command.
pub fn outcome_to_result(state: &ProgressState) -> Result<(), ReportError> {
    if state.phase != ProgressPhase::Failed {
        return Ok(());
    }
    let message = state.message.clone().unwrap_or_else(|| "Report generation failed".into());
    Err(match message.as_str() {
        PERMISSION_DENIED_MESSAGE => ReportError::Permission(message),
        CONNECTION_LOST_MESSAGE => ReportError::ConnectionLost(message),
        _ => ReportError::Stream(message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::{Cli, Commands};
    use crate::request::build_request;
    use clap::Parser;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        let Commands::Generate(args) = cli.command else { panic!("expected generate") };
        args
    }

    fn entity_template() -> ReportTemplate {
        ReportTemplate {
            id: "entity-standard".into(),
            name: "Entity standard".into(),
            category: None,
            report_scope: ReportScope::Individual,
            structure: vec![],
            is_system: true,
            is_default: true,
        }
    }

    #[test]
    fn test_explicit_incompatible_template_reports_denial() {
        let args = generate_args(&[
            "reportctl", "generate", "--scope", "consolidated", "--campaign", "c-1", "--template", "entity-standard",
        ]);
        let selection =
            build_selection(&args, ReportScope::Consolidated, entity_template(), GenerationOptions::default()).unwrap();
        assert!(selection.template().is_some());

        let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let err = build_request(&selection, today).unwrap_err();
        match err {
            ReportError::Incompatible(reason) => assert!(reason.contains("per-entity")),
            other => panic!("expected an incompatibility, got {:?}", other),
        }
    }

    #[test]
    fn test_compatible_selection_keeps_title_and_target() {
        let args = generate_args(&[
            "reportctl", "generate", "--scope", "entity", "--entity", "e-1", "--name", "Acme", "--title", "Q3 review",
        ]);
        let selection =
            build_selection(&args, ReportScope::Individual, entity_template(), GenerationOptions::default()).unwrap();
        assert_eq!(selection.template().map(|t| t.id.as_str()), Some("entity-standard"));
        assert_eq!(selection.title.as_deref(), Some("Q3 review"));
        assert!(!selection.is_bulk());
    }

    #[test]
    fn test_completed_with_failures_is_success() {
        let state = ProgressState {
            phase: ProgressPhase::Completed,
            total_targets: 3,
            success_count: 2,
            failed_count: 1,
            ..Default::default()
        };
        assert!(outcome_to_result(&state).is_ok());
    }

    #[test]
    fn test_failed_runs_map_to_exit_classes() {
        let mut state = ProgressState { phase: ProgressPhase::Failed, ..Default::default() };
        state.message = Some(CONNECTION_LOST_MESSAGE.into());
        assert!(matches!(outcome_to_result(&state), Err(ReportError::ConnectionLost(_))));
        state.message = Some(PERMISSION_DENIED_MESSAGE.into());
        assert!(matches!(outcome_to_result(&state), Err(ReportError::Permission(_))));
        state.message = Some("Template rendering crashed".into());
        assert!(matches!(outcome_to_result(&state), Err(ReportError::Stream(_))));
    }
}
