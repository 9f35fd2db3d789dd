use console::style;
use crate::cli::commands::{GlobalArgs, TemplatesArgs};
use crate::cli::context::CliContext;
use crate::client::{list_with_retry, TemplateFilter};
use crate::compat::{auto_select, validate};
use crate::errors::ReportError;
use tracing::info;

pub async fn handle_templates(global: &GlobalArgs, args: TemplatesArgs) -> Result<(), ReportError> {
    let ctx = CliContext::load(global).await?;
    let scope = ctx.scope(args.scope.as_deref())?;
    let filter = TemplateFilter::for_scope(scope)
        .with_category(args.category.or_else(|| ctx.config.default_category()));

    info!(%scope, bulk = args.bulk, "Listing templates");
    let templates = list_with_retry(ctx.client.as_ref(), &filter, &ctx.config.retry_config()).await?;
    let selected = auto_select(scope, args.bulk, &templates).map(|t| t.id.clone());

    if args.json {
        let rows: Vec<_> = templates
            .iter()
            .map(|t| {
                let verdict = validate(scope, args.bulk, t);
                serde_json::json!({
                    "id": t.id,
                    "name": t.name,
                    "reportScope": t.report_scope,
                    "isDefault": t.is_default,
                    "compatible": verdict.is_allowed(),
                    "reason": verdict.reason(),
                })
            })
            .collect();
        let body = serde_json::json!({ "scope": scope, "autoSelected": selected, "templates": rows });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("{} ({})", style(scope.label()).bold(), scope.family());
    if templates.is_empty() {
        println!("  No templates found");
    }
    for t in &templates {
        let marker = if selected.as_deref() == Some(t.id.as_str()) { "*" } else { " " };
        match validate(scope, args.bulk, t) {
            crate::compat::Verdict::Allowed => println!(
                "{} {} {:<24} {:<40} {}{}",
                marker,
                style("✓").green(),
                t.id,
                t.name,
                t.report_scope,
                if t.is_default { " (default)" } else { "" }
            ),
            crate::compat::Verdict::Denied(reason) => println!(
                "{} {} {:<24} {:<40} {}",
                marker,
                style("✗").red(),
                t.id,
                t.name,
                style(reason).dim()
            ),
        }
    }
    Ok(())
}
