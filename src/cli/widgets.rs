use console::style;
use crate::cli::commands::{GlobalArgs, WidgetsArgs};
use crate::cli::context::CliContext;
use crate::errors::ReportError;
use crate::widgets::extract;

pub async fn handle_widgets(global: &GlobalArgs, args: WidgetsArgs) -> Result<(), ReportError> {
    let ctx = CliContext::load(global).await?;
    let template = ctx.template(&args.template).await?;
    let overrides = extract(&template);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&overrides)?);
        return Ok(());
    }

    println!(
        "{} {} AI widget(s) of {} total",
        style(&template.name).bold(),
        overrides.len(),
        template.structure.len()
    );
    for o in &overrides {
        let id = if o.stable {
            o.widget_id.clone()
        } else {
            format!("{} {}", o.widget_id, style("(positional)").dim())
        };
        println!(
            "  #{:<3} {:<28} {:<20} {:<10} {}  {}",
            o.position,
            id,
            o.widget_type,
            o.tone.as_str(),
            if o.use_ai { style("ai").cyan() } else { style("manual").yellow() },
            o.title.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
