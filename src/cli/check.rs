use console::style;
use crate::cli::commands::{CheckArgs, GlobalArgs};
use crate::cli::context::CliContext;
use crate::compat::{validate, Verdict};
use crate::errors::ReportError;

/// Print the verdict; a denial exits with the validation code.
pub async fn handle_check(global: &GlobalArgs, args: CheckArgs) -> Result<(), ReportError> {
    let ctx = CliContext::load(global).await?;
    let scope = ctx.scope(args.scope.as_deref())?;
    let template = ctx.template(&args.template).await?;

    match validate(scope, args.target.is_bulk(), &template) {
        Verdict::Allowed => {
            println!(
                "{} '{}' can produce a {}",
                style("Compatible:").green().bold(),
                template.name,
                scope.label().to_lowercase()
            );
            Ok(())
        }
        Verdict::Denied(reason) => Err(ReportError::Incompatible(reason)),
    }
}
