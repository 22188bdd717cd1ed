use crate::commands::{to_data, CommandResult, SourceContext, EXIT_UPSTREAM_FAILURE};

const COMMAND: &str = "segments";

pub fn run() -> CommandResult {
    let context = match SourceContext::open(COMMAND) {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let result = context.runtime.block_on(context.source.get_segmentation());
    if let Some(error) = result.error.as_deref() {
        return CommandResult::failure(
            COMMAND,
            "upstream_unavailable",
            error,
            EXIT_UPSTREAM_FAILURE,
        );
    }

    let summary = &result.summary;
    let message = format!(
        "{} customers: {} vip, {} active, {} at-risk (average health {})",
        summary.total_customers,
        summary.vip,
        summary.active,
        summary.at_risk,
        summary.average_health_score
    );
    CommandResult::success(COMMAND, message, to_data(&result))
}
