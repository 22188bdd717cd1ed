use beacon_core::domain::filter::CustomerFilterState;
use beacon_core::filters::{distinct_cities, filter_customers, sort_by_spec, SortSpec};
use clap::Args;
use serde_json::json;

use crate::commands::{CommandResult, SourceContext, EXIT_CONFIG_FAILURE, EXIT_UPSTREAM_FAILURE};

const COMMAND: &str = "customers";

#[derive(Debug, Default, Clone, Args)]
pub struct CustomersArgs {
    #[arg(long, help = "Case-insensitive substring over name, city, address, and phone")]
    pub search: Option<String>,
    #[arg(long, help = "Exact city match (case-insensitive)")]
    pub city: Option<String>,
    #[arg(long, help = "Pet-count bucket: all, none, few, many")]
    pub pets: Option<String>,
    #[arg(long, help = "Sort keys, e.g. `city,createdAt:desc`")]
    pub sort: Option<String>,
}

pub fn run(args: &CustomersArgs) -> CommandResult {
    let filter = match CustomerFilterState::from_params(
        args.search.as_deref(),
        args.city.as_deref(),
        args.pets.as_deref(),
    ) {
        Ok(filter) => filter,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_argument",
                error.to_string(),
                EXIT_CONFIG_FAILURE,
            )
        }
    };
    let sort = match args.sort.as_deref().map(SortSpec::parse).transpose() {
        Ok(sort) => sort.unwrap_or_default(),
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_argument",
                error.to_string(),
                EXIT_CONFIG_FAILURE,
            )
        }
    };

    let context = match SourceContext::open(COMMAND) {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    let list = context.runtime.block_on(context.source.get_customers_from_source());
    if let Some(error) = list.error {
        return CommandResult::failure(
            COMMAND,
            "upstream_unavailable",
            error,
            EXIT_UPSTREAM_FAILURE,
        );
    }

    let customers = sort_by_spec(&filter_customers(&list.customers, &filter), &sort);
    let message = format!("{} of {} customers matched", customers.len(), list.customers.len());
    CommandResult::success(
        COMMAND,
        message,
        Some(json!({
            "customers": customers,
            "cities": distinct_cities(&list.customers),
        })),
    )
}
