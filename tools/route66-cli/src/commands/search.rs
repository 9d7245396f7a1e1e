//! Search command.

use anyhow::Result;
use route66_commerce::catalog::Product;
use route66_commerce::search::{search_products, MAX_RESULTS, MIN_QUERY_LEN};

use super::SearchArgs;
use crate::context::Context;
use crate::output::PRODUCT_COLUMNS;

/// Run the search command.
pub fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    let products = ctx.load_catalog(args.source.catalog.as_deref())?;
    let results: Vec<&Product> = search_products(&products, &args.query);

    if ctx.output.is_json() {
        ctx.output.json(&results);
        return Ok(());
    }

    if args.query.trim().chars().count() < MIN_QUERY_LEN {
        ctx.output.warn(&format!(
            "Type at least {} characters to search",
            MIN_QUERY_LEN
        ));
        return Ok(());
    }

    if results.is_empty() {
        ctx.output
            .info(&format!("No products found for \"{}\"", args.query.trim()));
        return Ok(());
    }

    ctx.output
        .table_row(&["NAME", "CATEGORY", "PRICE", "THCA", "BANNER"], &PRODUCT_COLUMNS);
    for product in &results {
        ctx.output.product_row(product);
    }

    let noun = if results.len() == 1 { "result" } else { "results" };
    let cap = if results.len() == MAX_RESULTS {
        " (first matches only)"
    } else {
        ""
    };
    ctx.output
        .info(&format!("{} {}{}", results.len(), noun, cap));
    Ok(())
}
