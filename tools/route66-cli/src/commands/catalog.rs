//! Catalog commands.

use anyhow::Result;
use route66_commerce::catalog::{
    build_page, group_by_category, CatalogPage, CatalogQuery, Product, SortOrder,
};
use route66_commerce::search::{parse_price_input, FilterState, MAX_POTENCY, MIN_POTENCY};
use serde::Serialize;

use super::{CatalogArgs, CatalogCommand, ListArgs};
use crate::context::Context;
use crate::output::PRODUCT_COLUMNS;

/// Run the catalog command.
pub fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let products = ctx.load_catalog(args.source.catalog.as_deref())?;

    match args.command {
        CatalogCommand::Validate => validate(&products, ctx),
        CatalogCommand::List(list) => list_products(&products, &list, ctx),
        CatalogCommand::Categories => categories(&products, ctx),
    }
}

#[derive(Debug, Serialize)]
struct ValidationSummary {
    valid: bool,
    products: usize,
    categories: usize,
    warnings: Vec<String>,
}

/// Loading already rejected schema violations; this adds the soft checks.
fn validate(products: &[Product], ctx: &Context) -> Result<()> {
    let mut warnings = Vec::new();
    for product in products {
        if product.prices.is_empty() {
            warnings.push(format!("{}: no prices, sorts last by price", product.name));
        }
        for size in &product.size_options {
            if product.price_for(size).is_none() {
                warnings.push(format!("{}: size '{}' has no price", product.name, size));
            }
        }
    }

    let summary = ValidationSummary {
        valid: true,
        products: products.len(),
        categories: group_by_category(products).len(),
        warnings,
    };

    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return Ok(());
    }

    for warning in &summary.warnings {
        ctx.output.warn(warning);
    }
    ctx.output.success(&format!(
        "Catalog is valid: {} products in {} categories",
        summary.products, summary.categories
    ));
    Ok(())
}

/// Build the page query from command line flags.
pub fn query_from_args(args: &ListArgs) -> Result<CatalogQuery> {
    let sort: SortOrder = args.sort.parse()?;

    let mut filters = FilterState::new()
        .with_price_range(
            args.min_price.as_deref().and_then(parse_price_input),
            args.max_price.as_deref().and_then(parse_price_input),
        )
        .with_only_in_stock(args.in_stock);
    if args.min_potency.is_some() || args.max_potency.is_some() {
        filters = filters.with_potency_range(
            args.min_potency.unwrap_or(MIN_POTENCY),
            args.max_potency.unwrap_or(MAX_POTENCY),
        );
    }

    let mut query = CatalogQuery::new().with_filters(filters).with_sort(sort);
    if let Some(category) = &args.category {
        query = query.with_category(category.clone());
    }
    Ok(query)
}

fn list_products(products: &[Product], args: &ListArgs, ctx: &Context) -> Result<()> {
    let query = query_from_args(args)?;
    let page = build_page(products, &query);

    if ctx.output.is_json() {
        ctx.output.json(&page);
        return Ok(());
    }

    print_page(&page, &query, ctx);
    Ok(())
}

fn print_page(page: &CatalogPage, query: &CatalogQuery, ctx: &Context) {
    if let Some(message) = page.empty_message {
        ctx.output.info(message);
        return;
    }

    ctx.output
        .table_row(&["NAME", "CATEGORY", "PRICE", "THCA", "BANNER"], &PRODUCT_COLUMNS);

    // The all-categories view groups by category unless a price sort is active.
    if query.category.is_none() && query.sort == SortOrder::Featured {
        for group in page.groups() {
            ctx.output
                .header(&format!("{} ({})", group.name, group.products.len()));
            for product in &group.products {
                ctx.output.product_row(product);
            }
        }
    } else {
        for product in &page.products {
            ctx.output.product_row(product);
        }
    }

    ctx.output.info(&format!(
        "Showing {} of {} products ({})",
        page.products.len(),
        page.category_total,
        query.sort.display_name()
    ));
}

#[derive(Debug, Serialize)]
struct CategorySummary {
    name: String,
    slug: String,
    products: usize,
}

fn categories(products: &[Product], ctx: &Context) -> Result<()> {
    let summaries: Vec<CategorySummary> = group_by_category(products)
        .into_iter()
        .map(|group| CategorySummary {
            products: group.products.len(),
            name: group.name,
            slug: group.slug,
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&summaries);
        return Ok(());
    }

    ctx.output.header("Categories");
    for summary in &summaries {
        ctx.output.list_item(&format!(
            "{} ({}) - {} products",
            summary.name, summary.slug, summary.products
        ));
    }
    Ok(())
}
