//! Output formatting for the CLI.

use console::style;
use route66_commerce::catalog::{min_price, Banner, Product};

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Print one product as a table row.
    pub fn product_row(&self, product: &Product) {
        let price = format_price(min_price(product));
        let potency = product
            .thca_percentage
            .map(|p| format!("{p:.1}%"))
            .unwrap_or_else(|| "-".to_string());
        let badge = product.banner.as_ref().map(banner_badge).unwrap_or_default();
        self.table_row(
            &[&product.name, &product.category, &price, &potency, &badge],
            &PRODUCT_COLUMNS,
        );
        if self.verbose && !self.json {
            println!("    {}", style(format_sizes(product)).dim());
        }
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Column widths for [`Output::product_row`].
pub const PRODUCT_COLUMNS: [usize; 5] = [28, 14, 10, 8, 12];

/// Colored banner label.
pub fn banner_badge(banner: &Banner) -> String {
    let label = banner.as_str();
    match banner {
        Banner::New => style(label).green().to_string(),
        Banner::OutOfStock => style(label).red().to_string(),
        Banner::Other(_) => style(label).yellow().to_string(),
    }
}

/// "from $15.00", or a dash for products without prices.
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("from ${p:.2}"),
        None => "-".to_string(),
    }
}

/// Sizes with prices in the order the product lists them.
pub fn format_sizes(product: &Product) -> String {
    product
        .sized_prices()
        .map(|(size, price)| format!("{size} ${price:.2}"))
        .collect::<Vec<_>>()
        .join(", ")
}
