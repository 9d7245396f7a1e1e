//! Run the storefront HTTP API.

use std::net::SocketAddr;

use anyhow::{Context as _, Result};
use route66_server::ServerConfig;

use super::ServeArgs;
use crate::config::WEBHOOK_SECRET_ENV;
use crate::context::Context;

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let config = server_config(&args, ctx)?;

    if config.webhook_secret.is_none() {
        ctx.output.warn(&format!(
            "{} is not set; order webhooks will be refused",
            WEBHOOK_SECRET_ENV
        ));
    }
    ctx.output.info(&format!(
        "Serving {} on http://{}",
        config.catalog_path.display(),
        config.bind_addr
    ));

    route66_server::serve(config).await
}

/// Merge flags, the config file and the environment into server settings.
pub fn server_config(args: &ServeArgs, ctx: &Context) -> Result<ServerConfig> {
    let bind = args
        .bind
        .as_deref()
        .unwrap_or(&ctx.config.server.bind_addr);
    let bind_addr = bind
        .parse::<SocketAddr>()
        .with_context(|| format!("Invalid bind address: {}", bind))?;

    Ok(ServerConfig {
        bind_addr,
        catalog_path: ctx.catalog_path(args.source.catalog.as_deref()),
        transaction_log: ctx.resolve_path(&ctx.config.server.transaction_log),
        public_base_url: ctx.config.server.public_base_url.clone(),
        webhook_secret: std::env::var(WEBHOOK_SECRET_ENV)
            .ok()
            .filter(|s| !s.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::commands::CatalogSource;
    use crate::config::CliConfig;
    use crate::output::Output;

    fn context() -> Context {
        let mut config = CliConfig::default();
        config.server.public_base_url = Some("https://shop.example".to_string());
        Context {
            config,
            config_path: None,
            output: Output::new(false, true),
            cwd: PathBuf::from("/srv/shop"),
        }
    }

    #[test]
    fn test_server_config_from_file_defaults() {
        let args = ServeArgs {
            bind: None,
            source: CatalogSource::default(),
        };
        let config = server_config(&args, &context()).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(
            config.catalog_path,
            PathBuf::from("/srv/shop/data/products.json")
        );
        assert_eq!(
            config.transaction_log,
            PathBuf::from("/srv/shop/data/transactions.json")
        );
        assert_eq!(
            config.public_base_url.as_deref(),
            Some("https://shop.example")
        );
    }

    #[test]
    fn test_server_config_flags_override() {
        let args = ServeArgs {
            bind: Some("0.0.0.0:8080".to_string()),
            source: CatalogSource {
                catalog: Some("fixtures/products.json".to_string()),
            },
        };
        let config = server_config(&args, &context()).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(
            config.catalog_path,
            PathBuf::from("/srv/shop/fixtures/products.json")
        );
    }

    #[test]
    fn test_server_config_rejects_bad_bind() {
        let args = ServeArgs {
            bind: Some("not-an-address".to_string()),
            source: CatalogSource::default(),
        };
        assert!(server_config(&args, &context()).is_err());
    }
}
