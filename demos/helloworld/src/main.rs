//! Hello world for Kiln.
//!
//! ```text
//! $ cargo run -p helloworld
//! $ curl 'localhost:8080/hello?name=kiln'
//! {"reply":"Hello kiln"}
//! ```
//!
//! Configuration comes from `helloworld.toml` (optional), `.env` and
//! `KILN__*` variables. Set `HELLOWORLD_ACCESS_TOKEN` to enable writes on
//! `/widgets`.

mod context;
mod hello;
mod widgets;

use anyhow::Context as _;
use kiln::prelude::*;

const CONFIG_FILE: &str = "helloworld.toml";

fn build_service(config: &KilnConfig, token: Option<String>) -> Result<ApiService, RegistrationError> {
    let factory = context::factory(token);
    let mut container = ApiContainer::new(config.api.clone())
        .with_title("helloworld", env!("CARGO_PKG_VERSION"));

    container.register(&config.api, factory.clone(), hello::HelloResource)?;
    container.register(&config.api, factory, widgets::WidgetResource::default())?;

    Ok(ApiService::new(container))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_optional_file(CONFIG_FILE)?
        .with_dotenv()?
        .with_default_env()
        .load()
        .context("loading configuration")?;

    init_logging(&LogConfig::from(&config.logging))?;

    let token = std::env::var(context::TOKEN_VAR).ok();
    if token.is_none() {
        tracing::warn!(var = context::TOKEN_VAR, "no access token configured, writes are disabled");
    }

    let service = build_service(&config, token).context("registering resources")?;
    for route in service.container().routes() {
        tracing::debug!(method = %route.method(), path = route.path(), operation = route.operation_id(), "route");
    }

    Server::new(ServerConfig::from(&config.server), service)
        .run()
        .await?;
    Ok(())
}
