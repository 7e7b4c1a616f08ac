use pim_attr_engine::api::{ApiClient, HttpApi};
use pim_attr_engine::config::AppConfig;
use pim_attr_engine::edit::{AttributeEditor, UserContext};
use pim_attr_engine::logic::{build_grouped_view, completeness};
use pim_attr_engine::model::AttributeCatalog;
use pim_attr_engine::store::AssetSoftCache;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress HTTP client debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        .init();

    let product = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: pim-attr-engine <product-id>"))?;

    // Load configuration
    let config = AppConfig::load()?;
    let scope = config.scope();
    println!(
        "Configuration loaded: api={} user={} scope={}",
        config.api.base_url, config.session.user, scope
    );

    let mut api = HttpApi::new(&config.api.base_url);
    if let Some(token) = &config.api.token {
        api = api.with_token(token);
    }
    let api = Arc::new(api);

    let catalog = AttributeCatalog::new(api.fetch_catalog().await?);
    println!("Catalog loaded: {} attribute definitions", catalog.len());

    let groups = api.list_groups(&product, &scope).await?;
    let editor = AttributeEditor::new(
        api.clone(),
        catalog.clone(),
        UserContext {
            name: config.session.user.clone(),
            is_staff: config.session.staff,
        },
    );
    let values = editor.load_values(&product, &scope).await?;

    let view = build_grouped_view(&groups, &values);
    for bucket in &view.buckets {
        println!("\n{} ({} values)", bucket.name, bucket.values.len());
        for value in &bucket.values {
            println!(
                "  {} = {} [{}]",
                value.attribute_id,
                serde_json::to_string(&value.body)?,
                value.scope()
            );
        }
    }

    let score = completeness(&catalog, &groups, &values, &scope);
    println!(
        "\nCompleteness: {}/{} mandatory attributes ({:.0}%)",
        score.filled,
        score.required,
        score.percent()
    );

    let soft_cache = AssetSoftCache::new(config.asset_cache_path());
    match editor.refresh_assets(&product, &soft_cache).await {
        Ok(assets) => println!("Assets: {}", assets.len()),
        Err(e) => log::warn!("asset list unavailable: {}", e),
    }

    Ok(())
}
