//! `build`, `embed` and `list` command handlers.

use crate::{
    config::EmbedConfig,
    error::GenerateError,
    log,
    logger::human_bytes,
    pipeline::{self, Summary},
    utils::exec::SystemBuildTool,
};

/// Generate the module, running the front-end build first if `with_frontend`.
pub fn generate_module(config: &EmbedConfig, with_frontend: bool) -> Result<Summary, GenerateError> {
    let ctx = config.context();

    let summary = if with_frontend {
        pipeline::run(&ctx, &SystemBuildTool)?
    } else {
        pipeline::generate(&ctx)?
    };

    log!(
        "done";
        "{} assets, {} routes, {} -> {}",
        summary.assets,
        summary.routes,
        human_bytes(summary.raw_bytes),
        human_bytes(summary.compressed_bytes)
    );
    Ok(summary)
}

/// Print what would be embedded without writing anything.
pub fn list_assets(config: &EmbedConfig) -> Result<(), GenerateError> {
    let ctx = config.context();
    let assets = pipeline::collect_assets(&ctx)?;

    for asset in &assets {
        let routes = crate::codegen::routes_for(&asset.relative_path, asset.mime, &asset.identifier);
        let paths: Vec<_> = routes.iter().map(|r| r.path.as_str()).collect();
        log!(
            "asset";
            "{} {} {} {} -> {} [{}]",
            asset.relative_path,
            asset.identifier,
            asset.mime,
            human_bytes(asset.raw.len()),
            human_bytes(asset.compressed.len()),
            paths.join(", ")
        );
    }

    let compressed: usize = assets.iter().map(|a| a.compressed.len()).sum();
    log!("done"; "{} assets, {} compressed", assets.len(), human_bytes(compressed));
    Ok(())
}
