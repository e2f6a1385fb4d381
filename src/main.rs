use anyhow::Context;
use clap::Parser;
use site_render::config::LogFormat;
use site_render::utils::{logger, validation::Validate};
use site_render::{CliConfig, LocalStorage, PageRenderer, RenderEngine, SiteFetcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting site-render");
    tracing::debug!("CLI config: {:?}", cli);

    let setup = cli.site_config().and_then(|site| {
        cli.validate()?;
        let plan = site.validated_plan()?;
        Ok((site, plan))
    });
    let (site, plan) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(2);
        }
    };

    if cli.dry_run {
        println!("Source: {}", site.base());
        println!("Escaping: {:?}", plan.escape);
        for fragment in &plan.fragments {
            println!("  fragment {} <- {}", fragment.mount, fragment.path);
        }
        if let Some(nav) = &plan.nav {
            println!("  nav      {} toggles '{}' on {}", nav.toggle, nav.active_class, nav.menu);
        }
        for target in &plan.targets {
            println!("  target   {} <- {} ({})", target.mount, target.path, target.name);
        }
        return Ok(());
    }

    let fetcher = SiteFetcher::from_source(site.base(), site.timeout())?;
    let mut engine = RenderEngine::new(
        PageRenderer::new(fetcher, plan),
        LocalStorage::new(&cli.pages_dir),
        LocalStorage::new(&cli.out_dir),
    );

    let results = match engine.run(&cli.pages).await {
        Ok(results) => results,
        Err(e) => {
            tracing::error!("Rendering failed: {} (category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    for result in &results {
        println!(
            "✅ {} -> {}/{} ({:?}, {} items)",
            result.page,
            cli.out_dir,
            result.page,
            result.report.outcome,
            result.report.rendered_items()
        );
        for failure in result.report.failures() {
            println!("   ⚠️  {}: {:?}", failure.step, failure.status);
        }
    }

    if let Some(report_path) = &cli.report {
        let json = serde_json::to_string_pretty(&results)?;
        std::fs::write(report_path, json)
            .with_context(|| format!("writing report to {}", report_path))?;
        tracing::info!("Report written to {}", report_path);
    }

    Ok(())
}
