use clap::Parser;
use std::path::Path;
use weekly_menu_pdf::domain::ports::Storage;
use weekly_menu_pdf::utils::error::MenuPdfError;
use weekly_menu_pdf::utils::{logger, validation::Validate};
use weekly_menu_pdf::{generate, CliConfig, LocalStorage};

fn exit_code(e: &MenuPdfError) -> i32 {
    match e.category() {
        "configuration" => 2,
        "upstream_fetch" => 3,
        "missing_data" => 4,
        "render" | "serialization" => 5,
        _ => 1,
    }
}

fn fail(e: MenuPdfError) -> ! {
    tracing::error!(category = e.category(), "❌ Weekly menu generation failed: {}", e);
    eprintln!("❌ {}", e);
    std::process::exit(exit_code(&e));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting weekly-menu-pdf CLI");

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(e);
    }

    let config = cli.to_app_config().unwrap_or_else(|e| fail(e));
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    let payload = generate(&config).await.unwrap_or_else(|e| fail(e));

    let storage = LocalStorage::new(cli.output_path.clone());
    if let Err(e) = storage.write_file(&config.document.filename, &payload.bytes).await {
        fail(e);
    }

    let output = Path::new(&cli.output_path).join(&config.document.filename);
    tracing::info!("📁 Output saved to: {}", output.display());
    println!("✅ Weekly menu written to {}", output.display());

    Ok(())
}
