use clap::Parser;
use std::sync::Arc;
use xml_field_translator::adapters::{discovery, report};
use xml_field_translator::utils::error::ErrorSeverity;
use xml_field_translator::utils::{logger, validation::Validate};
use xml_field_translator::{
    BatchEngine, CliConfig, Dispatcher, LocalStorage, Settings, TomlConfig, TranslatorError,
    XmlPipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let toml = match cli.load_toml() {
        Ok(toml) => toml,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            exit_with(&e);
        }
    };

    if cli.json_logs || toml.json_logs() {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting xml-field-translator");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let monitor_enabled = cli.monitor || toml.monitoring_enabled();
    let settings = match resolve_settings(&cli, toml) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_with(&e);
        }
    };

    let dispatcher = match Dispatcher::from_settings(&settings.providers) {
        Ok(dispatcher) => Arc::new(dispatcher),
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Enabled providers: {:?}", dispatcher.enabled_providers());

    if cli.list_languages {
        for language in dispatcher.languages().await {
            println!("{}\t{}", language.code, language.name);
        }
        return Ok(());
    }

    let documents = match discovery::discover(&settings.discovery) {
        Ok(documents) => documents,
        Err(e) => exit_with(&e),
    };

    if settings.translation.dry_run {
        println!("Dry run: no files will be modified");
    }
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let provider = settings.translation.provider;
    let pipeline = XmlPipeline::new(LocalStorage::default(), settings, dispatcher);
    let engine = BatchEngine::new_with_monitoring(pipeline, monitor_enabled);
    let batch = engine.run(&documents).await;

    if let Some(path) = &cli.report {
        if let Err(e) = report::write_csv_report(path, &batch) {
            exit_with(&e);
        }
        tracing::info!("📁 Report saved to: {}", path);
    }

    println!("{}", "=".repeat(50));
    for document in &batch.documents {
        println!("{}", document.status_line());
    }

    println!(
        "✅ Processed {} documents in {:.1?}: {} fields translated via {}, {} left untouched",
        batch.documents.len(),
        batch.elapsed,
        batch.usage.translated(),
        batch.usage.label(provider),
        batch.usage.untranslated
    );

    let failed = batch.failed();
    if failed > 0 {
        eprintln!("❌ {} documents could not be processed", failed);
        std::process::exit(exit_code(ErrorSeverity::High));
    }

    Ok(())
}

fn resolve_settings(cli: &CliConfig, toml: TomlConfig) -> xml_field_translator::Result<Settings> {
    let settings = cli.resolve(toml)?;
    settings.validate()?;
    Ok(settings)
}

fn exit_with(e: &TranslatorError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(exit_code(e.severity()).max(1));
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
