use anyhow::{bail, Context, Result};
use clap::Parser;
use photo_squeeze::cli::{Args, Commands, RunArgs, SettingsAction};
use photo_squeeze::constants::MONTHLY_COMPRESSION_LIMIT;
use photo_squeeze::progress::ConsoleObserver;
use photo_squeeze::tinify::PRESERVABLE_METADATA;
use photo_squeeze::utils::format_file_size;
use photo_squeeze::{
    collect_image_files, logger, BatchConfig, DimensionUnit, JsonFileStore, Orchestrator,
    QuotaCounter, ResizeConfig, Settings, SettingsStore, SqueezeError, TinifyClient,
};
use photo_squeeze::{error, info, verbose, warn};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    logger::set_quiet_mode(args.quiet);
    logger::set_verbose_mode(args.verbose);
    logger::init_tracing(args.verbose, args.quiet);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let store = match args.settings {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::default_location(),
    };
    verbose!("Settings file: {}", store.path().display());

    match args.command {
        Commands::Run(run_args) => run_batch(run_args, &store),
        Commands::Quota { api_key } => show_quota(api_key, &store),
        Commands::Settings { action } => manage_settings(action, &store),
    }
}

fn run_batch(args: RunArgs, store: &JsonFileStore) -> Result<()> {
    let settings = store
        .load()
        .with_context(|| format!("reading settings from {}", store.path().display()))?;

    let files = collect_image_files(&args.input, args.recursive)?;
    let output_dir = args.output.clone().unwrap_or_else(|| args.input.clone());

    let unit: DimensionUnit = args.unit.parse()?;
    // Neither flag means resize only.
    let resize = args.resize || !args.compress;
    let compress = args.compress;

    let api_key = args
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| settings.api_key().map(str::to_string));
    if compress && api_key.is_none() {
        return Err(SqueezeError::MissingApiKey.into());
    }
    for class in &args.preserve {
        if !PRESERVABLE_METADATA.contains(&class.as_str()) {
            bail!(
                "Unknown --preserve value {:?}. Expected one of: {}",
                class,
                PRESERVABLE_METADATA.join(", ")
            );
        }
    }

    remember_folders(store, &args, &output_dir);

    let config = BatchConfig {
        output_dir: Some(output_dir.clone()),
        resize: if resize {
            Some(ResizeConfig::new(args.max_dimension, unit)?)
        } else {
            None
        },
        compress,
        restore_metadata: !args.no_metadata,
    };

    info!(
        "🚀 Processing {} file(s) from {} into {}",
        files.len(),
        args.input.display(),
        output_dir.display()
    );
    if let Some(resize) = &config.resize {
        verbose!(
            "Resizing to {} {} ({} px) on the longer side",
            resize.max_dimension,
            resize.unit,
            resize.max_pixels()
        );
    }

    let client = match api_key.filter(|_| compress) {
        Some(key) => Some(TinifyClient::new(key)?.with_preserve(args.preserve.clone())),
        None => None,
    };
    let mut orchestrator = Orchestrator::new(config);
    if let Some(client) = &client {
        orchestrator = orchestrator.with_compression(client, client);
    }

    let observer = ConsoleObserver::new(files.len());
    let summary = orchestrator.run(&files, &observer)?;

    for result in &summary.results {
        if let Some(output) = &result.output {
            verbose!(
                "{}: {} -> {} ({})",
                result.stage,
                result.input.display(),
                output.display(),
                format_file_size((result.final_kb * 1024.0).round() as u64)
            );
        }
    }
    info!("✅ {}", summary.message());
    if let Some(count) = client.as_ref().and_then(|c| c.compression_count()) {
        info!(
            "📊 TinyPNG compressions this month: {} of {}",
            count, MONTHLY_COMPRESSION_LIMIT
        );
    }
    Ok(())
}

/// Saves the folders (and a key given on the command line) for the next run.
fn remember_folders(store: &JsonFileStore, args: &RunArgs, output_dir: &std::path::Path) {
    let patch = Settings {
        api_key: args.api_key.clone().filter(|k| !k.trim().is_empty()),
        input_folder: Some(args.input.to_string_lossy().into_owned()),
        output_folder: Some(output_dir.to_string_lossy().into_owned()),
    };
    if let Err(err) = store.update(patch) {
        warn!("Could not save settings: {}", err);
    }
}

fn show_quota(api_key: Option<String>, store: &JsonFileStore) -> Result<()> {
    let settings = store.load()?;
    let key = api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| settings.api_key().map(str::to_string))
        .ok_or(SqueezeError::MissingApiKey)?;

    let client = TinifyClient::new(key)?;
    let used = client
        .validate()
        .map_err(|e| anyhow::anyhow!("Could not validate API key: {}", e))?;

    let left = MONTHLY_COMPRESSION_LIMIT.saturating_sub(used);
    info!(
        "📊 {} of {} compressions used this month ({} left)",
        used, MONTHLY_COMPRESSION_LIMIT, left
    );
    Ok(())
}

fn manage_settings(action: SettingsAction, store: &JsonFileStore) -> Result<()> {
    match action {
        SettingsAction::Show => {
            let settings = store.load()?;
            println!("📋 {}", store.path().display());
            println!("  api_key:       {}", mask_key(settings.api_key()));
            println!(
                "  input_folder:  {}",
                settings.input_folder.as_deref().unwrap_or("-")
            );
            println!(
                "  output_folder: {}",
                settings.output_folder.as_deref().unwrap_or("-")
            );
        }
        SettingsAction::Set {
            api_key,
            input_folder,
            output_folder,
        } => {
            if api_key.is_none() && input_folder.is_none() && output_folder.is_none() {
                bail!("Nothing to save. Pass --api-key, --input-folder or --output-folder");
            }
            store.update(Settings {
                api_key,
                input_folder: input_folder.map(|p| p.to_string_lossy().into_owned()),
                output_folder: output_folder.map(|p| p.to_string_lossy().into_owned()),
            })?;
            info!("✅ Saved settings to {}", store.path().display());
        }
    }
    Ok(())
}

fn mask_key(key: Option<&str>) -> String {
    match key {
        None => "-".to_string(),
        Some(k) if k.chars().count() <= 4 => "****".to_string(),
        Some(k) => {
            let tail: String = k.chars().skip(k.chars().count() - 4).collect();
            format!("****{}", tail)
        }
    }
}
