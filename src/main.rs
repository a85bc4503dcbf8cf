//! isuku-i18n 命令行入口

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use isuku_i18n::core::{format_output_path, print_error_message, translate_document, IsukuOptions};
use isuku_i18n::env::{generate_env_docs, EnvConfig};
use isuku_i18n::translation::{
    BrowserState, IsukuConfig, Locale, PreferenceResolver, TranslationError, TranslationResult,
};

#[cfg(feature = "network")]
use isuku_i18n::network::{ApiOutcome, Coordinates, GeoFix, LocationClient, UserType, DEFAULT_ZOOM};

#[derive(Parser)]
#[command(name = "isuku-i18n")]
#[command(version, about = "Apply Isuku translations to HTML pages and query location services")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate every tagged element of an HTML document
    Translate {
        /// Input file, or - for stdin
        input: String,
        /// Output file (supports %lang%, %title% and %timestamp%); stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
        /// Switch to this language after the page is ready
        #[arg(short, long)]
        lang: Option<String>,
        /// Browser state file holding cookies and localStorage
        #[arg(short, long)]
        state: Option<PathBuf>,
        /// Output encoding
        #[arg(short, long)]
        encoding: Option<String>,
        /// Input encoding used when the document declares none
        #[arg(long)]
        input_encoding: Option<String>,
    },

    /// Look up a single translation key
    Lookup {
        key: String,
        /// Language to use; the stored preference otherwise
        #[arg(short, long)]
        lang: Option<String>,
        /// Browser state file holding cookies and localStorage
        #[arg(short, long)]
        state: Option<PathBuf>,
    },

    /// List the supported languages
    Languages,

    /// List the environment variables read at startup
    Env,

    /// Location services
    #[cfg(feature = "network")]
    #[command(subcommand)]
    Location(LocationCommands),
}

#[cfg(feature = "network")]
#[derive(Subcommand)]
enum LocationCommands {
    /// Report a position; falls back to the default map centre when none is given
    Update {
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,
        #[arg(long, default_value = "household")]
        user_type: UserType,
        #[arg(short, long)]
        state: Option<PathBuf>,
    },

    /// List collectors near the household
    Collectors {
        /// Search radius in kilometres
        #[arg(long)]
        max_distance: Option<f64>,
        #[arg(short, long)]
        state: Option<PathBuf>,
    },

    /// List pickup requests near the collector
    Pickups {
        /// Search radius in kilometres
        #[arg(long)]
        max_distance: Option<f64>,
        #[arg(short, long)]
        state: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let env = match EnvConfig::from_env() {
        Ok(env) => env,
        Err(e) => {
            print_error_message(&format!("Error: {e}"), true);
            process::exit(1);
        }
    };

    init_logging(&env, cli.quiet);

    if let Err(e) = run(cli, &env) {
        print_error_message(&format!("Error: {e}"), !env.no_color);
        process::exit(1);
    }
}

fn init_logging(env: &EnvConfig, quiet: bool) {
    let level = if quiet || env.quiet {
        tracing::Level::ERROR
    } else {
        env.log_level.parse().unwrap_or(tracing::Level::INFO)
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(!env.no_color)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli, env: &EnvConfig) -> TranslationResult<()> {
    let (config, config_path) = IsukuConfig::load(cli.config.as_deref())?;
    if let Some(path) = &config_path {
        tracing::debug!("Using configuration from {}", path);
    }

    match cli.command {
        Commands::Translate {
            input,
            output,
            lang,
            state,
            encoding,
            input_encoding,
        } => {
            let state_path = resolve_state_path(state, env, &config);
            let mut browser_state = BrowserState::load(&state_path)?;

            let options = IsukuOptions {
                language: lang,
                input_encoding,
                encoding,
                silent: cli.quiet,
            };
            let result = translate_document(
                &input,
                &options,
                &mut browser_state,
                config.load_store()?,
                &config.i18n,
            )?;
            browser_state.save(&state_path)?;

            tracing::info!(
                "Translated {} element(s) to {} ({} skipped, {} missing)",
                result.report.translated,
                result.language,
                result.report.skipped,
                result.report.missing
            );

            match output {
                Some(output) => {
                    let path =
                        format_output_path(&output, result.title.as_deref(), result.language);
                    fs::write(&path, &result.data)
                        .map_err(|e| TranslationError::from(e).with_context(&path))?;
                    if !options.silent {
                        tracing::info!("Wrote {}", path);
                    }
                }
                None => {
                    let mut stdout = io::stdout().lock();
                    stdout.write_all(&result.data)?;
                    stdout.flush()?;
                }
            }
        }

        Commands::Lookup { key, lang, state } => {
            let store = config.load_store()?;
            let locale = match lang {
                Some(code) => {
                    let locale: Locale = code.parse()?;
                    if !store.has_dictionary(locale) {
                        return Err(TranslationError::UnsupportedLanguage(code));
                    }
                    locale
                }
                None => {
                    let state_path = resolve_state_path(state, env, &config);
                    let mut browser_state = BrowserState::load(&state_path)?;
                    PreferenceResolver::from_config(&config.i18n).resolve_active_locale(
                        &store,
                        &mut browser_state.cookies,
                        &mut browser_state.local_storage,
                    )
                }
            };

            println!("{}", store.lookup(locale, &key));
        }

        Commands::Languages => {
            let store = config.load_store()?;
            for locale in store.locales() {
                let marker = if locale == store.baseline() { " (default)" } else { "" };
                println!("{}\t{}{}", locale.code(), locale.native_name(), marker);
            }
        }

        Commands::Env => {
            print!("{}", generate_env_docs());
        }

        #[cfg(feature = "network")]
        Commands::Location(command) => run_location(command, env, &config)?,
    }

    Ok(())
}

#[cfg(feature = "network")]
fn run_location(command: LocationCommands, env: &EnvConfig, config: &IsukuConfig) -> TranslationResult<()> {
    let client = |state: Option<PathBuf>| -> TranslationResult<LocationClient> {
        let state_path = resolve_state_path(state, env, config);
        let browser_state = BrowserState::load(&state_path)?;
        LocationClient::new(&config.api, &browser_state.cookies)
    };

    match command {
        LocationCommands::Update {
            lat,
            lon,
            user_type,
            state,
        } => {
            let position = lat.zip(lon).map(|(lat, lon)| Ok(Coordinates::new(lat, lon)));
            let fix = GeoFix::from_position(position);
            if let Some(error) = &fix.error {
                tracing::warn!(
                    "{}; using default centre {} (zoom {})",
                    error,
                    fix.coordinates,
                    DEFAULT_ZOOM
                );
            }

            let ack = into_result(client(state)?.update_location(fix.coordinates, user_type))?;
            println!(
                "{}",
                ack.message
                    .unwrap_or_else(|| "Location updated successfully".to_string())
            );
        }

        LocationCommands::Collectors {
            max_distance,
            state,
        } => {
            for collector in into_result(client(state)?.nearby_collectors(max_distance))? {
                println!(
                    "{}\t{:.2} km\t{}\t{}",
                    collector.name,
                    collector.distance_km,
                    collector.phone.as_deref().unwrap_or("-"),
                    Coordinates::new(collector.latitude, collector.longitude)
                );
            }
        }

        LocationCommands::Pickups {
            max_distance,
            state,
        } => {
            for pickup in into_result(client(state)?.nearby_pickups(max_distance))? {
                println!(
                    "{}\t{:.2} km\t{}\t{} x {}",
                    pickup.household_name,
                    pickup.distance_km,
                    pickup.address.as_deref().unwrap_or("-"),
                    pickup.quantity,
                    pickup.waste_category
                );
            }
        }
    }

    Ok(())
}

#[cfg(feature = "network")]
fn into_result<T>(outcome: ApiOutcome<T>) -> TranslationResult<T> {
    match outcome {
        ApiOutcome::Success(value) => Ok(value),
        ApiOutcome::Failure { error } => Err(TranslationError::NetworkError(error)),
    }
}

/// 状态文件路径：命令行参数 > 环境变量 > 配置文件
fn resolve_state_path(explicit: Option<PathBuf>, env: &EnvConfig, config: &IsukuConfig) -> PathBuf {
    explicit
        .or_else(|| env.state_path.as_deref().map(PathBuf::from))
        .unwrap_or_else(|| config.state_path())
}
