//! postcraft - rewrite social posts with an LLM from the command line

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use postcraft::config::{Config, ConfigOptions, Provider};
use postcraft::credentials::{
    ChainKeyProvider, Credential, EnvKeyProvider, FileKeyStore, KeyProvider, KeyStore,
};
use postcraft::enhancer::{
    AdvancedContext, EnhanceRequest, PostEnhancer, Tone, VerificationFailure,
};
use postcraft::error::{EngineError, TransportErrorKind};
use postcraft::service::build_transport;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(ValueEnum, Debug, Copy, Clone)]
enum ProviderArg {
    Openai,
    Claude,
    Gemini,
}

#[derive(ValueEnum, Debug, Copy, Clone)]
enum ToneArg {
    Default,
    Excited,
    Story,
    Professional,
    Casual,
}

impl From<ToneArg> for Tone {
    fn from(arg: ToneArg) -> Self {
        match arg {
            ToneArg::Default => Tone::Default,
            ToneArg::Excited => Tone::Excited,
            ToneArg::Story => Tone::Story,
            ToneArg::Professional => Tone::Professional,
            ToneArg::Casual => Tone::Casual,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "postcraft")]
#[command(about = "Rewrite social posts, generate hooks and check API keys")]
struct Args {
    /// Generation provider: openai, claude, gemini
    #[arg(long, value_enum, global = true)]
    provider: Option<ProviderArg>,

    /// Model identifier (defaults per provider)
    #[arg(long, global = true)]
    model: Option<String>,

    /// API base URL (defaults per provider)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Path of the stored key file
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Where the draft comes from; stdin when neither is given
#[derive(ClapArgs, Debug)]
struct DraftArgs {
    /// Draft text
    text: Option<String>,

    /// Read the draft from a file
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite a draft post
    Enhance {
        #[command(flatten)]
        draft: DraftArgs,

        /// Tone preset
        #[arg(long, value_enum)]
        tone: Option<ToneArg>,

        /// Who you are (advanced mode)
        #[arg(long)]
        role: Option<String>,

        /// Why you are posting (advanced mode)
        #[arg(long)]
        motive: Option<String>,

        /// Writing context or style (advanced mode)
        #[arg(long)]
        context: Option<String>,
    },
    /// Generate three opening hooks for a draft
    Hooks {
        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Check that an API key works
    VerifyKey {
        /// Key to test instead of the stored one
        #[arg(long)]
        key: Option<String>,
    },
    /// Store an API key in the key file
    SetKey {
        /// The API key
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Results go to stdout, diagnostics to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        debug!("{:#}", e);
        eprintln!("Error: {}", user_message(&e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let key_store = FileKeyStore::new(
        args.key_file
            .clone()
            .unwrap_or_else(FileKeyStore::default_path),
    );
    let cli_options = options_from_args(&args);

    match args.command {
        Command::Enhance {
            draft,
            tone,
            role,
            motive,
            context,
        } => {
            let mut request = EnhanceRequest::new(read_draft(draft).await?);
            request.tone = tone.map(Tone::from);
            if role.is_some() || motive.is_some() || context.is_some() {
                request.advanced = Some(AdvancedContext {
                    role: role.unwrap_or_default(),
                    motive: motive.unwrap_or_default(),
                    style_context: context.unwrap_or_default(),
                });
            }

            let enhancer = build_enhancer(cli_options, key_store)?;
            let enhanced = enhancer.enhance(&request).await?;
            println!("{}", enhanced);
        }
        Command::Hooks { draft } => {
            let draft = read_draft(draft).await?;
            let enhancer = build_enhancer(cli_options, key_store)?;
            let hooks = enhancer.generate_hooks(&draft).await?;
            for (i, hook) in hooks.iter().enumerate() {
                println!("{}. {}", i + 1, hook);
            }
        }
        Command::VerifyKey { key } => {
            let enhancer = build_enhancer(cli_options, key_store)?;
            let verification = enhancer.verify_key(key.as_deref()).await?;
            if verification.ok {
                println!("API key is valid");
            } else {
                println!(
                    "{}",
                    verification_message(verification.failure, verification.error.as_deref())
                );
                std::process::exit(1);
            }
        }
        Command::SetKey { key } => set_key(&key_store, &key).await?,
    }

    Ok(())
}

/// Connection options given on the command line
fn options_from_args(args: &Args) -> ConfigOptions {
    ConfigOptions {
        provider: args.provider.map(|p| match p {
            ProviderArg::Openai => Provider::OpenAI,
            ProviderArg::Claude => Provider::Claude,
            ProviderArg::Gemini => Provider::Gemini,
        }),
        base_url: args.base_url.clone(),
        model: args.model.clone(),
        timeout_secs: None,
    }
}

/// CLI options over environment, keys from the environment then the key file
fn build_enhancer(cli_options: ConfigOptions, key_store: FileKeyStore) -> Result<PostEnhancer> {
    let config: Arc<Config> = Config::new(cli_options.or(ConfigOptions::from_env()))?;

    let keys: Arc<dyn KeyProvider> = Arc::new(ChainKeyProvider::new(vec![
        Arc::new(EnvKeyProvider::default()),
        Arc::new(key_store),
    ]));
    let transport = build_transport(&config)?;
    Ok(PostEnhancer::new(config, transport, keys))
}

async fn set_key(key_store: &FileKeyStore, key: &str) -> Result<()> {
    let credential = Credential::new(key).ok_or_else(|| anyhow!("API key is empty"))?;
    key_store.set_credential(credential).await?;
    info!("Stored API key at {}", key_store.path().display());
    println!("API key saved to {}", key_store.path().display());
    Ok(())
}

async fn read_draft(args: DraftArgs) -> Result<String> {
    if let Some(text) = args.text {
        return Ok(text);
    }

    if let Some(path) = args.file {
        return tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read draft from {}", path.display()));
    }

    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("Failed to read draft from stdin")?;
    Ok(text)
}

/// Message shown to the user for each failure kind
fn user_message(err: &anyhow::Error) -> String {
    let Some(engine_err) = err.downcast_ref::<EngineError>() else {
        return err.to_string();
    };

    match engine_err {
        EngineError::EmptyInput => "Post text is empty.".to_string(),
        EngineError::MissingCredential => {
            "API key not configured. Run `postcraft set-key <KEY>` or set POSTCRAFT_API_KEY."
                .to_string()
        }
        EngineError::Transport(e) => match e.kind {
            TransportErrorKind::Network => format!("Could not reach the AI service: {}", e.message),
            TransportErrorKind::Auth => format!("The API key was rejected: {}", e.message),
            TransportErrorKind::RateLimit => {
                format!("Rate limited by the AI service, try again later: {}", e.message)
            }
            TransportErrorKind::Other => format!("The AI service returned an error: {}", e.message),
        },
        EngineError::EmptyGeneration => "Failed to generate content. Please try again.".to_string(),
        EngineError::UnparseableHooks => {
            "Failed to parse hooks from the response. Please try again.".to_string()
        }
        EngineError::VerificationFailed { reason } => format!("Verification failed: {}", reason),
    }
}

fn verification_message(failure: Option<VerificationFailure>, detail: Option<&str>) -> String {
    let detail = detail.unwrap_or("Verification failed.");
    match failure {
        Some(VerificationFailure::Transport(TransportErrorKind::Auth)) => {
            format!("API key is invalid: {}", detail)
        }
        Some(VerificationFailure::Transport(TransportErrorKind::RateLimit)) => {
            format!("API key could not be checked (rate limited): {}", detail)
        }
        Some(VerificationFailure::Transport(TransportErrorKind::Network)) => {
            format!("API key could not be checked (network error): {}", detail)
        }
        Some(VerificationFailure::UnexpectedReply) => {
            format!("API key check returned an unexpected reply: {}", detail)
        }
        _ => format!("API key verification failed: {}", detail),
    }
}
