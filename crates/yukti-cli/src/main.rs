mod commands;
mod render;
mod repl;
mod services;
mod session;

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "yukti")]
#[command(about = "Generate campaign copy for every channel and publish it")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate copy for all platforms from one campaign topic
    Generate {
        /// Campaign topic or idea
        #[arg(required = true, num_args = 1..)]
        topic: Vec<String>,
        /// Translate the copy into this language (name or code, e.g. Hindi or hi)
        #[arg(long)]
        language: Option<String>,
    },
    /// Publish copy to one platform
    #[command(group(ArgGroup::new("body").required(true).args(["content", "content_file"])))]
    Publish {
        /// Target platform (linkedin, instagram, twitter, youtube)
        #[arg(long)]
        platform: String,
        /// Post text
        #[arg(long)]
        content: Option<String>,
        /// Read the post text from a file
        #[arg(long)]
        content_file: Option<PathBuf>,
        /// Image to attach (png, jpg, jpeg, gif)
        #[arg(long)]
        media: Option<PathBuf>,
    },
    /// Check credentials for every configured publisher
    Status,
    /// Find YouTube channels relevant to a campaign description
    Influencers {
        /// Campaign or product description
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
        /// Maximum number of channels to show
        #[arg(long, default_value_t = yukti_influencer::DEFAULT_TOP_N)]
        top: usize,
    },
    /// Show token and business account details for the Instagram credentials
    InstagramInfo,
    /// List supported translation languages
    Languages,
    /// Start an interactive session
    Session,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = yukti_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::debug!(env = %config.env, "configuration loaded");

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Generate { topic, language }) => {
            commands::run_generate(&config, &topic.join(" "), language.as_deref()).await?;
        }
        Some(Commands::Publish {
            platform,
            content,
            content_file,
            media,
        }) => {
            let content = match (content, content_file) {
                (Some(text), _) => text,
                (None, Some(path)) => commands::read_content_file(&path)?,
                (None, None) => anyhow::bail!("either --content or --content-file is required"),
            };
            commands::run_publish(&config, &platform, &content, media.as_deref()).await?;
        }
        Some(Commands::Status) => commands::run_status(&config).await,
        Some(Commands::Influencers { description, top }) => {
            commands::run_influencers(&config, &description.join(" "), top).await?;
        }
        Some(Commands::InstagramInfo) => commands::run_instagram_info(&config).await?,
        Some(Commands::Languages) => commands::run_languages(),
        Some(Commands::Session) => repl::run_session(&config).await?,
        None => println!("yukti ready; run `yukti --help` for commands"),
    }

    Ok(())
}
