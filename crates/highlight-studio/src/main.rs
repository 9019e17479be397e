//! Highlight Studio terminal client.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use highlight_studio::views::content_plan::{self, PlanState, PlatformFilter};
use highlight_studio::views::dashboard::{self, StatusFilter};
use highlight_studio::views::upload::{SelectedFile, UploadForm};
use highlight_studio::views::video_detail::{self, DetailState, VideoDetail};
use highlight_studio::views::{header, not_found, AssumeYes, Confirm, StdinConfirm};
use highlight_studio::{App, Route, StudioClient};
use shared::{Config, RecordId};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List uploaded videos, newest first
    List {
        #[arg(short, long, value_enum, default_value_t = StatusFilter::All)]
        filter: StatusFilter,
    },

    /// Upload a video file
    Upload {
        file: PathBuf,

        #[arg(short, long, default_value = "")]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Override the MIME type derived from the file extension
        #[arg(long)]
        mime: Option<String>,
    },

    /// Show a video, following its processing until it finishes
    Show {
        id: RecordId,

        /// Print the current state without polling
        #[arg(long)]
        once: bool,

        /// Highlight to put in the player (1-based)
        #[arg(long)]
        highlight: Option<usize>,
    },

    /// Show the content plan of a video
    Plan {
        id: RecordId,

        /// Only posts for this platform ("all" for every platform)
        #[arg(short, long, default_value = "all")]
        platform: String,

        /// Print the caption of the Nth shown post (1-based), ready to paste
        #[arg(long)]
        caption: Option<usize>,
    },

    /// Delete a video
    Delete {
        id: RecordId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Save a video's thumbnail image
    Thumbnail {
        id: RecordId,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render the page at a client path, e.g. /videos/3/content-plan
    Open { path: String },

    /// Write the default configuration file
    InitConfig { path: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let mut log_config = shared::LogConfig::from_settings("highlight-studio", &config.logging);
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    let client = StudioClient::new(&config.api).context("Failed to create API client")?;
    info!(base_url = client.base_url(), "Using backend");

    match args.command {
        Command::List { filter } => list(client, filter).await,
        Command::Upload {
            file,
            title,
            description,
            mime,
        } => upload(&config, client, file, title, description, mime).await,
        Command::Show {
            id,
            once,
            highlight,
        } => show(&config, client, id, once, highlight).await,
        Command::Plan {
            id,
            platform,
            caption,
        } => plan(&config, &client, id, &platform, caption).await,
        Command::Delete { id, yes } => {
            let mut confirm: Box<dyn Confirm> = if yes {
                Box::new(AssumeYes)
            } else {
                Box::new(StdinConfirm)
            };
            delete(client, id, confirm.as_mut()).await
        }
        Command::Thumbnail { id, output } => {
            let bytes = client
                .get_thumbnail(&id)
                .await
                .with_context(|| format!("Failed to fetch thumbnail of video {}", id))?;
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(video_id = %id, bytes = bytes.len(), path = %output.display(), "Saved thumbnail");
            Ok(ExitCode::SUCCESS)
        }
        Command::Open { path } => open(&config, client, Route::parse(&path)).await,
        Command::InitConfig { path } => {
            let path = path.unwrap_or(args.config);
            config
                .save(&path)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Print the error banner, if the app has one, and map it to an exit code
fn finish(app: &App) -> ExitCode {
    match app.error() {
        Some(message) => {
            eprintln!("!! {}", message);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}

async fn list(client: StudioClient, filter: StatusFilter) -> Result<ExitCode> {
    print!("{}", header::render(&Route::Dashboard));
    let app = App::start(client).await;
    print!(
        "{}",
        dashboard::render(&app.videos(), filter, app.is_loading(), Utc::now())
    );
    Ok(finish(&app))
}

async fn upload(
    config: &Config,
    client: StudioClient,
    file: PathBuf,
    title: String,
    description: String,
    mime: Option<String>,
) -> Result<ExitCode> {
    print!("{}", header::render(&Route::Upload));

    let mut form = UploadForm::new(config.upload.clone());
    form.title = title;
    form.description = description;

    let selected = SelectedFile::from_path(&file, mime)?;
    if form.select_file(selected).is_err() {
        print!("{}", form.render(false));
        return Ok(ExitCode::FAILURE);
    }
    print!("{}", form.render(true));

    let mut app = App::new(client);
    match form.submit(&mut app).await {
        Some(route) => {
            println!("Uploaded. -> {}", route);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            print!("{}", form.render(false));
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn show(
    config: &Config,
    client: StudioClient,
    id: RecordId,
    once: bool,
    highlight: Option<usize>,
) -> Result<ExitCode> {
    print!("{}", header::render(&Route::VideoDetail(id.clone())));
    let detail = VideoDetail::new(client, id, &config.polling);
    let player = &config.player;

    let mut state = if once {
        let state = detail.load().await;
        print!("{}", video_detail::render(&state, player));
        state
    } else {
        let follow = detail.follow(|state| {
            print!("{}", video_detail::render(state, player));
        });
        tokio::select! {
            state = follow => state,
            _ = tokio::signal::ctrl_c() => {
                info!(video_id = %detail.video_id(), "Interrupted, leaving video");
                return Ok(ExitCode::SUCCESS);
            }
        }
    };

    if let Some(number) = highlight {
        if number > 0 && state.select(number - 1) {
            print!("{}", video_detail::render(&state, player));
        } else {
            warn!(video_id = %detail.video_id(), number, "No such highlight");
            eprintln!("!! No highlight #{}", number);
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(match state {
        DetailState::Completed { .. } | DetailState::Processing { .. } => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

async fn plan(
    config: &Config,
    client: &StudioClient,
    id: RecordId,
    platform: &str,
    caption: Option<usize>,
) -> Result<ExitCode> {
    print!("{}", header::render(&Route::ContentPlan(id.clone())));
    let filter = PlatformFilter::parse(platform);
    let state = content_plan::load(client, &id).await;
    print!(
        "{}",
        content_plan::render(&state, &id, &filter, &config.platforms)
    );

    let data = match &state {
        PlanState::Loaded(data) => data,
        PlanState::LoadError { .. } => return Ok(ExitCode::FAILURE),
    };

    if let Some(number) = caption {
        let posts = content_plan::filter_posts(&data.plan.posts, &filter);
        match number.checked_sub(1).and_then(|i| posts.get(i)) {
            Some(post) => println!("\n{}", content_plan::caption_text(post)),
            None => {
                eprintln!("!! No post #{}", number);
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn delete(client: StudioClient, id: RecordId, confirm: &mut dyn Confirm) -> Result<ExitCode> {
    let mut app = App::new(client);
    match video_detail::delete_video(&mut app, &id, confirm).await {
        Some(route) => {
            println!("Deleted video {}. -> {}", id, route);
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(finish(&app)),
    }
}

async fn open(config: &Config, client: StudioClient, route: Route) -> Result<ExitCode> {
    match route {
        Route::Dashboard => list(client, StatusFilter::All).await,
        Route::Upload => {
            print!("{}", header::render(&route));
            print!("{}", UploadForm::new(config.upload.clone()).render(false));
            Ok(ExitCode::SUCCESS)
        }
        Route::VideoDetail(id) => show(config, client, id, true, None).await,
        Route::ContentPlan(id) => plan(config, &client, id, "all", None).await,
        Route::NotFound(path) => {
            print!("{}", header::render(&Route::NotFound(path.clone())));
            print!("{}", not_found::render(&path));
            Ok(ExitCode::FAILURE)
        }
    }
}
