//! Content plan view: the generated social media schedule of one video.

use super::render_error_view;
use crate::api::{ApiResult, StudioClient};
use crate::routes::Route;
use shared::config::PlatformConfig;
use shared::display::format_calendar_date;
use shared::{ContentPlan, Highlight, Post, RecordId, Video};
use tracing::error;

pub const LOAD_FAILED: &str = "Failed to load content plan. Please try again later.";

const UNKNOWN_PLATFORM_ICON: &str = "share-alt";
const UNKNOWN_PLATFORM_COLOR: &str = "#666666";

/// Display entry for a post's platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform<'a> {
    /// Found in the configured platform table
    Known(&'a PlatformConfig),
    /// Not configured; display fields are synthesized from the raw id
    Unknown { id: String, name: String },
}

impl Platform<'_> {
    pub fn id(&self) -> &str {
        match self {
            Platform::Known(config) => &config.id,
            Platform::Unknown { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Platform::Known(config) => &config.name,
            Platform::Unknown { name, .. } => name,
        }
    }

    pub fn icon(&self) -> &str {
        match self {
            Platform::Known(config) => &config.icon,
            Platform::Unknown { .. } => UNKNOWN_PLATFORM_ICON,
        }
    }

    pub fn color(&self) -> &str {
        match self {
            Platform::Known(config) => &config.color,
            Platform::Unknown { .. } => UNKNOWN_PLATFORM_COLOR,
        }
    }

    /// Configured but switched off
    pub fn is_disabled(&self) -> bool {
        matches!(self, Platform::Known(config) if !config.enabled)
    }
}

/// Case-insensitive lookup over the configured platforms
#[derive(Debug, Clone, Copy)]
pub struct PlatformTable<'a> {
    platforms: &'a [PlatformConfig],
}

impl<'a> PlatformTable<'a> {
    pub fn new(platforms: &'a [PlatformConfig]) -> Self {
        Self { platforms }
    }

    pub fn resolve(&self, platform_id: &str) -> Platform<'a> {
        let wanted = platform_id.to_lowercase();
        match self.platforms.iter().find(|p| p.id.to_lowercase() == wanted) {
            Some(config) => Platform::Known(config),
            None => Platform::Unknown {
                id: wanted,
                name: platform_id.to_string(),
            },
        }
    }
}

/// Platform filter buttons
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    /// Lowercased platform id
    Only(String),
}

impl PlatformFilter {
    /// `all` (any case) selects everything
    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        if value == "all" {
            PlatformFilter::All
        } else {
            PlatformFilter::Only(value)
        }
    }

    pub fn matches(&self, platform: &str) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Only(wanted) => platform.to_lowercase() == *wanted,
        }
    }
}

/// Posts passing the filter, in plan order
pub fn filter_posts<'p>(posts: &'p [Post], filter: &PlatformFilter) -> Vec<&'p Post> {
    posts.iter().filter(|post| filter.matches(&post.platform)).collect()
}

/// Distinct lowercased platforms in first-seen order
pub fn platform_choices(posts: &[Post]) -> Vec<String> {
    let mut choices: Vec<String> = Vec::new();
    for post in posts {
        let platform = post.platform.to_lowercase();
        if !choices.contains(&platform) {
            choices.push(platform);
        }
    }
    choices
}

/// Caption followed by its hashtags, ready to paste
pub fn caption_text(post: &Post) -> String {
    if post.hashtags.is_empty() {
        return post.caption.clone();
    }
    let tags: Vec<String> = post.hashtags.iter().map(|t| format!("#{}", t)).collect();
    format!("{}\n\n{}", post.caption, tags.join(" "))
}

/// Everything the view fetched
#[derive(Debug, Clone)]
pub struct PlanData {
    pub video: Video,
    pub plan: ContentPlan,
    pub highlights: Vec<Highlight>,
}

impl PlanData {
    fn highlight(&self, clip_id: Option<&RecordId>) -> Option<&Highlight> {
        let clip_id = clip_id?;
        self.highlights.iter().find(|h| &h.id == clip_id)
    }
}

/// What the content plan view is showing
#[derive(Debug, Clone)]
pub enum PlanState {
    Loaded(PlanData),
    LoadError { message: String },
}

async fn fetch(client: &StudioClient, video_id: &RecordId) -> ApiResult<PlanData> {
    let video = client.get_video(video_id).await?;
    let plan = client.get_content_plan(video_id).await?;
    let highlights = client.get_highlights(video_id).await?;
    Ok(PlanData {
        video,
        plan,
        highlights,
    })
}

/// Fetch video, plan and highlights in sequence; any failure fails the view
pub async fn load(client: &StudioClient, video_id: &RecordId) -> PlanState {
    match fetch(client, video_id).await {
        Ok(data) => PlanState::Loaded(data),
        Err(e) => {
            error!(video_id = %video_id, error = %e, "Error fetching content plan");
            PlanState::LoadError {
                message: LOAD_FAILED.to_string(),
            }
        }
    }
}

fn render_post(post: &Post, data: &PlanData, table: &PlatformTable<'_>) -> String {
    let platform = table.resolve(&post.platform);
    let mut text = format!(
        "[{} {} :{}:] {}{}\n  Post on {}\n",
        platform.name(),
        platform.color(),
        platform.icon(),
        post.title,
        if platform.is_disabled() { " (platform not enabled)" } else { "" },
        format_calendar_date(&post.suggested_posting_date)
    );

    if let Some(highlight) = data.highlight(post.clip_id.as_ref()) {
        match highlight.thumbnail_path.as_deref() {
            Some(thumb) => text.push_str(&format!("  clip: {} [thumb: {}]\n", highlight.title, thumb)),
            None => text.push_str(&format!("  clip: {}\n", highlight.title)),
        }
    }

    for line in post.caption.lines() {
        text.push_str(&format!("  | {}\n", line));
    }
    if !post.hashtags.is_empty() {
        let tags: Vec<String> = post.hashtags.iter().map(|t| format!("#{}", t)).collect();
        text.push_str(&format!("  {}\n", tags.join(" ")));
    }
    text.push_str(&format!(
        "  -> View Highlight: {}\n",
        Route::VideoDetail(data.video.id.clone())
    ));
    text
}

/// Render the current state
pub fn render(
    state: &PlanState,
    video_id: &RecordId,
    filter: &PlatformFilter,
    platforms: &[PlatformConfig],
) -> String {
    let data = match state {
        PlanState::LoadError { message } => {
            return render_error_view(
                "Error Loading Content Plan",
                message,
                "Back to Video",
                &Route::VideoDetail(video_id.clone()),
            )
        }
        PlanState::Loaded(data) => data,
    };
    let table = PlatformTable::new(platforms);

    let mut text = format!(
        "Content Plan\n{}\n-> Back to Video: {}\n\n",
        data.video.title,
        Route::VideoDetail(video_id.clone())
    );
    text.push_str(&format!(
        "Total Highlights: {}   Total Posts: {}   Generated On: {}\n\n",
        data.highlights.len(),
        data.plan.posts.len(),
        format_calendar_date(&data.plan.generated_date)
    ));

    let mut buttons = vec![if *filter == PlatformFilter::All {
        "[All Platforms]".to_string()
    } else {
        "All Platforms".to_string()
    }];
    for choice in platform_choices(&data.plan.posts) {
        let name = table.resolve(&choice).name().to_string();
        if *filter == PlatformFilter::Only(choice) {
            buttons.push(format!("[{}]", name));
        } else {
            buttons.push(name);
        }
    }
    text.push_str(&format!("Filter by Platform: {}\n\n", buttons.join("  ")));

    text.push_str("Scheduled Posts\n");
    let posts = filter_posts(&data.plan.posts, filter);
    if posts.is_empty() {
        text.push_str("No posts found for the selected platform.\n");
        return text;
    }
    for (index, post) in posts.iter().enumerate() {
        text.push_str(&format!("{}. ", index + 1));
        text.push_str(&render_post(post, data, &table));
    }
    text
}
