//! Command line front end: manage themes, render previews, fire events.
//!
//! Runs against the headless host, so popups are tracked but never drawn
//! on a real screen. `preview` is the way to look at a rendered template.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use popnote_image::{GlyphShaper, TextShaper};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

use popnote::event::{Event, EventInfo, EventRegistry, find_template_for_event};
use popnote::host::{FixedAdvanceShaper, HeadlessHost, PopupHost};
use popnote::render::render_template;
use popnote::theme::ThemeRepository;
use popnote::theme::repository::user_theme_root;
use popnote::Notifier;

#[derive(Parser, Debug)]
#[command(name = "popnote")]
#[command(about = "Themed desktop notification popups")]
struct Cli {
    /// User theme root (defaults to `<config dir>/popnote/themes`)
    #[arg(long, value_name = "DIR", global = true)]
    user_themes: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List probed and loaded themes, optionally changing the loaded set
    Themes {
        /// Theme files to load and remember
        #[arg(long, value_name = "PATH")]
        load: Vec<PathBuf>,

        /// Theme files to unload and forget
        #[arg(long, value_name = "PATH")]
        unload: Vec<PathBuf>,
    },

    /// Render one template of a theme to a PNG file
    Preview {
        /// Theme file to render from
        #[arg(short, long, value_name = "PATH")]
        theme: PathBuf,

        /// Event type whose template is used
        #[arg(short, long, default_value = "info")]
        event: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        /// Output image
        #[arg(short, long, value_name = "PATH", default_value = "preview.png")]
        out: PathBuf,

        /// Font file for text items
        #[arg(long, value_name = "PATH")]
        font: Option<PathBuf>,
    },

    /// Fire an event and keep running until its popup has gone
    Fire {
        /// Event type to fire
        kind: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        source: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let user_root = match cli.user_themes {
        Some(dir) => dir,
        None => user_theme_root().context("no config directory for user themes")?,
    };

    match cli.command {
        Command::Themes { load, unload } => themes(&user_root, &load, &unload),
        Command::Preview {
            theme,
            event,
            title,
            content,
            out,
            font,
        } => preview(&theme, &event, title, content, &out, font.as_deref()),
        Command::Fire {
            kind,
            title,
            content,
            source,
        } => fire(&user_root, &kind, title, content, source).await,
    }
}

fn themes(user_root: &Path, load: &[PathBuf], unload: &[PathBuf]) -> anyhow::Result<()> {
    let (db, config, _dir) = popnote::init_foundation()?;
    let mut repo = ThemeRepository::new();
    repo.scan(&config.system_theme_dir, user_root);
    repo.load_saved_list(&db)?;

    if !load.is_empty() || !unload.is_empty() {
        for path in unload {
            repo.unload(path);
        }
        for path in load {
            repo.load(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        repo.save_loaded_list(&db)?;
    }

    let loaded: Vec<_> = repo
        .loaded()
        .iter()
        .map(|theme| {
            serde_json::json!({
                "path": theme.path,
                "name": theme.display_name(),
                "version": theme.info.version,
                "templates": theme.templates.len(),
            })
        })
        .collect();
    let listing = serde_json::json!({
        "probed": repo.probed_paths().collect::<Vec<_>>(),
        "loaded": loaded,
    });
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

fn preview(
    theme: &Path,
    kind: &str,
    title: Option<String>,
    content: Option<String>,
    out: &Path,
    font: Option<&Path>,
) -> anyhow::Result<()> {
    let host = HeadlessHost::single_monitor().with_shaper(shaper(font));
    let mut repo = ThemeRepository::new();
    repo.load(theme)
        .with_context(|| format!("failed to load {}", theme.display()))?;

    let registry = EventRegistry::new();
    let event = registry
        .get(kind)
        .cloned()
        .unwrap_or_else(|| Event::new(kind, kind));
    let mut info = EventInfo::sample(event);
    if let Some(title) = title {
        info = info.title(title);
    }
    if let Some(content) = content {
        info = info.content(content);
    }

    let Some(found) = find_template_for_event(&repo, kind) else {
        bail!("{} has no template for '{kind}'", theme.display());
    };
    let image = render_template(found.template, found.theme, &info, &host)?;
    image
        .save(out)
        .with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(out = %out.display(), width = image.width(), height = image.height(), "Preview written");
    Ok(())
}

async fn fire(
    user_root: &Path,
    kind: &str,
    title: Option<String>,
    content: Option<String>,
    source: Option<String>,
) -> anyhow::Result<()> {
    let (db, config, _dir) = popnote::init_foundation()?;
    let host: Rc<dyn PopupHost> =
        Rc::new(HeadlessHost::single_monitor().with_shaper(shaper(config.font_path.as_deref())));
    let mut notifier = Notifier::init(host, db, config, user_root)?;

    let Some(mut info) = notifier.event_info(kind) else {
        bail!("unknown event type '{kind}'");
    };
    if let Some(title) = title {
        info = info.title(title);
    }
    if let Some(content) = content {
        info = info.content(content);
    }
    if let Some(source) = source {
        info = info.source(source);
    }

    if notifier.notify(info).is_none() {
        tracing::info!(kind, "Nothing shown");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&notifier.displays().snapshot())?
    );

    let mut last = Instant::now();
    while let Some(wait) = notifier.next_deadline() {
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
        let now = Instant::now();
        notifier.advance(now - last);
        last = now;
    }

    notifier.shutdown()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&notifier.displays().stats())?
    );
    Ok(())
}

/// Glyph shaper for the configured font file, else fixed-advance cells.
fn shaper(font: Option<&Path>) -> Box<dyn TextShaper> {
    let Some(path) = font else {
        return Box::new(FixedAdvanceShaper);
    };
    match GlyphShaper::from_file(path) {
        Ok(shaper) => Box::new(shaper),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Falling back to fixed-advance text");
            Box::new(FixedAdvanceShaper)
        }
    }
}
