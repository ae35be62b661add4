//! Non-interactive subcommands.
//!
//! Each subcommand makes one or two [`FeedsApi`] calls and prints the result
//! to the given writer, either as plain text or (for reads) as JSON.

use anyhow::Context as _;
use clap::{Args, Subcommand};
use feedtest_api::FeedsApi;
use feedtest_core::{
    filter::KNOWN_SOURCES, FilterState, Level, NewNotification, Notification, NotificationView,
};
use std::io::Write;

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// List the global feed and your feed
    List(ListArgs),
    /// List only global notifications
    Global {
        #[arg(long)]
        json: bool,
    },
    /// Show a single notification
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Mark notifications as seen
    See {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Mark notifications as unseen
    Unsee {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Post a notification
    Post(PostArgs),
}

#[derive(Debug, Default, Args)]
pub struct ListArgs {
    /// Include notifications already marked as seen
    #[arg(long)]
    pub seen: bool,
    /// Oldest first
    #[arg(long)]
    pub rev: bool,
    /// Only this level (name or id)
    #[arg(long)]
    pub level: Option<Level>,
    #[arg(long)]
    pub verb: Option<String>,
    /// Only this source service; filtered locally
    #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(KNOWN_SOURCES))]
    pub source: Option<String>,
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn filters(&self) -> FilterState {
        FilterState {
            include_seen: self.seen,
            reverse_sort: self.rev,
            verb: self.verb.clone(),
            level: self.level,
            source: self.source.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct PostArgs {
    #[arg(long)]
    pub verb: String,
    #[arg(long)]
    pub object: String,
    #[arg(long)]
    pub level: Level,
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub link: Option<String>,
    /// Post to every user (requires the admin role)
    #[arg(long)]
    pub global: bool,
    #[arg(long, required_unless_present = "global")]
    pub actor: Option<String>,
    /// Comma-separated user ids
    #[arg(long, value_delimiter = ',', required_unless_present = "global")]
    pub target: Vec<String>,
    #[arg(long, required_unless_present = "global")]
    pub source: Option<String>,
}

impl PostArgs {
    pub fn note(&self) -> NewNotification {
        let mut note = NewNotification::new(self.verb.as_str(), self.object.as_str(), self.level);
        note.context.text = self.text.clone();
        note.context.link = self.link.clone();
        if !self.global {
            note.actor = self.actor.clone();
            note.target = self.target.clone();
            note.source = self.source.clone();
        }
        note
    }
}

/// Run one subcommand against `api`.
pub async fn run(
    cmd: Cmd,
    api: &dyn FeedsApi,
    token: Option<&str>,
    timestamp_format: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match cmd {
        Cmd::List(args) => run_list(api, &args, token, timestamp_format, out).await,
        Cmd::Global { json } => {
            let notes = api
                .get_global_notifications(token)
                .await
                .context("fetching global notifications")?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &notes)?;
                writeln!(out)?;
            } else {
                write_section(out, "Global", &notes, timestamp_format)?;
            }
            Ok(())
        }
        Cmd::Show { id, json } => {
            let note = api
                .get_notification(&id, token)
                .await
                .with_context(|| format!("fetching notification {id}"))?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &note)?;
                writeln!(out)?;
            } else {
                write_note(out, &note, timestamp_format)?;
            }
            Ok(())
        }
        Cmd::See { ids } => run_mark(api, true, &ids, token, out).await,
        Cmd::Unsee { ids } => run_mark(api, false, &ids, token, out).await,
        Cmd::Post(args) => run_post(api, &args, token, out).await,
    }
}

pub async fn run_list(
    api: &dyn FeedsApi,
    args: &ListArgs,
    token: Option<&str>,
    timestamp_format: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let filters = args.filters();
    let mut feed = api
        .list_notifications(&filters, token)
        .await
        .context("fetching feed")?;
    feed.global.retain(|n| filters.admits(n));
    feed.user.retain(|n| filters.admits(n));

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &feed)?;
        writeln!(out)?;
        return Ok(());
    }
    write_section(out, "Global", &feed.global, timestamp_format)?;
    writeln!(out)?;
    write_section(out, "Your", &feed.user, timestamp_format)?;
    Ok(())
}

pub async fn run_mark(
    api: &dyn FeedsApi,
    seen: bool,
    ids: &[String],
    token: Option<&str>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let (ack, verb) = if seen {
        (api.mark_seen(ids, token).await.context("marking seen")?, "seen")
    } else {
        (api.mark_unseen(ids, token).await.context("marking unseen")?, "unseen")
    };
    tracing::info!(verb, accepted = ack.notes.len(), "marked notifications");
    writeln!(out, "marked {verb}: {}", ack.notes.join(", "))?;
    if !ack.unauthorized_notes.is_empty() {
        writeln!(out, "not allowed: {}", ack.unauthorized_notes.join(", "))?;
    }
    Ok(())
}

pub async fn run_post(
    api: &dyn FeedsApi,
    args: &PostArgs,
    token: Option<&str>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let note = args.note();
    let ack = if args.global {
        api.post_global_notification(&note, token).await.context("posting global notification")?
    } else {
        api.post_notification(&note, token).await.context("posting notification")?
    };
    tracing::info!(id = %ack.id, global = args.global, "posted notification");
    writeln!(out, "posted {}", ack.id)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Plain-text output
// ---------------------------------------------------------------------------

fn write_section(
    out: &mut impl Write,
    title: &str,
    notes: &[Notification],
    timestamp_format: &str,
) -> std::io::Result<()> {
    writeln!(out, "{title} notifications ({})", notes.len())?;
    for note in notes {
        write_note(out, note, timestamp_format)?;
    }
    Ok(())
}

fn write_note(out: &mut impl Write, note: &Notification, timestamp_format: &str) -> std::io::Result<()> {
    let view = NotificationView::from(note);
    write!(
        out,
        "  {} {:<8}{:<10} {}  {}  [{}]",
        view.seen_indicator(),
        view.level.as_str().to_ascii_uppercase(),
        view.source,
        view.created.format(timestamp_format),
        view.message,
        view.id,
    )?;
    if let Some(link) = view.link {
        write!(out, "  {link}")?;
    }
    writeln!(out)
}
