// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

use crate::{
    app::{AppState, Focus},
    theme::Theme,
    widgets::{feed_list::FeedAction, poster::PosterKind},
};
use feedtest_core::{FeedScope, FilterPatch, Level};

/// A parsed, validated command ready to be executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Theme(String),
    /// Toggle display of timestamps
    Timestamps,
    /// Re-fetch with the current filters
    Refresh,
    /// Start a session with this token, optionally under another display name
    Token { token: String, name: Option<String> },
    Logout,
    /// `None` clears the filter (`level all`)
    Level(Option<Level>),
    Source(Option<String>),
    Verb(Option<String>),
    /// Toggle include-seen
    Seen,
    /// Toggle reverse sort
    Rev,
    Post(PosterKind),
}

impl Command {
    /// Parse a raw command string (the text after the `:` prefix).
    ///
    /// Returns `Ok(cmd)` on success, `Err(message)` on failure. An empty
    /// string returns `Err("")` as a sentinel meaning "close without acting".
    pub fn parse(input: &str) -> Result<Command, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(String::new());
        }

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input, ""));

        match word {
            "q" | "quit" => Ok(Command::Quit),
            "help" => Ok(Command::Help),
            "ts" | "timestamps" => Ok(Command::Timestamps),
            "refresh" => Ok(Command::Refresh),
            "logout" => Ok(Command::Logout),
            "seen" => Ok(Command::Seen),
            "rev" => Ok(Command::Rev),
            "post" => Ok(Command::Post(PosterKind::Targeted)),
            "global" => Ok(Command::Post(PosterKind::Global)),
            "theme" => {
                if rest.is_empty() {
                    Err("usage: theme <default|gruvbox>".to_string())
                } else {
                    Ok(Command::Theme(rest.to_string()))
                }
            }
            "token" => {
                let mut parts = rest.split_whitespace();
                match parts.next() {
                    Some(token) => Ok(Command::Token {
                        token: token.to_string(),
                        name: parts.next().map(str::to_string),
                    }),
                    None => Err("usage: token <token> [name]".to_string()),
                }
            }
            "level" => match rest {
                "" => Err("usage: level <alert|warning|error|request|all>".to_string()),
                "all" => Ok(Command::Level(None)),
                name => name.parse::<Level>().map(|l| Command::Level(Some(l))).map_err(|e| e.to_string()),
            },
            "source" => filter_arg(rest, "source").map(Command::Source),
            "verb" => filter_arg(rest, "verb").map(Command::Verb),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

fn filter_arg(rest: &str, name: &str) -> Result<Option<String>, String> {
    match rest {
        "" => Err(format!("usage: {name} <{name}|all>")),
        "all" => Ok(None),
        value => Ok(Some(value.to_string())),
    }
}

/// Execute a parsed [`Command`] against the application state.
pub fn execute_command(s: &mut AppState, cmd: Command) {
    match cmd {
        Command::Quit => {
            s.quit = true;
        }
        Command::Help => {
            s.show_help = !s.show_help;
        }
        Command::Theme(name) => {
            s.theme = Theme::by_name(&name);
        }
        Command::Timestamps => {
            s.show_timestamps = !s.show_timestamps;
        }
        Command::Refresh => {
            let filters = s.controller.current_filters();
            s.refresh_feed(filters);
        }
        Command::Token { token, name } => {
            if let Some(name) = name {
                s.display_name = name;
            }
            s.controller.initialize(&s.display_name, &token);
            s.focus = Focus::UserFeed;
        }
        Command::Logout => {
            s.controller.logout();
        }
        Command::Level(level) => s.patch_user_filters(FilterPatch::level(level)),
        Command::Source(source) => s.patch_user_filters(FilterPatch::source(source)),
        Command::Verb(verb) => s.patch_user_filters(FilterPatch::verb(verb)),
        Command::Seen => {
            let value = !s.controller.user().filters.include_seen;
            s.patch_user_filters(FilterPatch::include_seen(value));
        }
        Command::Rev => {
            let value = !s.controller.user().filters.reverse_sort;
            s.patch_user_filters(FilterPatch::reverse_sort(value));
        }
        Command::Post(kind) => s.open_poster(kind),
    }
}

impl AppState {
    fn patch_user_filters(&mut self, patch: FilterPatch) {
        match self.controller.list_mut(FeedScope::User).set_filters(patch) {
            FeedAction::Refresh(filters) => self.refresh_feed(filters),
            other => self.controller.dispatch(FeedScope::User, other),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeApi};
    use feedtest_core::{config::Config, FilterState};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[case("q", Command::Quit)]
    #[case("  quit  ", Command::Quit)]
    #[case("help", Command::Help)]
    #[case("ts", Command::Timestamps)]
    #[case("refresh", Command::Refresh)]
    #[case("logout", Command::Logout)]
    #[case("seen", Command::Seen)]
    #[case("rev", Command::Rev)]
    #[case("post", Command::Post(PosterKind::Targeted))]
    #[case("global", Command::Post(PosterKind::Global))]
    #[case("theme gruvbox", Command::Theme("gruvbox".into()))]
    #[case("level warning", Command::Level(Some(Level::Warning)))]
    #[case("level 3", Command::Level(Some(Level::Error)))]
    #[case("level all", Command::Level(None))]
    #[case("source jobs", Command::Source(Some("jobs".into())))]
    #[case("verb all", Command::Verb(None))]
    fn parse_ok(#[case] input: &str, #[case] expected: Command) {
        assert_eq!(Command::parse(input), Ok(expected));
    }

    #[test]
    fn parse_token_with_optional_name() {
        assert_eq!(
            Command::parse("token abc"),
            Ok(Command::Token { token: "abc".into(), name: None })
        );
        assert_eq!(
            Command::parse("token abc Bob"),
            Ok(Command::Token { token: "abc".into(), name: Some("Bob".into()) })
        );
        assert!(Command::parse("token").is_err());
    }

    #[rstest]
    #[case("theme")]
    #[case("level")]
    #[case("verb")]
    #[case("source")]
    fn parse_missing_argument(#[case] input: &str) {
        assert!(Command::parse(input).unwrap_err().starts_with("usage:"));
    }

    #[test]
    fn parse_bad_level() {
        assert_eq!(Command::parse("level loud"), Err("level \"loud\" not found".into()));
    }

    #[test]
    fn parse_empty_returns_sentinel_err() {
        assert_eq!(Command::parse(""), Err(String::new()));
        assert_eq!(Command::parse("  "), Err(String::new()));
    }

    #[test]
    fn parse_unknown() {
        let err = Command::parse("frobnicate").unwrap_err();
        assert!(err.contains("frobnicate"));
    }

    fn state(api: &Arc<FakeApi>) -> AppState {
        let api: Arc<dyn feedtest_api::FeedsApi> = api.clone();
        AppState::new(
            api,
            tokio::runtime::Handle::current(),
            Config::defaults(),
            Theme::load_default(),
            "alice".into(),
        )
    }

    #[tokio::test]
    async fn token_command_initializes_session() {
        let api = Arc::new(FakeApi::default());
        let mut s = state(&api);
        execute_command(&mut s, Command::Token { token: "t1".into(), name: Some("Bob".into()) });
        s.controller.settle().await;

        assert_eq!(s.display_name, "Bob");
        assert_eq!(s.controller.token(), Some("t1"));
        assert_eq!(s.controller.user().title, "Bob's");
        assert_eq!(api.calls(), vec![Call::List(FilterState::default())]);
    }

    #[tokio::test]
    async fn filter_commands_refresh_with_full_state() {
        let api = Arc::new(FakeApi::default());
        let mut s = state(&api);
        execute_command(&mut s, Command::Token { token: "t1".into(), name: None });
        execute_command(&mut s, Command::Level(Some(Level::Alert)));
        execute_command(&mut s, Command::Rev);
        s.controller.settle().await;

        let expected = FilterState {
            reverse_sort: true,
            level: Some(Level::Alert),
            ..FilterState::default()
        };
        assert_eq!(api.calls().last(), Some(&Call::List(expected)));
        assert_eq!(api.calls().len(), 3);
    }

    #[tokio::test]
    async fn logout_hides_feed_and_toggles_work_locally() {
        let api = Arc::new(FakeApi::default());
        let mut s = state(&api);
        execute_command(&mut s, Command::Token { token: "t1".into(), name: None });
        s.controller.settle().await;
        execute_command(&mut s, Command::Logout);
        execute_command(&mut s, Command::Timestamps);
        execute_command(&mut s, Command::Help);

        assert!(!s.controller.visible());
        assert_eq!(s.show_timestamps, !Config::defaults().ui.show_timestamps);
        assert!(s.show_help);
    }

    #[rstest]
    #[case(Command::Level(Some(Level::Error)))]
    #[case(Command::Source(Some("jobs".into())))]
    #[case(Command::Verb(Some("shared".into())))]
    #[case(Command::Seen)]
    #[case(Command::Rev)]
    #[case(Command::Refresh)]
    #[tokio::test]
    async fn feed_commands_while_signed_out_make_no_calls(#[case] cmd: Command) {
        let api = Arc::new(FakeApi::default());
        let mut s = state(&api);
        execute_command(&mut s, cmd);
        s.controller.settle().await;

        assert!(api.calls().is_empty());
        assert!(!s.controller.visible());
        assert_eq!(s.controller.banner(), None);
    }

    #[tokio::test]
    async fn filter_set_while_signed_out_is_kept_then_reset_by_token() {
        let api = Arc::new(FakeApi::default());
        let mut s = state(&api);
        execute_command(&mut s, Command::Level(Some(Level::Warning)));
        assert_eq!(s.controller.user().filters.level, Some(Level::Warning));

        execute_command(&mut s, Command::Logout);
        execute_command(&mut s, Command::Token { token: "t1".into(), name: None });
        s.controller.settle().await;
        assert_eq!(api.calls(), vec![Call::List(FilterState::default())]);
    }

    #[tokio::test]
    async fn post_command_opens_poster() {
        let api = Arc::new(FakeApi::default());
        let mut s = state(&api);
        execute_command(&mut s, Command::Post(PosterKind::Global));
        assert_eq!(s.focus, Focus::Poster);
        assert_eq!(s.poster.as_ref().map(|p| p.kind), Some(PosterKind::Global));
    }
}
