//! Interactive session loop over stdin.

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, BufReader};

use yukti_content::ContentPipeline;
use yukti_core::{AppConfig, Language, Platform};
use yukti_publish::{AnalyticsTracker, PublishOutcome, PublishingManager};

use crate::session::Session;
use crate::{render, services};

const HELP: &str = "\
commands:
  generate <topic>                 generate copy for every platform
  lang <language>                  show the copy in another language (english to reset)
  publish <platform|all> [media]   publish the current English copy
  influencers [description]        find channels (defaults to the current topic)
  clear                            forget topic, copy and caches
  help                             show this message
  quit                             leave the session
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PublishTarget {
    All,
    One(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReplCommand {
    Generate(String),
    Lang(String),
    Publish {
        target: PublishTarget,
        media: Option<PathBuf>,
    },
    Influencers(Option<String>),
    Clear,
    Help,
    Quit,
}

/// Parses one input line. Blank lines are `Ok(None)`; malformed ones return
/// a usage message.
pub(crate) fn parse_line(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match verb.to_lowercase().as_str() {
        "generate" | "gen" => {
            if rest.is_empty() {
                return Err("usage: generate <topic>".to_string());
            }
            ReplCommand::Generate(rest.to_string())
        }
        "lang" | "language" => {
            if rest.is_empty() {
                return Err("usage: lang <language>".to_string());
            }
            ReplCommand::Lang(rest.to_string())
        }
        "publish" => {
            let mut parts = rest.splitn(2, char::is_whitespace);
            let target = match parts.next().filter(|p| !p.is_empty()) {
                Some(p) if p.eq_ignore_ascii_case("all") => PublishTarget::All,
                Some(p) => PublishTarget::One(p.to_lowercase()),
                None => return Err("usage: publish <platform|all> [media]".to_string()),
            };
            let media = parts.next().map(str::trim).filter(|m| !m.is_empty()).map(PathBuf::from);
            ReplCommand::Publish { target, media }
        }
        "influencers" => ReplCommand::Influencers((!rest.is_empty()).then(|| rest.to_string())),
        "clear" => ReplCommand::Clear,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => return Err(format!("unknown command '{other}'; type help")),
    };
    Ok(Some(command))
}

/// Runs the interactive loop until `quit` or end of input.
///
/// # Errors
///
/// Returns an error if the content pipeline or influencer finder cannot be
/// built, or stdin cannot be read.
pub(crate) async fn run_session(config: &AppConfig) -> anyhow::Result<()> {
    let pipeline = services::content_pipeline(config)?;
    let finder = services::influencer_finder(config)?;
    let manager = services::publishing_manager(config);
    let mut tracker = services::analytics_tracker();
    let mut session = Session::new();
    let mut language: Option<Language> = None;

    print!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("yukti> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };

        match command {
            ReplCommand::Generate(topic) => {
                let posts = session.generate(&pipeline, &topic).await;
                print!("{}", render::format_posts(posts, None));
                if let Some(language) = language {
                    show_translation(&mut session, &pipeline, language).await;
                }
            }
            ReplCommand::Lang(query) => match services::resolve_language(&query) {
                Ok(chosen) if chosen.is_english() => {
                    language = None;
                    print!("{}", render::format_posts(session.posts(), None));
                }
                Ok(chosen) => {
                    language = Some(chosen);
                    show_translation(&mut session, &pipeline, chosen).await;
                }
                Err(e) => println!("{e}"),
            },
            ReplCommand::Publish { target, media } => {
                publish(&session, &manager, &mut tracker, &target, media.as_deref()).await;
            }
            ReplCommand::Influencers(description) => {
                let description = description.or_else(|| session.topic().map(str::to_owned));
                let Some(description) = description else {
                    println!("usage: influencers <description> (or generate a topic first)");
                    continue;
                };
                match session
                    .influencers(&finder, &description, yukti_influencer::DEFAULT_TOP_N)
                    .await
                {
                    Ok(records) => print!("{}", render::format_influencers(records)),
                    Err(e) => println!("{e}"),
                }
            }
            ReplCommand::Clear => {
                session.clear();
                language = None;
                println!("session cleared");
            }
            ReplCommand::Help => print!("{HELP}"),
            ReplCommand::Quit => break,
        }
    }
    Ok(())
}

async fn show_translation(session: &mut Session, pipeline: &ContentPipeline, language: Language) {
    if session.posts().is_empty() {
        println!("language set to {}; generate a topic to see it", language.name);
        return;
    }
    let translations = session.translated(pipeline, language.code).await.cloned();
    print!("{}", render::format_posts(session.posts(), translations.as_ref()));
}

async fn publish(
    session: &Session,
    manager: &PublishingManager,
    tracker: &mut AnalyticsTracker,
    target: &PublishTarget,
    media: Option<&Path>,
) {
    let contents = session.contents();
    if contents.is_empty() {
        println!("nothing to publish; generate a topic first");
        return;
    }

    let outcomes: Vec<PublishOutcome> = match target {
        PublishTarget::All => {
            let registered: BTreeMap<Platform, String> = contents
                .into_iter()
                .filter(|(platform, _)| manager.registry().get(*platform).is_some())
                .collect();
            manager.publish_all(&registered, media).await.into_values().collect()
        }
        PublishTarget::One(name) => {
            let Some(content) = name.parse::<Platform>().ok().and_then(|p| contents.get(&p)) else {
                println!("no copy for '{name}'");
                return;
            };
            vec![manager.publish(name, content, media).await]
        }
    };

    for outcome in outcomes {
        print!("{}", render::format_outcome(&outcome));
        if let PublishOutcome::Published(post) = &outcome {
            tracker.track_post(post.platform, &post.post_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn generate_keeps_the_whole_topic() {
        assert_eq!(
            parse_line("generate  eco-friendly water bottles "),
            Ok(Some(ReplCommand::Generate("eco-friendly water bottles".to_string())))
        );
        assert!(parse_line("generate").is_err());
    }

    #[test]
    fn publish_parses_target_and_media() {
        assert_eq!(
            parse_line("publish Instagram /tmp/my photo.png"),
            Ok(Some(ReplCommand::Publish {
                target: PublishTarget::One("instagram".to_string()),
                media: Some(PathBuf::from("/tmp/my photo.png")),
            }))
        );
        assert_eq!(
            parse_line("publish ALL"),
            Ok(Some(ReplCommand::Publish {
                target: PublishTarget::All,
                media: None,
            }))
        );
        assert!(parse_line("publish").is_err());
    }

    #[test]
    fn influencers_description_is_optional() {
        assert_eq!(parse_line("influencers"), Ok(Some(ReplCommand::Influencers(None))));
        assert_eq!(
            parse_line("influencers vegan snacks"),
            Ok(Some(ReplCommand::Influencers(Some("vegan snacks".to_string()))))
        );
    }

    #[test]
    fn simple_verbs_and_unknown_input() {
        assert_eq!(parse_line("lang Hindi"), Ok(Some(ReplCommand::Lang("Hindi".to_string()))));
        assert_eq!(parse_line("CLEAR"), Ok(Some(ReplCommand::Clear)));
        assert_eq!(parse_line("exit"), Ok(Some(ReplCommand::Quit)));
        assert_eq!(parse_line("?"), Ok(Some(ReplCommand::Help)));
        assert!(parse_line("dance").unwrap_err().contains("unknown command"));
    }
}
