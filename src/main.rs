use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use banlist::{
    page, CommentNode, CommentRef, Config, FileStorage, HttpProfileSource, Session, StatsSlot,
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "usage: banlist <thread-url> [ban|unban <author>] [--config <file>]";

struct Args {
    url: String,
    action: Option<(bool, String)>,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Args> {
    let mut url = None;
    let mut action = None;
    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next()?)),
            "ban" => action = Some((true, args.next()?)),
            "unban" => action = Some((false, args.next()?)),
            _ if url.is_none() => url = Some(arg),
            _ => return None,
        }
    }
    Some(Args {
        url: url?,
        action,
        config,
    })
}

/// Asks on the terminal, defaulting to no.
fn confirm_on_stdin(message: &str) -> bool {
    print!("{message} [y/N] ");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let Some(args) = parse_args(std::env::args().skip(1)) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let selectors = config.page_selectors()?;
    let client = reqwest::Client::new();
    let source = HttpProfileSource::new(client.clone(), config.profile_base.clone());
    let storage = FileStorage::open("storage")?;
    let session = Session::new(config, Box::new(storage), source, Box::new(confirm_on_stdin))?;

    let comments = page::load_thread(&client, &args.url, &selectors).await?;
    let authors: Vec<_> = comments.iter().map(|c| session.author_of(&**c)).collect();
    session.activate(comments.iter().map(|c| c.clone() as CommentRef));

    if let Some((ban, author)) = &args.action {
        if session.is_banned(author) == *ban {
            info!(author = %author, banned = *ban, "nothing to change");
        } else {
            let target = session
                .entry(author)
                .and_then(|entry| entry.comments.first().cloned());
            match target {
                Some(comment) => {
                    // Hidden comments only show their toggle once revealed.
                    if comment.saved_content().is_some() {
                        session.click_comment(&*comment);
                    }
                    session.toggle_ban(&*comment);
                }
                None => eprintln!("{author} has no comments in this thread"),
            }
        }
    }

    session.close_queue();
    session.run().await;

    for (n, (comment, author)) in comments.iter().zip(&authors).enumerate() {
        let Some(author) = author else {
            println!("{:>3}  -", n + 1);
            continue;
        };
        let state = if comment.is_hidden() { "hidden" } else { "visible" };
        let control = if session.is_banned(author) { "unban" } else { "ban" };
        let stats = match session.entry(author).as_deref().map(|e| &e.stats) {
            Some(StatsSlot::Resolved(stats)) => stats.summary(),
            _ => String::new(),
        };
        println!("{:>3}  {author}  {state}  [{control}]  {stats}", n + 1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Option<Args> {
        parse_args(line.split_whitespace().map(str::to_owned))
    }

    #[test]
    fn parses_url_action_and_config() {
        let parsed = args("https://dou.ua/forums/topic/1/ ban alice --config c.json").unwrap();
        assert_eq!(parsed.url, "https://dou.ua/forums/topic/1/");
        assert_eq!(parsed.action, Some((true, "alice".to_owned())));
        assert_eq!(parsed.config, Some(PathBuf::from("c.json")));
    }

    #[test]
    fn rejects_missing_or_extra_arguments() {
        assert!(args("").is_none());
        assert!(args("https://a https://b").is_none());
        assert!(args("https://a unban").is_none());
    }
}
