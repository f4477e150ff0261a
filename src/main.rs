mod host;
mod logger;
mod roster;
mod script;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::{env, io};

use data::config::{self, Config};
use data::environment;
use data::{Decision, Helper, Inbound, Outgoing, Rewrite};
use thiserror::Error;
use tokio::io::AsyncReadExt;

use self::host::Console;
use self::roster::Roster;
use self::script::Event;

#[tokio::main]
async fn main() -> ExitCode {
    #[cfg(debug_assertions)]
    let is_debug = true;
    #[cfg(not(debug_assertions))]
    let is_debug = cfg!(feature = "debug");

    if let Err(error) = logger::setup(is_debug) {
        eprintln!("{error}");
    }

    log::info!("irchelper ({}) has started", environment::VERSION);

    match run(env::args().skip(1)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error}");
            eprintln!("irchelper: {error}");
            ExitCode::FAILURE
        }
    }
}

/// `irchelper [CONFIG] [SCRIPT]`, reading the script from stdin when no
/// path is given.
async fn run(mut args: impl Iterator<Item = String>) -> Result<(), Error> {
    let config = match args.next().filter(|path| path != "-") {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None if Config::path().is_file() => Config::load()?,
        None => {
            log::info!("no config at {}, using defaults", Config::path().display());
            Config::default()
        }
    };

    let script = match args.next() {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut script = String::new();
            tokio::io::stdin().read_to_string(&mut script).await?;
            script
        }
    };

    let console = Arc::new(Console::new(Roster::load().await?));
    let helper = Helper::new(console.clone(), &config);

    for (number, line) in script.lines().enumerate() {
        match script::parse(line) {
            Ok(Some(event)) => replay(&helper, &console, &config, event).await,
            Ok(None) => {}
            Err(error) => {
                log::warn!("line {}: {error}", number + 1);
            }
        }
    }

    console.roster().save().await?;

    Ok(())
}

async fn replay(helper: &Helper, console: &Console, config: &Config, event: Event) {
    match event {
        Event::SignOn {
            connection,
            login,
            nickname,
        } => {
            let account = config.account(&login);
            let nickname = nickname.unwrap_or_else(|| account.nickname().to_string());

            console.sign_on(connection, &account.login, &nickname);
            helper.on_signed_on(connection, account);
        }
        Event::SignOff(connection) => {
            helper.on_signed_off(connection);
            console.sign_off(connection);
        }
        Event::Nick {
            connection,
            nickname,
        } => console.rename(connection, &nickname),
        Event::Open { connection, chat } => {
            console.open_chat(connection, &chat);
            helper.on_chat_opened(connection, &chat);
        }
        Event::Close { connection, chat } => {
            console.close_chat(connection, &chat);
            helper.on_chat_closed(connection, &chat);
        }
        Event::Inbound {
            connection,
            kind,
            sender,
            body,
        } => {
            let message = Inbound::new(&sender, &body, kind);

            match helper.on_inbound(connection, &message) {
                Decision::Pass => println!("{connection} <{sender}> ({kind}) {body}"),
                Decision::Suppress => println!("{connection} -- suppressed <{sender}> {body}"),
                Decision::Replace { channel, body } => {
                    println!("{connection} {channel} * {sender}: {body}");
                }
            }
        }
        Event::Topic {
            connection,
            chat,
            topic,
        } => console.set_topic(connection, &chat, &topic),
        Event::System {
            connection,
            chat,
            body,
        } => {
            let topic = console.topic(connection, &chat);
            let line = Outgoing {
                chat: &chat,
                body: &body,
                topic: topic.as_deref(),
                system: true,
            };

            match helper.on_outgoing_chat_write(connection, &line) {
                Rewrite::Keep => println!("{connection} {chat} * {body}"),
                Rewrite::Cancel => println!("{connection} -- cancelled {chat} * {body}"),
            }
        }
        Event::Sleep(duration) => tokio::time::sleep(duration).await,
    }
}

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error("roster: {0}")]
    Roster(#[from] roster::Error),
    #[error("script: {0}")]
    Script(#[from] io::Error),
}
