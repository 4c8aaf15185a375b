//! Minimal CLI parsing for the operator commands.

use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Profile(String),
    Followers(String),
    Follows(String),
    FollowerCount(String),
}

#[derive(Debug, Default)]
pub struct CliOptions {
    pub command: Option<Command>,
    pub json_logs: bool,
}

pub const USAGE: &str = "usage: comics-bluesky [--json-logs] <profile|followers|follows|follower-count> <actor>";

impl CliOptions {
    pub fn from_args() -> Self {
        Self::parse(env::args().skip(1))
    }

    fn parse(args: impl IntoIterator<Item = String>) -> Self {
        let mut options = CliOptions::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let command = match arg.as_str() {
                "--json-logs" => {
                    options.json_logs = true;
                    continue;
                }
                "profile" => args.next().map(Command::Profile),
                "followers" => args.next().map(Command::Followers),
                "follows" => args.next().map(Command::Follows),
                "follower-count" => args.next().map(Command::FollowerCount),
                _ => None,
            };
            if command.is_some() {
                options.command = command;
            }
        }
        options
    }
}
