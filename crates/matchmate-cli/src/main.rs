//! matchmate - terminal front-end for the matchmate member service.
//!
//! Signs in against the backend, keeps the session in a cookie file and
//! drives the member administration endpoints.

mod app;
mod format;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use matchmate_core::{MemberStatus, Role};

const USAGE: &str = "\
Usage: matchmate <command> [args]

Commands:
  login [email] [--remember]         Sign in (--remember keeps the session for 30 days)
  logout                             Sign out and forget the session
  whoami                             Show the signed-in user
  oauth-callback <url> [--remember]  Finish an OAuth login from its redirect URL
  members                            List all members
  member <id>                        Show one member
  profile <email> <name> [bio]       Create a member profile
  approve <id>                       Mark a member ACTIVE (admin)
  deactivate <id>                    Mark a member INACTIVE (admin)
  promote <id>                       Grant the ADMIN role (admin)
  delete <id>                        Delete a member (admin)";

/// Initialize the tracing subscriber for logging
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (writer, guard) = tracing_appender::non_blocking(io::stderr());
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

/// Split `flag` out of the positional arguments.
fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|a| a != flag);
    args.len() != before
}

/// `--remember` is only meaningful for commands that start a session; elsewhere
/// it stays a positional value.
fn take_remember(args: &mut Vec<String>) -> bool {
    match args.first().map(String::as_str) {
        Some("login") | Some("oauth-callback") => take_flag(args, "--remember"),
        _ => false,
    }
}

fn required<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing <{}>\n\n{}", name, USAGE))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let remember = take_remember(&mut args);

    let Some(command) = args.first().cloned() else {
        println!("{}", USAGE);
        return Ok(());
    };
    if command == "--help" || command == "-h" || command == "help" {
        println!("{}", USAGE);
        return Ok(());
    }

    info!(command = %command, "matchmate starting");
    let mut app = App::new()?;

    match command.as_str() {
        "login" => app.login(args.get(1).cloned(), remember).await,
        "logout" => {
            app.logout();
            Ok(())
        }
        "whoami" => {
            app.whoami();
            Ok(())
        }
        "oauth-callback" => app.oauth_callback(required(&args, 1, "url")?, remember),
        "members" => app.list_members().await,
        "member" => app.show_member(required(&args, 1, "id")?).await,
        "profile" => {
            let email = required(&args, 1, "email")?.to_string();
            let name = required(&args, 2, "name")?.to_string();
            let bio = args.get(3).cloned();
            app.create_profile(email, name, bio).await
        }
        "approve" => app.set_status(required(&args, 1, "id")?, MemberStatus::Active).await,
        "deactivate" => app.set_status(required(&args, 1, "id")?, MemberStatus::Inactive).await,
        "promote" => app.set_role(required(&args, 1, "id")?, Role::Admin).await,
        "delete" => app.delete_member(required(&args, 1, "id")?).await,
        other => Err(anyhow::anyhow!("Unknown command: {}\n\n{}", other, USAGE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_take_flag() {
        let mut a = args(&["login", "--remember", "ana@example.com"]);
        assert!(take_flag(&mut a, "--remember"));
        assert_eq!(a, args(&["login", "ana@example.com"]));
        assert!(!take_flag(&mut a, "--remember"));
    }

    #[test]
    fn test_remember_only_taken_for_session_commands() {
        let mut a = args(&["login", "ana@example.com", "--remember"]);
        assert!(take_remember(&mut a));
        assert_eq!(a, args(&["login", "ana@example.com"]));

        let mut a = args(&["oauth-callback", "--remember", "?token=t"]);
        assert!(take_remember(&mut a));
        assert_eq!(a, args(&["oauth-callback", "?token=t"]));

        let mut a = args(&["profile", "ana@example.com", "Ana", "--remember"]);
        assert!(!take_remember(&mut a));
        assert_eq!(a[3], "--remember");
    }

    #[test]
    fn test_required_reports_missing_argument() {
        let a = args(&["member"]);
        let err = required(&a, 1, "id").unwrap_err();
        assert!(err.to_string().starts_with("Missing <id>"));
        assert_eq!(required(&args(&["member", "42"]), 1, "id").unwrap(), "42");
    }
}
