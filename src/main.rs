mod cmd;
mod collab;
mod config;
mod logging;
mod profile;
mod session;
mod totp;
mod ui;
mod util;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use cmd::code::{CodeOptions, UriOptions};
use cmd::login::LoginOptions;
use cmd::Ctx;
use config::{Config, DEFAULT_CONFIG_PATH};
use profile::BrowserKind;
use ui::UX;
use util::audit::AuditLog;

#[derive(Debug, Parser)]
#[command(
    name = "mailgate",
    version,
    about = "TOTP codes and persistent browser profiles for webmail sign-in automation"
)]
struct Cli {
    /// Config file (TOML, or YAML by extension). Defaults to ./mailgate.toml when present.
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Only print results and warnings
    #[arg(long, short, global = true)]
    quiet: bool,
    /// More log output on stderr (repeatable)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current 2FA code
    Code {
        /// Base32 secret in any spacing or case
        #[arg(env = "MAILGATE_TOTP_SECRET", hide_env_values = true)]
        secret: Option<String>,
        /// Unix time to compute the code for instead of now
        #[arg(long, value_name = "UNIX_SECS")]
        at: Option<u64>,
        /// Output JSON (code and remaining seconds)
        #[arg(long)]
        json: bool,
    },
    /// Print the normalized form of a secret
    Normalize { secret: String },
    /// Print an otpauth:// provisioning URI
    Uri {
        #[arg(env = "MAILGATE_TOTP_SECRET", hide_env_values = true)]
        secret: Option<String>,
        /// Account label (defaults to account.email)
        #[arg(long)]
        account: Option<String>,
        /// Issuer (defaults to account.issuer)
        #[arg(long)]
        issuer: Option<String>,
        /// Also draw the URI as a QR code on stderr
        #[arg(long)]
        qr: bool,
    },
    /// Manage persistent browser profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Open a profile and hand a fresh code to the browser driver on stdout
    Login {
        profile_id: String,
        #[arg(env = "MAILGATE_TOTP_SECRET", hide_env_values = true)]
        secret: Option<String>,
        #[arg(long, value_name = "UNIX_SECS")]
        at: Option<u64>,
    },
    /// Configuration helpers
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum ProfileCommand {
    /// Create <browser>_<name> under the profile base directory
    Create {
        name: String,
        /// chromium or firefox (defaults to profiles.default_browser)
        #[arg(long, short)]
        browser: Option<BrowserKind>,
        #[arg(long)]
        overwrite: bool,
    },
    /// List profile directories
    List,
    /// Print the directory of a profile
    Path { name: String },
    /// Delete a profile directory
    Delete { name: String },
    /// Show a profile record by id
    Show { id: String },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Write a starter config
    Init {
        #[arg(default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::LogConfig::from_env(cli.verbose));

    let ui = UX::new(cli.quiet);
    match run(cli, &ui) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, ui: &UX) -> Result<()> {
    // `config init` must work before any config exists.
    if let Command::Config(ConfigCommand::Init { path, force }) = &cli.command {
        let ctx = Ctx {
            ui: ui.clone(),
            cfg: Config::default(),
            audit: AuditLog::disabled(),
        };
        return cmd::setup::run_config_init(&ctx, path, *force);
    }

    let cfg = Config::resolve(cli.config.as_deref())?;
    let ctx = Ctx {
        ui: ui.clone(),
        audit: AuditLog::from_config(&cfg.audit),
        cfg,
    };

    match cli.command {
        Command::Code { secret, at, json } => {
            cmd::code::run_code(&ctx, CodeOptions { secret, at, json })
        }
        Command::Normalize { secret } => cmd::code::run_normalize(&ctx, &secret),
        Command::Uri {
            secret,
            account,
            issuer,
            qr,
        } => cmd::code::run_uri(
            &ctx,
            UriOptions {
                secret,
                account,
                issuer,
                qr,
            },
        ),
        Command::Profile(p) => match p {
            ProfileCommand::Create {
                name,
                browser,
                overwrite,
            } => cmd::profile::run_create(&ctx, &name, browser, overwrite),
            ProfileCommand::List => cmd::profile::run_list(&ctx),
            ProfileCommand::Path { name } => cmd::profile::run_path(&ctx, &name),
            ProfileCommand::Delete { name } => cmd::profile::run_delete(&ctx, &name),
            ProfileCommand::Show { id } => cmd::profile::run_show(&ctx, &id),
        },
        Command::Login {
            profile_id,
            secret,
            at,
        } => cmd::login::run_login(
            &ctx,
            LoginOptions {
                profile_id,
                secret,
                at,
            },
        ),
        Command::Config(ConfigCommand::Init { .. }) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_code_with_time_override() {
        let cli = Cli::try_parse_from(["mailgate", "code", "JBSW Y3DP", "--at", "59", "--json"])
            .unwrap();
        match cli.command {
            Command::Code { secret, at, json } => {
                assert_eq!(secret.as_deref(), Some("JBSW Y3DP"));
                assert_eq!(at, Some(59));
                assert!(json);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_profile_create_browser() {
        let cli = Cli::try_parse_from([
            "mailgate", "-q", "profile", "create", "work", "--browser", "firefox",
        ])
        .unwrap();
        assert!(cli.quiet);
        match cli.command {
            Command::Profile(ProfileCommand::Create { name, browser, .. }) => {
                assert_eq!(name, "work");
                assert_eq!(browser, Some(BrowserKind::Firefox));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
