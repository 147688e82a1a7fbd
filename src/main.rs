use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use credential_core::crypto::{hash_str, hmac_sha256, pbkdf2};
use credential_core::{
    logging, AuthConfig, AuthError, AuthService, AuthSettings, FileBacking, OsEntropy, UserStore,
};
use dialoguer::Password;

#[derive(Parser, Debug)]
#[command(name = "credctl", version, about = "Manage a credential table and its hashing primitives")]
struct Cli {
    /// TOML config file (defaults apply when omitted).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and log it in.
    Register {
        username: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Verify a password and issue a session.
    Login {
        username: String,
        #[arg(long)]
        password: Option<String>,
        /// Log out again and confirm the session is gone.
        #[arg(long, action = clap::ArgAction::SetTrue)]
        logout: bool,
    },
    /// Show non-secret account details.
    Inspect { username: String },
    /// List all usernames.
    List,
    /// SHA-256 of a string, as hex.
    Hash { text: String },
    /// HMAC-SHA256 of a message, as hex.
    Hmac {
        #[arg(long)]
        key: String,
        message: String,
    },
    /// PBKDF2-HMAC-SHA256 of a password, as hex.
    Pbkdf2 {
        #[arg(long)]
        salt: String,
        #[arg(long, default_value_t = 100_000)]
        iterations: u32,
        #[arg(long, default_value_t = 32)]
        length: usize,
        password: String,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        match e.downcast_ref::<AuthError>() {
            Some(auth) => eprintln!("error[{}]: {e:#}", auth.code()),
            None => eprintln!("error: {e:#}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AuthConfig::load_or_default(cli.config.as_deref())?;
    config.apply_env_overrides()?;
    config.validate()?;
    logging::init(&config.log_level);

    match cli.command {
        Command::Hash { text } => println!("{}", hash_str(&text)),
        Command::Hmac { key, message } => {
            println!("{}", hmac_sha256(key.as_bytes(), message.as_bytes()));
        }
        Command::Pbkdf2 {
            salt,
            iterations,
            length,
            password,
        } => {
            let key = pbkdf2(password.as_bytes(), salt.as_bytes(), iterations, length);
            println!("{}", hex::encode(key));
        }
        Command::Register { username, password } => {
            let auth = open_service(&config);
            let password = read_password(password, true)?;
            let login = auth.register(&username, &password)?;
            println!("registered {}", login.username);
            println!("Set-Cookie: {}", login.cookie().header_value());
        }
        Command::Login {
            username,
            password,
            logout,
        } => {
            let auth = open_service(&config);
            let password = read_password(password, false)?;
            let login = auth.login(&username, &password)?;
            println!("Set-Cookie: {}", login.cookie().header_value());

            let mut visitor = auth.resolve(Some(&login.session_id));
            if !auth.is_authenticated(&visitor) {
                bail!("session for {username} did not resolve after login");
            }
            println!("session resolves to {}", login.username);

            if logout {
                let cookie = auth.logout(&mut visitor);
                println!("Set-Cookie: {}", cookie.header_value());
                if auth.is_authenticated(&auth.resolve(Some(&login.session_id))) {
                    bail!("session for {username} still resolves after logout");
                }
                println!("session invalidated");
            }
        }
        Command::Inspect { username } => {
            let store = open_store(&config);
            let account = store
                .find_by_username(&username)
                .ok_or(AuthError::AccountNotFound)?;
            println!("username:   {}", account.username);
            println!("iterations: {}", account.iteration_count);
            println!("session:    {}", if account.has_session() { "active" } else { "none" });
        }
        Command::List => {
            let store = open_store(&config);
            for name in store.usernames() {
                println!("{name}");
            }
            eprintln!(
                "{} of {} rows ({:?})",
                store.row_count(),
                store.capacity(),
                store.load_status()
            );
        }
    }
    Ok(())
}

fn open_store(config: &AuthConfig) -> Arc<UserStore> {
    let backing = FileBacking::new(&config.database_path);
    Arc::new(UserStore::open(backing, config.capacity))
}

fn open_service(config: &AuthConfig) -> AuthService {
    AuthService::new(open_store(config), OsEntropy, AuthSettings::from(config))
}

fn read_password(flag: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }
    let prompt = Password::new().with_prompt("Password");
    let prompt = if confirm {
        prompt.with_confirmation("Confirm password", "Passwords do not match")
    } else {
        prompt
    };
    prompt.interact().context("read password input")
}
