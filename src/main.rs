use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
mod auth;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use vaultkey::output::{OutputFile, Overwrite};
use vaultkey::{ErrorKind, MAX_FILE_SIZE, naming, strength};
use zeroize::Zeroizing;

#[derive(Debug, Parser)]
#[command(name = "vaultkey")]
#[command(
    version,
    about = "Offline, password-protected and tamper-evident file encryption."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a file into a password-protected container
    #[command(arg_required_else_help = true)]
    Encrypt {
        input: PathBuf,

        /// Where to write the container (default: next to the input)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Name the output `<stem>.dat`, hiding the original extension
        #[arg(long, default_value_t = false)]
        stealth: bool,

        /// Replace the output file if it already exists
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Largest file accepted, in bytes
        #[arg(
            long,
            value_name = "BYTES",
            env = "VAULTKEY_MAX_SIZE",
            default_value_t = MAX_FILE_SIZE
        )]
        max_size: u64,

        /// Skip the password strength check
        #[arg(long, default_value_t = false)]
        allow_weak_password: bool,
    },

    /// Decrypts a container back into the original file
    #[command(arg_required_else_help = true)]
    Decrypt {
        input: PathBuf,

        /// Where to write the file (default: original name, next to the input)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Replace the output file if it already exists
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Shows the header of a container; needs no password
    #[command(arg_required_else_help = true)]
    Inspect {
        input: PathBuf,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Rates a password the way `encrypt` does
    Strength {
        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn overwrite_mode(force: bool) -> Overwrite {
    if force {
        Overwrite::Allow
    } else {
        Overwrite::Deny
    }
}

fn file_name_of(path: &Path) -> Result<&str> {
    path.file_name()
        .context("input path has no file name")?
        .to_str()
        .context("input file name is not valid UTF-8")
}

fn encrypt(
    input: PathBuf,
    output: Option<PathBuf>,
    stealth: bool,
    force: bool,
    max_size: u64,
    allow_weak_password: bool,
) -> Result<()> {
    let meta = fs::metadata(&input).with_context(|| format!("cannot read {}", input.display()))?;
    vaultkey::check_file_size(meta.len(), max_size)?;

    let filename = file_name_of(&input)?;
    let out = OutputFile::new(output.unwrap_or_else(|| {
        input.with_file_name(naming::encrypted_file_name(filename, stealth))
    }));
    if !force && out.exists() {
        bail!(
            "{} already exists (use --force to overwrite)",
            out.path().display()
        );
    }

    let password = auth::read_new_password()?;
    let rating = strength::estimate(&password);
    if !rating.is_acceptable() {
        if !allow_weak_password {
            bail!(
                "password is too weak ({}, {}/100): use at least {} characters mixing \
                 upper and lower case letters, numbers and symbols, or pass --allow-weak-password",
                rating.level(),
                rating.score(),
                strength::MIN_PASSWORD_CHARS
            );
        }
        tracing::warn!(level = %rating.level(), "encrypting with a weak password");
    }

    let plaintext =
        Zeroizing::new(fs::read(&input).with_context(|| format!("cannot read {}", input.display()))?);
    tracing::info!(
        file = filename,
        size = %vaultkey::format_file_size(plaintext.len() as u64),
        "encrypting"
    );

    let artifact = vaultkey::encrypt(&plaintext, filename, &password, max_size)?;
    drop(password);

    out.write(&artifact, overwrite_mode(force))?;
    println!(
        "encrypted '{}' -> '{}'",
        input.display(),
        out.path().display()
    );
    Ok(())
}

fn decrypt(input: PathBuf, output: Option<PathBuf>, force: bool) -> Result<()> {
    let data = fs::read(&input).with_context(|| format!("cannot read {}", input.display()))?;

    let password = auth::read_password()?;
    let decrypted = vaultkey::decrypt(&data, &password)?;
    drop(password);

    let out = OutputFile::new(output.unwrap_or_else(|| {
        input.with_file_name(naming::sanitize_file_name(decrypted.filename()))
    }));
    out.write(decrypted.data(), overwrite_mode(force))?;

    println!(
        "decrypted '{}' -> '{}' (original name: {})",
        input.display(),
        out.path().display(),
        decrypted.filename()
    );
    Ok(())
}

fn inspect(input: PathBuf, json: bool) -> Result<()> {
    let data = fs::read(&input).with_context(|| format!("cannot read {}", input.display()))?;
    let info = vaultkey::inspect(&data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{info}");
    }
    Ok(())
}

fn rate_password(json: bool) -> Result<()> {
    let password = auth::read_password()?;
    let rating = strength::estimate(&password);

    if json {
        let report = serde_json::json!({
            "score": rating.score(),
            "level": rating.level(),
            "acceptable": rating.is_acceptable(),
        });
        println!("{report}");
    } else {
        println!("Strength   : {} ({}/100)", rating.level(), rating.score());
        println!(
            "Acceptable : {}",
            if rating.is_acceptable() { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Encrypt {
            input,
            output,
            stealth,
            force,
            max_size,
            allow_weak_password,
        } => encrypt(input, output, stealth, force, max_size, allow_weak_password),
        Commands::Decrypt {
            input,
            output,
            force,
        } => decrypt(input, output, force),
        Commands::Inspect { input, json } => inspect(input, json),
        Commands::Strength { json } => rate_password(json),
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Exit status per error class; clap itself uses 2 for usage errors.
fn exit_code(err: &anyhow::Error) -> ExitCode {
    let kind = err
        .chain()
        .find_map(|e| e.downcast_ref::<vaultkey::Error>())
        .map(vaultkey::Error::kind);

    match kind {
        Some(ErrorKind::PasswordOrIntegrity) => ExitCode::from(3),
        Some(ErrorKind::CorruptedFormat | ErrorKind::UnsupportedVersion) => ExitCode::from(4),
        Some(ErrorKind::SizeLimit) => ExitCode::from(5),
        _ => ExitCode::FAILURE,
    }
}

fn main() -> ExitCode {
    // values from .env feed the clap `env` fallbacks and the password lookup
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_code(&e)
        }
    }
}
