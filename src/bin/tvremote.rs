use clap::{Parser, Subcommand};
use log::warn;
use samsungtv::{token_cache, ClientConfig, Error, RemoteKey, SamsungTV, DEFAULT_PORT};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Send remote keys to a Samsung TV", long_about = None)]
struct Args {
    /// TV hostname or IP address
    #[arg(long, env = "SAMSUNG_TV_HOST")]
    host: String,

    /// TV HTTPS JSON-RPC port
    #[arg(long, env = "SAMSUNG_TV_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Access token created through the pairing prompt. If omitted, the
    /// cache is tried and then a new token is requested.
    #[arg(long, env = "SAMSUNG_TV_TOKEN")]
    token: Option<String>,

    /// File the paired token is read from and written to.
    #[arg(long, env = "SAMSUNG_TV_TOKEN_CACHE")]
    token_cache: Option<PathBuf>,

    /// Enable TLS certificate verification (off by default for self-signed certs).
    #[arg(long)]
    verify_ssl: bool,

    /// Seconds to wait for an ordinary request.
    #[arg(long, default_value = "10", value_parser = positive_secs)]
    timeout: Duration,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Request a new access token and print it.
    Pair,
    /// Send a sequence of remote keys.
    Send {
        /// Keys to press, e.g. MENU CURSOR_DN ENTER
        #[arg(default_values_t = [RemoteKey::Menu])]
        keys: Vec<RemoteKey>,

        /// Seconds to wait between key presses.
        #[arg(long, default_value = "0.2", value_parser = non_negative_secs)]
        delay: Duration,
    },
    /// Print TV and video states and attached peripherals.
    States,
}

fn non_negative_secs(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("{value:?} is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("{value:?} is not a valid duration"))
}

fn positive_secs(value: &str) -> Result<Duration, String> {
    let duration = non_negative_secs(value)?;
    if duration.is_zero() {
        return Err("must be greater than zero".to_string());
    }
    Ok(duration)
}

async fn pair(tv: &mut SamsungTV, cache: Option<&PathBuf>) -> Result<String, Error> {
    println!("Requesting an access token (accept the prompt on the TV)...");
    let token = tv.create_access_token().await?;
    println!("Access token granted: {token}");
    if let Some(path) = cache {
        if let Err(err) = token_cache::store(path, &token) {
            warn!("could not cache token in {}: {err}", path.display());
        }
    }
    Ok(token)
}

/// Peripheral classes missing from the firmware are reported as empty.
fn or_empty(result: Result<Value, Error>) -> Result<Value, Error> {
    match result {
        Err(err) if err.is_method_not_found() => Ok(Value::Array(Vec::new())),
        result => result,
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let token = args
        .token
        .clone()
        .or_else(|| args.token_cache.as_deref().and_then(token_cache::load));
    let config = ClientConfig::new(&args.host)
        .with_port(args.port)
        .with_verify_tls(args.verify_ssl)
        .with_access_token(token)
        .with_request_timeout(args.timeout);
    let mut tv = SamsungTV::connect(config)?;

    match args.command {
        Command::Pair => {
            pair(&mut tv, args.token_cache.as_ref()).await?;
        }
        Command::Send { keys, delay } => {
            if tv.access_token().is_none() {
                pair(&mut tv, args.token_cache.as_ref()).await?;
            }
            let total = keys.len();
            for (idx, key) in keys.into_iter().enumerate() {
                println!("[{}/{}] Sending {}", idx + 1, total, key);
                tv.remote_key_control(key).await?;
                if !delay.is_zero() && idx + 1 < total {
                    tokio::time::sleep(delay).await;
                }
            }
        }
        Command::States => {
            if tv.access_token().is_none() {
                pair(&mut tv, args.token_cache.as_ref()).await?;
            }
            println!("TV states: {}", tv.get_tv_states().await?);
            println!("Video states: {}", tv.get_video_states().await?);
            println!("USB devices: {}", or_empty(tv.usb_source_control().await)?);
            println!("RVU devices: {}", or_empty(tv.rvu_source_control().await)?);
            println!(
                "External speakers: {}",
                or_empty(tv.external_speaker_control().await)?
            );
        }
    }

    tv.close();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("INFO"))
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Millis))
        .init();

    tokio::select! {
        result = run(args) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Samsung TV request failed: {err}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Cancelled by user");
            ExitCode::from(130)
        }
    }
}
