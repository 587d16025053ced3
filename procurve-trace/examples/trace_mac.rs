//! MAC Trace Example
//!
//! Connects to a ProCurve switch, traces one MAC address to its local port
//! and LLDP neighbour, and prints the result as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example trace_mac -- --host 10.0.0.1 --user manager --password secret \
//!     --mac 04:4b:ed:31:75:cd
//! ```
//!
//! Add `--table` to also dump the full MAC address table. Set `RUST_LOG=debug`
//! to see every command sent.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use procurve_trace::{Driver, DriverBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let Some(mac) = args.mac.clone() else {
        eprintln!("Error: --mac is required");
        Args::print_help();
        std::process::exit(1);
    };

    println!("Connecting to {}:{}...", args.host, args.port);

    let mut builder = DriverBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .timeout(Duration::from_secs(args.timeout))
        .accept_superuser(args.accept_superuser);

    if let Some(password) = &args.password {
        builder = builder.password(password);
    } else if let Some(key_path) = &args.key {
        builder = builder.private_key(key_path);
    } else {
        eprintln!("Error: Must provide either --password or --key");
        std::process::exit(1);
    }

    if let Some(secret) = &args.secret {
        builder = builder.secret(secret);
    }

    let mut driver = builder.build()?;
    driver.open().await?;
    println!("Connected at privilege {}\n", driver.current_privilege());

    let version = driver.get_version().await?;
    println!("Firmware: {} (boot {})\n", version.os_version, version.boot_image);

    let outcome = driver.trace_address(&mac).await;

    let table = match (&outcome, args.table) {
        (Ok(_), true) => Some(driver.get_mac_address_table().await),
        _ => None,
    };

    // Release the session before reporting, whatever happened
    driver.close().await?;

    let result = outcome?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(table) = table {
        let table = table?;
        println!("\nMAC address table ({} entries):", table.len());
        println!("{}", serde_json::to_string_pretty(&table)?);
    }

    Ok(())
}

/// Simple argument parser
struct Args {
    host: String,
    port: u16,
    user: String,
    password: Option<String>,
    secret: Option<String>,
    key: Option<PathBuf>,
    timeout: u64,
    mac: Option<String>,
    table: bool,
    accept_superuser: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Self {
            host: "localhost".to_string(),
            port: 22,
            user: env::var("USER").unwrap_or_else(|_| "manager".to_string()),
            password: None,
            secret: None,
            key: None,
            timeout: 60,
            mac: None,
            table: false,
            accept_superuser: false,
        };

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match args[i].as_str() {
                "--host" | "-h" => parsed.host = value.unwrap_or(parsed.host),
                "--port" | "-p" => {
                    parsed.port = value.and_then(|v| v.parse().ok()).unwrap_or(22)
                }
                "--user" | "-u" => parsed.user = value.unwrap_or(parsed.user),
                "--password" | "-P" => parsed.password = value,
                "--secret" | "-s" => parsed.secret = value,
                "--key" | "-k" => parsed.key = value.map(PathBuf::from),
                "--timeout" | "-t" => {
                    parsed.timeout = value.and_then(|v| v.parse().ok()).unwrap_or(60)
                }
                "--mac" | "-m" => parsed.mac = value,
                "--table" => {
                    parsed.table = true;
                    i += 1;
                    continue;
                }
                "--accept-superuser" => {
                    parsed.accept_superuser = true;
                    i += 1;
                    continue;
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                _ => {}
            }
            i += 2;
        }

        parsed
    }

    fn print_help() {
        println!("Usage: trace_mac [OPTIONS] --mac <ADDRESS>");
        println!();
        println!("Options:");
        println!("  -h, --host <HOST>         Switch hostname or IP (default: localhost)");
        println!("  -p, --port <PORT>         SSH port (default: 22)");
        println!("  -u, --user <USER>         Username (default: $USER)");
        println!("  -P, --password <PASS>     Login password");
        println!("  -s, --secret <SECRET>     Enable secret (default: login password)");
        println!("  -k, --key <PATH>          Private key file");
        println!("  -t, --timeout <SECS>      Command timeout (default: 60)");
        println!("  -m, --mac <ADDRESS>       MAC address to trace");
        println!("      --table               Also print the MAC address table");
        println!("      --accept-superuser    Do not try to escalate a Superuser session");
        println!("      --help                Print help");
    }
}
