//! Interactive client for a flatlink collection server
//! Flow: connect -> login -> command loop, back to the shell on loss

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use flatlink_core::types::record::{Coordinates, House, Transport, View};
use flatlink_core::{
    authenticate, ChannelConfig, Connection, CoreError, Record, Session, SessionEvent,
    SYNC_PERIOD_SECS,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flatlink", about = "Client for a flatlink collection server")]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Server port
    #[arg(short, long)]
    port: u16,
    /// Login name
    #[arg(short, long)]
    login: String,
    /// Password (prompted if omitted)
    #[arg(long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let password = match args.password {
        Some(password) => password,
        None => prompt(&mut lines, "password: ").await?,
    };

    println!("Connecting to {}:{}...", args.host, args.port);
    let connection = Connection::connect(&args.host, args.port, ChannelConfig::default())
        .await
        .context("could not reach the server, check host/port and retry")?;

    let session = match authenticate(connection, &args.login, &password).await {
        Ok(session) => session,
        Err(CoreError::InvalidCredentials) => {
            return Err(anyhow!("login rejected, check your credentials and retry"));
        }
        Err(err) => return Err(err).context("login failed"),
    };
    println!(
        "Logged in as {} at {} ({} records, {} commands). Type 'help'.",
        session.login(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        session.store().len(),
        session.catalog().len()
    );

    let sync_task = session.spawn_sync(Duration::from_secs(SYNC_PERIOD_SECS));
    let mut events = session.subscribe();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(SessionEvent::CollectionReplaced(image)) => {
                        println!("[collection updated: {} records]", image.len());
                    }
                    Ok(SessionEvent::ConnectionLost) => {
                        println!("Connection lost. Restart the client to reconnect.");
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                match line.as_str() {
                    "quit" | "exit" => break,
                    "help" => print_help(&session),
                    "list" => print_collection(&session),
                    _ => {
                        if let Err(err) = dispatch(&session, &mut lines, &line).await {
                            println!("error: {err}");
                        }
                        if !session.is_connected() {
                            println!("Connection lost. Restart the client to reconnect.");
                            break;
                        }
                    }
                }
            }
        }
    }

    sync_task.abort();
    Ok(())
}

/// Parse `name [args...]` and submit it through the session
async fn dispatch(session: &Session, lines: &mut Lines<BufReader<Stdin>>, line: &str) -> Result<()> {
    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default().to_string();
    let args: Vec<String> = parts.map(str::to_string).collect();

    let descriptor = session
        .catalog()
        .get(&name)
        .ok_or_else(|| anyhow!("unknown command {name:?}, see 'help'"))?;

    let record = if descriptor.requires_record {
        Some(prompt_record(lines).await?)
    } else {
        None
    };

    let response = session.submit_command(&name, args, record).await?;
    println!("{}", response.message);
    Ok(())
}

fn print_help(session: &Session) {
    println!("Local commands: help, list, quit");
    println!("Server commands:");
    for (name, descriptor) in session.catalog().iter() {
        let record = if descriptor.requires_record {
            " + record"
        } else {
            ""
        };
        println!("  {name} ({} args{record})", descriptor.arg_count);
    }
}

fn print_collection(session: &Session) {
    let snapshot = session.store().snapshot();
    if snapshot.is_empty() {
        println!("(collection is empty)");
        return;
    }
    for record in snapshot.values() {
        let own = if record.owner == session.login() {
            "*"
        } else {
            " "
        };
        println!(
            "{own}{:>5}  {:<24} {:>8.1} m2 {:>10.0}  {:<8} {:<7} {}  {}",
            record.id,
            record.name,
            record.area,
            record.price,
            record.view,
            record.transport,
            record.created_at.format("%Y-%m-%d %H:%M %:z"),
            record.owner,
        );
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<String> {
    use std::io::Write;
    print!("{label}");
    std::io::stdout().flush()?;
    lines
        .next_line()
        .await?
        .map(|value| value.trim().to_string())
        .ok_or_else(|| anyhow!("stdin closed"))
}

async fn prompt_parsed<T: std::str::FromStr>(
    lines: &mut Lines<BufReader<Stdin>>,
    label: &str,
) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    let value = prompt(lines, label).await?;
    value
        .parse()
        .map_err(|err| anyhow!("invalid value {value:?}: {err}"))
}

/// Read record fields line by line. Bounds are enforced by
/// `Record::validate` inside the session before anything is sent.
async fn prompt_record(lines: &mut Lines<BufReader<Stdin>>) -> Result<Record> {
    println!("-- record fields --");
    let name = prompt(lines, "name: ").await?;
    let x = prompt_parsed(lines, "coordinate x (> 0): ").await?;
    let y = prompt_parsed(lines, "coordinate y (> 0): ").await?;
    let area = prompt_parsed(lines, "area (> 0): ").await?;
    let number_of_rooms = prompt_parsed(lines, "number of rooms (> 0): ").await?;
    let price = prompt_parsed(lines, "price (> 0): ").await?;
    let view: View = prompt_parsed(lines, "view (STREET/YARD/BAD/GOOD/TERRIBLE): ").await?;
    let transport: Transport =
        prompt_parsed(lines, "transport (FEW/NONE/LITTLE/NORMAL/ENOUGH): ").await?;
    let house_name = prompt(lines, "house name (optional): ").await?;
    let year = prompt_parsed(lines, "house year (> 0): ").await?;
    let number_of_floors = prompt_parsed(lines, "number of floors (> 0): ").await?;
    let flats_per_floor = prompt_parsed(lines, "flats per floor (> 0): ").await?;
    let number_of_lifts = prompt_parsed(lines, "number of lifts (> 0): ").await?;

    Ok(Record::new(
        name,
        Coordinates { x, y },
        area,
        number_of_rooms,
        price,
        view,
        transport,
        House {
            name: (!house_name.is_empty()).then_some(house_name),
            year,
            number_of_floors,
            flats_per_floor,
            number_of_lifts,
        },
    ))
}
