//! riftlog CLI Client
//!
//! Command-line interface for producing to and consuming from a riftlog
//! server.
//!
//! Uses a single TCP stream for sequential write-then-read; cloning the
//! socket into separate reader/writer handles trips over OS-level socket
//! shutdown semantics on some platforms.

use std::io::{BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use clap::{Parser, Subcommand};
use riftlog::protocol::{encode_command, read_response, Command, Response, Status};
use riftlog::record::Record;

/// riftlog CLI
#[derive(Parser, Debug)]
#[command(name = "riftlog-cli")]
#[command(about = "CLI for the riftlog commit log")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    server: String,

    /// Connection timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a record; prints the assigned offset
    Produce {
        /// The record value
        value: String,
    },

    /// Read the record at an offset
    Consume {
        /// The offset to read
        offset: u64,
    },

    /// Print the log's lowest and highest offsets
    Offsets,

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    let command = match &args.command {
        Commands::Produce { value } => Command::Produce {
            value: value.as_bytes().to_vec(),
        },
        Commands::Consume { offset } => Command::Consume { offset: *offset },
        Commands::Offsets => Command::Offsets,
        Commands::Ping => Command::Ping,
    };

    let mut stream = match TcpStream::connect_timeout(
        &args.server.parse().expect("Invalid server address"),
        Duration::from_millis(args.timeout),
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let _ = stream.set_read_timeout(Some(Duration::from_millis(args.timeout)));
    let _ = stream.set_write_timeout(Some(Duration::from_millis(args.timeout)));
    let _ = stream.set_nodelay(true);

    // Write the command bytes, then read the response off the same stream
    let cmd_bytes = encode_command(&command);
    if let Err(e) = stream.write_all(&cmd_bytes).and_then(|_| stream.flush()) {
        eprintln!("Failed to send command: {}", e);
        std::process::exit(1);
    }

    let mut reader = BufReader::new(&stream);
    let response = match read_response(&mut reader) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to read response: {}", e);
            std::process::exit(1);
        }
    };

    // Half-close so the server's read loop sees EOF right away
    let _ = stream.shutdown(Shutdown::Write);
    drop(reader);
    drop(stream);

    handle_response(&args.command, response);
}

fn handle_response(cmd: &Commands, response: Response) {
    match response.status {
        Status::Ok => print_ok(cmd, response.payload),
        Status::NotFound => {
            eprintln!("(offset out of range)");
            std::process::exit(1);
        }
        Status::Error => {
            let message = response
                .payload
                .and_then(|p| String::from_utf8(p).ok())
                .unwrap_or_else(|| "(unknown error)".to_string());
            eprintln!("ERROR: {}", message);
            std::process::exit(1);
        }
    }
}

fn print_ok(cmd: &Commands, payload: Option<Vec<u8>>) {
    match cmd {
        Commands::Produce { .. } => match payload.as_deref() {
            Some(bytes) if bytes.len() == 8 => {
                let offset = u64::from_be_bytes(bytes.try_into().unwrap());
                println!("{}", offset);
            }
            _ => eprintln!("(malformed produce response)"),
        },

        Commands::Consume { .. } => {
            let Some(bytes) = payload else {
                eprintln!("(empty consume response)");
                std::process::exit(1);
            };
            match Record::decode(&bytes) {
                Ok(record) => match String::from_utf8(record.value.clone()) {
                    Ok(s) => println!("{}", s),
                    Err(_) => println!("{:?}", record.value),
                },
                Err(e) => {
                    eprintln!("Failed to decode record: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Offsets => match payload.as_deref() {
            Some(bytes) if bytes.len() == 16 => {
                let lowest = u64::from_be_bytes(bytes[0..8].try_into().unwrap());
                let highest = u64::from_be_bytes(bytes[8..16].try_into().unwrap());
                println!("lowest: {} highest: {}", lowest, highest);
            }
            _ => eprintln!("(malformed offsets response)"),
        },

        Commands::Ping => match payload {
            Some(p) => println!("{}", String::from_utf8_lossy(&p)),
            None => println!("PONG"),
        },
    }
}
