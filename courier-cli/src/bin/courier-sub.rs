//! MQTT subscribe tool - subscribe to a topic filter and print messages.

use std::time::Duration;

use clap::Parser;
use courier_cli::{init_logging, parse_qos, ConnectionArgs};
use courier_client::{Client, Message};
use tokio::net::TcpStream;
use tokio::signal;
use tokio::time;

#[derive(Parser, Debug)]
#[command(name = "courier-sub")]
#[command(about = "Subscribe to a topic on an MQTT broker")]
#[command(version)]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Topic filter to subscribe to
    #[arg(short = 't', long)]
    topic: String,

    /// QoS level to request (0, 1, or 2)
    #[arg(short = 'q', long, default_value = "0")]
    qos: u8,

    /// Print topic name before each message
    #[arg(short = 'T', long)]
    print_topic: bool,
}

/// The client core owns no timers, so the session is kept alive from
/// here. Well below the 300 second keep-alive window.
const PING_INTERVAL: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.connection.verbose);

    let qos = match parse_qos(args.qos) {
        Some(qos) => qos,
        None => {
            eprintln!("Invalid QoS level: {}. Must be 0, 1, or 2.", args.qos);
            std::process::exit(1);
        }
    };

    let print_topic = args.print_topic;

    let stream = TcpStream::connect(args.connection.address()).await?;
    let client = Client::start(
        "courier-sub",
        stream,
        Box::new(move |publication| {
            if print_topic {
                println!(
                    "{}: {}",
                    publication.topic,
                    String::from_utf8_lossy(&publication.payload)
                );
            } else {
                println!("{}", String::from_utf8_lossy(&publication.payload));
            }
            Ok(())
        }),
        None,
    );

    client
        .connect(Some(args.connection.to_connect_options()))
        .await?;
    client.subscribe(Message::filter(args.topic, qos)).await?;

    let pinger = client.clone();
    tokio::spawn(async move {
        let mut interval = time::interval(PING_INTERVAL);
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            if pinger.ping().await.is_err() {
                break;
            }
        }
    });

    signal::ctrl_c().await?;
    eprintln!("\nDisconnecting...");

    let _ = client.disconnect().await;

    Ok(())
}
