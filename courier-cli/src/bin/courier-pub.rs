//! MQTT publish tool - publish a single message to a topic.

use std::io::{self, Read};

use clap::Parser;
use courier_cli::{init_logging, parse_qos, ConnectionArgs};
use courier_client::{Client, Message, QoS};
use tokio::net::TcpStream;

#[derive(Parser, Debug)]
#[command(name = "courier-pub")]
#[command(about = "Publish a message to an MQTT broker")]
#[command(version)]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Topic to publish to
    #[arg(short = 't', long)]
    topic: String,

    /// Message payload (reads from stdin if not provided)
    #[arg(short = 'm', long)]
    message: Option<String>,

    /// QoS level (0 or 1)
    #[arg(short = 'q', long, default_value = "0")]
    qos: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.connection.verbose);

    let qos = match parse_qos(args.qos) {
        Some(QoS::ExactlyOnce) | None => {
            eprintln!("Invalid QoS level: {}. Must be 0 or 1.", args.qos);
            std::process::exit(1);
        }
        Some(qos) => qos,
    };

    // Read payload from arguments or stdin
    let payload = match args.message {
        Some(message) => message.into_bytes(),
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let stream = TcpStream::connect(args.connection.address()).await?;
    let client = Client::start("courier-pub", stream, Box::new(|_publication| Ok(())), None);

    client
        .connect(Some(args.connection.to_connect_options()))
        .await?;
    client.publish(Message::new(args.topic, payload, qos)).await?;
    client.disconnect().await?;

    Ok(())
}
