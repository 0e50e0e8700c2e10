//! Courier MQTT Client Library
//!
//! This crate provides an MQTT 3.1.1 client core for cooperatively
//! scheduled runtimes. The transport is an opaque pair of byte streams; a
//! worker task owns all session state and multiplexes application
//! commands with inbound server traffic. Each public operation is
//! synchronous from the caller's viewpoint: it resolves when the broker's
//! acknowledgement has been validated.
//!
//! # Example
//!
//! ```no_run
//! use courier_client::{Client, Message, QoS};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stream = tokio::net::TcpStream::connect("localhost:1883").await?;
//!
//!     let client = Client::start(
//!         "sensor",
//!         stream,
//!         Box::new(|publication| {
//!             println!("{}: {:?}", publication.topic, publication.payload);
//!             Ok(())
//!         }),
//!         None,
//!     );
//!
//!     client.connect(None).await?;
//!     client.subscribe(Message::filter("test/topic", QoS::AtLeastOnce)).await?;
//!     client.publish(Message::new("test/topic", "hello", QoS::AtLeastOnce)).await?;
//!     client.disconnect().await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod event;
mod options;
mod session;
mod transport;

pub use client::Client;
pub use error::{ClientError, Result};
pub use event::{ErrorHandler, Publication, PublishHandler};
pub use options::{ConnectOptions, Will, DEFAULT_CLIENT_ID};
pub use transport::{Transport, DEFAULT_MAX_TOPIC_LEN};

// Re-export commonly used types from courier-core
pub use courier_core::message::Message;
pub use courier_core::qos::QoS;
