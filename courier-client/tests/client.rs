//! End-to-end client tests against a scripted broker over an in-memory
//! duplex stream.

use bytes::Bytes;
use courier_client::{Client, ClientError, ConnectOptions, Message, Publication, QoS, Will};
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;

/// CONNECT frame for default options: clean session, keep-alive 300,
/// default client id.
const CONNECT_FRAME: [u8; 26] = [
    0x10, 0x18, 0x00, 0x04, 0x4d, 0x51, 0x54, 0x54, 0x04, 0x02, 0x01, 0x2c, 0x00, 0x0c, 0x00,
    0x0a, b'c', b'o', b'u', b'r', b'i', b'e', b'r', b'_', b'v', b'4',
];

const CONNACK_ACCEPTED: [u8; 4] = [0x20, 0x02, 0x00, 0x00];

struct Broker {
    stream: DuplexStream,
}

impl Broker {
    async fn expect(&mut self, expected: &[u8]) {
        let mut buf = vec![0u8; expected.len()];
        self.stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, expected);
    }

    async fn send(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
    }
}

fn start() -> (
    Client,
    Broker,
    mpsc::UnboundedReceiver<Publication>,
    mpsc::UnboundedReceiver<String>,
) {
    let (near, far) = duplex(4096);
    let (pub_tx, pub_rx) = mpsc::unbounded_channel();
    let (err_tx, err_rx) = mpsc::unbounded_channel();

    let client = Client::start(
        "test-client",
        near,
        Box::new(move |publication| {
            pub_tx.send(publication).unwrap();
            Ok(())
        }),
        Some(Box::new(move |e| {
            let _ = err_tx.send(format!("{e:?}"));
        })),
    );

    (client, Broker { stream: far }, pub_rx, err_rx)
}

async fn connect(client: &Client, broker: &mut Broker) {
    let (result, _) = tokio::join!(client.connect(None), async {
        broker.expect(&CONNECT_FRAME).await;
        broker.send(&CONNACK_ACCEPTED).await;
    });
    result.unwrap();
}

#[tokio::test]
async fn connect_accepted() {
    let (client, mut broker, _pub_rx, _err_rx) = start();

    connect(&client, &mut broker).await;
}

#[tokio::test]
async fn connect_rejected_leaves_session_disconnected() {
    let (client, mut broker, _pub_rx, _err_rx) = start();

    let (result, _) = tokio::join!(client.connect(None), async {
        broker.expect(&CONNECT_FRAME).await;
        broker.send(&[0x20, 0x02, 0x00, 0x05]).await;
    });
    assert!(matches!(result, Err(ClientError::ConnectRejected(0x05))));

    // Still disconnected: publish is refused without touching the wire.
    let result = client
        .publish(Message::new("a", "hi", QoS::AtMostOnce))
        .await;
    assert!(matches!(result, Err(ClientError::WrongState)));
}

#[tokio::test]
async fn connect_while_connected_is_refused() {
    let (client, mut broker, _pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    let result = client.connect(None).await;
    assert!(matches!(result, Err(ClientError::WrongState)));
}

#[tokio::test]
async fn connect_with_credentials_and_will() {
    let (client, mut broker, _pub_rx, _err_rx) = start();

    let options = ConnectOptions::new()
        .client_id("device-1")
        .user_name("user")
        .password("secret")
        .will(Will::new("status", "offline").qos(QoS::AtLeastOnce).retain(true));

    let (result, _) = tokio::join!(client.connect(Some(options)), async {
        // Variable header: flag byte carries user name, password, will
        // retain, will QoS 1, will and clean session bits.
        broker
            .expect(&[
                0x10, 0x35, 0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04, 0xee, 0x01, 0x2c, 0x00,
                0x29,
            ])
            .await;

        let mut tail: Vec<u8> = Vec::new();
        for s in [&b"device-1"[..], b"status", b"offline", b"user", b"secret"] {
            tail.extend_from_slice(&(s.len() as u16).to_be_bytes());
            tail.extend_from_slice(s);
        }
        broker.expect(&tail).await;

        broker.send(&CONNACK_ACCEPTED).await;
    });
    result.unwrap();
}

#[tokio::test]
async fn publish_qos0_resolves_immediately() {
    let (client, mut broker, _pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    client
        .publish(Message::new("a", "hi", QoS::AtMostOnce))
        .await
        .unwrap();

    broker
        .expect(&[0x30, 0x05, 0x00, 0x01, 0x61, 0x68, 0x69])
        .await;
}

#[tokio::test]
async fn publish_qos1_waits_for_puback() {
    let (client, mut broker, _pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    let (result, _) = tokio::join!(
        client.publish(Message::new("a", "hi", QoS::AtLeastOnce)),
        async {
            broker
                .expect(&[0x32, 0x07, 0x00, 0x01, 0x61, 0x00, 0x01, 0x68, 0x69])
                .await;
            broker.send(&[0x40, 0x02, 0x00, 0x01]).await;
        }
    );
    result.unwrap();
}

#[tokio::test]
async fn publish_qos2_is_refused() {
    let (client, mut broker, _pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    let result = client
        .publish(Message::new("a", "hi", QoS::ExactlyOnce))
        .await;
    assert!(matches!(result, Err(ClientError::UnsupportedQoS)));
}

#[tokio::test]
async fn publish_empty_topic_is_refused() {
    let (client, mut broker, _pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    let result = client.publish(Message::new("", "hi", QoS::AtMostOnce)).await;
    assert!(matches!(result, Err(ClientError::InvalidTopic(_))));
}

#[tokio::test]
async fn subscribe_granted() {
    let (client, mut broker, _pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    let (result, _) = tokio::join!(
        client.subscribe(Message::filter("x", QoS::AtLeastOnce)),
        async {
            broker
                .expect(&[0x82, 0x06, 0x00, 0x01, 0x00, 0x01, 0x78, 0x01])
                .await;
            broker.send(&[0x90, 0x03, 0x00, 0x01, 0x01]).await;
        }
    );
    result.unwrap();
}

#[tokio::test]
async fn subscribe_rejected_by_broker() {
    let (client, mut broker, _pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    let (result, _) = tokio::join!(
        client.subscribe(Message::filter("x", QoS::AtLeastOnce)),
        async {
            broker
                .expect(&[0x82, 0x06, 0x00, 0x01, 0x00, 0x01, 0x78, 0x01])
                .await;
            broker.send(&[0x90, 0x03, 0x00, 0x01, 0x03]).await;
        }
    );
    assert!(matches!(result, Err(ClientError::SubscribeRejected(0x03))));
}

#[tokio::test]
async fn unsubscribe_acknowledged() {
    let (client, mut broker, _pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    let (result, _) = tokio::join!(
        client.unsubscribe(Message::filter("x", QoS::AtMostOnce)),
        async {
            broker
                .expect(&[0xa2, 0x05, 0x00, 0x02, 0x00, 0x01, 0x78])
                .await;
            broker.send(&[0xb0, 0x02, 0x00, 0x02]).await;
        }
    );
    result.unwrap();
}

#[tokio::test]
async fn ping_round_trip() {
    let (client, mut broker, _pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    let (result, _) = tokio::join!(client.ping(), async {
        broker.expect(&[0xc0, 0x00]).await;
        broker.send(&[0xd0, 0x00]).await;
    });
    result.unwrap();
}

#[tokio::test]
async fn disconnect_resolves_once_written() {
    let (client, mut broker, _pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    client.disconnect().await.unwrap();
    broker.expect(&[0xe0, 0x00]).await;

    // The session dropped; everything but connect is refused now.
    let result = client.ping().await;
    assert!(matches!(result, Err(ClientError::WrongState)));
}

#[tokio::test]
async fn inbound_publish_qos0_reaches_callback() {
    let (client, mut broker, mut pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    broker
        .send(&[0x30, 0x06, 0x00, 0x01, 0x74, 0x76, 0x76, 0x76])
        .await;

    let publication = pub_rx.recv().await.unwrap();
    assert_eq!(publication.topic, "t");
    assert_eq!(publication.payload, Bytes::from("vvv"));
    assert_eq!(publication.qos, QoS::AtMostOnce);
}

#[tokio::test]
async fn inbound_publish_qos1_is_acknowledged() {
    let (client, mut broker, mut pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    broker
        .send(&[0x32, 0x08, 0x00, 0x01, 0x74, 0x00, 0x07, 0x76, 0x76, 0x76])
        .await;

    // The acknowledgement echoes the broker's packet identifier.
    broker.expect(&[0x40, 0x02, 0x00, 0x07]).await;

    let publication = pub_rx.recv().await.unwrap();
    assert_eq!(publication.topic, "t");
    assert_eq!(publication.qos, QoS::AtLeastOnce);
    assert_eq!(publication.payload.len(), 3);
}

#[tokio::test]
async fn unsolicited_response_reported_without_completing_anyone() {
    let (client, mut broker, _pub_rx, mut err_rx) = start();
    connect(&client, &mut broker).await;

    broker.send(&[0x40, 0x02, 0x00, 0x01]).await;

    let report = err_rx.recv().await.unwrap();
    assert!(report.contains("UnexpectedResponse"), "{report}");

    // The session survives it.
    let (result, _) = tokio::join!(client.ping(), async {
        broker.expect(&[0xc0, 0x00]).await;
        broker.send(&[0xd0, 0x00]).await;
    });
    result.unwrap();
}

#[tokio::test]
async fn mismatched_response_fails_the_pending_call() {
    let (client, mut broker, _pub_rx, mut err_rx) = start();
    connect(&client, &mut broker).await;

    let (result, _) = tokio::join!(
        client.publish(Message::new("a", "hi", QoS::AtLeastOnce)),
        async {
            broker
                .expect(&[0x32, 0x07, 0x00, 0x01, 0x61, 0x00, 0x01, 0x68, 0x69])
                .await;
            // A subscribe acknowledgement while a publish is in flight.
            broker.send(&[0x90, 0x03, 0x00, 0x01, 0x01]).await;
        }
    );
    assert!(matches!(result, Err(ClientError::UnexpectedResponse(_))));

    let report = err_rx.recv().await.unwrap();
    assert!(report.contains("UnexpectedResponse"), "{report}");
}

#[tokio::test]
async fn commands_while_disconnected_resolve_with_wrong_state() {
    let (client, _broker, _pub_rx, _err_rx) = start();

    let result = client
        .publish(Message::new("a", "hi", QoS::AtMostOnce))
        .await;
    assert!(matches!(result, Err(ClientError::WrongState)));

    let result = client.ping().await;
    assert!(matches!(result, Err(ClientError::WrongState)));
}

#[tokio::test]
async fn callback_failure_is_reported() {
    let (near, far) = duplex(4096);
    let (err_tx, mut err_rx) = mpsc::unbounded_channel();

    let client = Client::start(
        "test-client",
        near,
        Box::new(|_publication| Err("not consumed".into())),
        Some(Box::new(move |e| {
            let _ = err_tx.send(format!("{e:?}"));
        })),
    );
    let mut broker = Broker { stream: far };
    connect(&client, &mut broker).await;

    broker
        .send(&[0x30, 0x06, 0x00, 0x01, 0x74, 0x76, 0x76, 0x76])
        .await;

    let report = err_rx.recv().await.unwrap();
    assert!(report.contains("Callback"), "{report}");
}

#[tokio::test]
async fn commands_fail_after_transport_closes() {
    let (client, mut broker, _pub_rx, _err_rx) = start();
    connect(&client, &mut broker).await;

    drop(broker);

    // The worker observes the closed stream; whichever side wins the
    // race, the call must not hang.
    let result = client.ping().await;
    assert!(result.is_err());
}
