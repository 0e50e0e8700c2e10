use bytes::Bytes;
use courier_core::qos::QoS;

/// Client identifier used when the connect options do not carry one. A
/// client identifier is mandatory on the wire, so one is always sent.
pub const DEFAULT_CLIENT_ID: &str = "courier_v4";

/// Will message configuration.
#[derive(Debug, Clone)]
pub struct Will {
    pub topic: String,
    pub payload: Bytes,
    pub qos: QoS,
    pub retain: bool,
}

impl Will {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            qos: QoS::AtMostOnce,
            retain: false,
        }
    }

    pub fn qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }

    pub fn retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }
}

/// Options for connecting to an MQTT broker. The session is always a
/// clean session; resuming server-side state is not supported.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub(crate) client_id: Option<String>,
    pub(crate) user_name: Option<String>,
    pub(crate) password: Option<Bytes>,
    pub(crate) will: Option<Will>,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client ID. If not set, [`DEFAULT_CLIENT_ID`] is sent.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the user name for authentication.
    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// Set the password for authentication.
    pub fn password(mut self, password: impl Into<Bytes>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the will message the broker publishes if the connection drops
    /// uncleanly.
    pub fn will(mut self, will: Will) -> Self {
        self.will = Some(will);
        self
    }
}
