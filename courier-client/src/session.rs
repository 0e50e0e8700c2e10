use core::mem;

use courier_packets::PacketType;
use tokio::sync::oneshot;

use crate::error::Result;

/// Channel completing one blocked application call.
pub(crate) type Reply = oneshot::Sender<Result<()>>;

/// The request the worker has written to the wire and not yet seen
/// acknowledged. Holding the caller's reply channel inside the variant
/// ties the outstanding-request slot to the blocked call: the slot cannot
/// be cleared without completing the caller, and a second request cannot
/// be parked while one is outstanding.
#[derive(Debug)]
pub(crate) enum Pending {
    Ping(Reply),
    Publish(Reply),
    Subscribe(Reply),
    Unsubscribe(Reply),
}

/// Session state. A request pending while disconnected is
/// unrepresentable: `Connecting` is the only request the disconnected
/// side can carry, and acknowledged requests only exist under
/// `Connected`.
#[derive(Debug, Default)]
pub(crate) enum Session {
    #[default]
    Disconnected,
    Connecting(Reply),
    Connected {
        pending: Option<Pending>,
    },
}

/// Outcome of matching an inbound response against the session.
#[derive(Debug)]
pub(crate) enum Take {
    /// The response matches the outstanding request; the caller decides
    /// whether it is acceptable.
    Matched(Reply),
    /// A request was outstanding, but of a different kind. Its caller
    /// must be completed with an error.
    Mismatched(Reply),
    /// Nothing was outstanding.
    Unsolicited,
}

impl Pending {
    fn into_reply(self) -> Reply {
        match self {
            Pending::Ping(reply)
            | Pending::Publish(reply)
            | Pending::Subscribe(reply)
            | Pending::Unsubscribe(reply) => reply,
        }
    }

    fn matches(&self, response: PacketType) -> bool {
        matches!(
            (self, response),
            (Pending::Ping(_), PacketType::PingResp)
                | (Pending::Publish(_), PacketType::PubAck)
                | (Pending::Subscribe(_), PacketType::SubAck)
                | (Pending::Unsubscribe(_), PacketType::UnsubAck)
        )
    }
}

impl Session {
    pub(crate) fn is_connected(&self) -> bool {
        matches!(self, Session::Connected { .. })
    }

    /// True when no reply channel is parked, i.e. the worker may accept
    /// the next command.
    pub(crate) fn idle(&self) -> bool {
        matches!(
            self,
            Session::Disconnected | Session::Connected { pending: None }
        )
    }

    /// Parks a request after its packet has been written. Only legal on
    /// an idle, connected session.
    pub(crate) fn park(&mut self, pending: Pending) {
        debug_assert!(self.is_connected() && self.idle());
        *self = Session::Connected {
            pending: Some(pending),
        };
    }

    /// Matches an inbound response packet type against the outstanding
    /// request and clears the slot. A connect attempt interrupted by a
    /// mismatched response stays disconnected; an established session
    /// survives with the slot emptied.
    pub(crate) fn take_response(&mut self, response: PacketType) -> Take {
        match mem::take(self) {
            Session::Disconnected => Take::Unsolicited,
            Session::Connecting(reply) => {
                if response == PacketType::ConnAck {
                    Take::Matched(reply)
                } else {
                    Take::Mismatched(reply)
                }
            }
            Session::Connected { pending } => {
                *self = Session::Connected { pending: None };
                match pending {
                    Some(p) if p.matches(response) => Take::Matched(p.into_reply()),
                    Some(p) => Take::Mismatched(p.into_reply()),
                    None => Take::Unsolicited,
                }
            }
        }
    }

    /// Clears the slot unconditionally, handing back whatever reply was
    /// parked. Used on transport failure.
    pub(crate) fn take_pending(&mut self) -> Option<Reply> {
        match mem::take(self) {
            Session::Disconnected => None,
            Session::Connecting(reply) => Some(reply),
            Session::Connected { pending } => {
                *self = Session::Connected { pending: None };
                pending.map(Pending::into_reply)
            }
        }
    }
}
