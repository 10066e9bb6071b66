use std::convert::TryFrom;

use bytes::Bytes;
use derive_more::Display;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::{Error, Result};

/// The Protocol Name of the protocol.
pub const PROTOCOL_NAME: &[u8] = b"\x00\x04MQTT";

/// The value of the Protocol Level field for the version 3.1.1 of the protocol is 4 (0x04).
pub const PROTOCOL_LEVEL: u8 = 4;

/// The size of the smallest fixed header, one type byte and one length byte.
pub const MQTT_HEADER_LEN: usize = 2;

/// The size of an acknowledgment packet, fixed header and Packet Identifier.
pub const MQTT_ACK_LEN: usize = 4;

/// Fixed header byte of a CONNACK packet.
pub const CONNACK_BYTE: u8 = 0x20;
/// Fixed header byte of a PUBLISH packet, flags cleared.
pub const PUBLISH_BYTE: u8 = 0x30;
/// Fixed header byte of a PUBACK packet.
pub const PUBACK_BYTE: u8 = 0x40;
/// Fixed header byte of a PUBREC packet.
pub const PUBREC_BYTE: u8 = 0x50;
/// Fixed header byte of a PUBREL packet, flags cleared.
pub const PUBREL_BYTE: u8 = 0x60;
/// Fixed header byte of a PUBCOMP packet.
pub const PUBCOMP_BYTE: u8 = 0x70;
/// Fixed header byte of a SUBACK packet, type 9 in the high nibble.
///
/// Some reply tables list 0x80 here, which is the SUBSCRIBE type.
pub const SUBACK_BYTE: u8 = 0x90;
/// Fixed header byte of an UNSUBACK packet.
pub const UNSUBACK_BYTE: u8 = 0xB0;
/// Fixed header byte of a PINGRESP packet.
pub const PINGRESP_BYTE: u8 = 0xD0;

/// MQTT Control Packets
#[derive(Debug, PartialEq, Clone)]
pub enum Packet {
    /// Client request to connect to Server
    Connect(Connect),
    /// Connect acknowledgment
    ConnectAck(ConnectAck),
    /// Publish message
    Publish(Publish),
    /// Publish acknowledgment
    PublishAck(Ack),
    /// Publish received (assured delivery part 1)
    PublishReceived(Ack),
    /// Publish release (assured delivery part 2)
    PublishRelease(Ack),
    /// Publish complete (assured delivery part 3)
    PublishComplete(Ack),
    /// Client subscribe request
    Subscribe(Subscribe),
    /// Subscribe acknowledgment
    SubscribeAck(SubscribeAck),
    /// Unsubscribe request
    Unsubscribe(Unsubscribe),
    /// Unsubscribe acknowledgment
    UnsubscribeAck(Ack),
    /// PING request
    Ping,
    /// PING response
    Pong,
    /// Client is disconnecting
    Disconnect,
}

/// MQTT Control Packet type
#[repr(u8)]
#[derive(Debug, Eq, PartialEq, Copy, Clone, TryFromPrimitive, IntoPrimitive)]
pub enum Type {
    /// Client request to connect to Server
    CONNECT = 1,
    /// Connect acknowledgment
    CONNACK = 2,
    /// Publish message
    PUBLISH = 3,
    /// Publish acknowledgment
    PUBACK = 4,
    /// Publish received (assured delivery part 1)
    PUBREC = 5,
    /// Publish release (assured delivery part 2)
    PUBREL = 6,
    /// Publish complete (assured delivery part 3)
    PUBCOMP = 7,
    /// Client subscribe request
    SUBSCRIBE = 8,
    /// Subscribe acknowledgment
    SUBACK = 9,
    /// Unsubscribe request
    UNSUBSCRIBE = 10,
    /// Unsubscribe acknowledgment
    UNSUBACK = 11,
    /// PING request
    PINGREQ = 12,
    /// PING response
    PINGRESP = 13,
    /// Client is disconnecting
    DISCONNECT = 14,
}

impl Type {
    /// The flags every packet of this type must carry, `None` for PUBLISH whose flags are variable.
    pub fn reserved_flags(self) -> Option<u8> {
        match self {
            Type::PUBLISH => None,
            Type::PUBREL | Type::SUBSCRIBE | Type::UNSUBSCRIBE => Some(0b0010),
            _ => Some(0),
        }
    }

    /// Returns `true` for the types sharing the acknowledgment shape.
    pub fn is_ack(self) -> bool {
        matches!(
            self,
            Type::PUBACK | Type::PUBREC | Type::PUBREL | Type::PUBCOMP | Type::UNSUBACK
        )
    }
}

/// Quality of Service levels
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, TryFromPrimitive, IntoPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QoS {
    /// At most once delivery
    ///
    /// The message is delivered according to the capabilities of the underlying network.
    /// No response is sent by the receiver and no retry is performed by the sender.
    /// The message arrives at the receiver either once or not at all.
    AtMostOnce = 0,

    /// At least once delivery
    ///
    /// This quality of service ensures that the message arrives at the receiver at least once.
    /// A QoS 1 PUBLISH Packet has a Packet Identifier in its variable header
    /// and is acknowledged by a PUBACK Packet.
    AtLeastOnce = 1,

    /// Exactly once delivery
    ///
    /// This is the highest quality of service,
    /// for use when neither loss nor duplication of messages are acceptable.
    /// There is an increased overhead associated with this quality of service.
    ExactlyOnce = 2,
}

bitflags! {
    /// The low nibble of the fixed header.
    #[derive(Default)]
    pub struct HeaderFlags: u8 {
        /// This might be re-delivery of an earlier attempt to send the Packet.
        const DUP = 0b0000_1000;
        /// The level of assurance for delivery of an Application Message.
        const QOS = 0b0000_0110;
        /// It can be delivered to future subscribers whose subscriptions match its topic name
        const RETAIN = 0b0000_0001;
    }
}

const QOS_SHIFT: u8 = 1;

/// Fixed Header
///
/// The first byte of each MQTT Control Packet,
/// the packet type in the high nibble and its flags in the low nibble.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct FixedHeader {
    /// MQTT Control Packet type
    pub packet_type: Type,
    /// Duplicate delivery of a PUBLISH Control Packet
    pub dup: bool,
    /// PUBLISH Quality of Service
    pub qos: QoS,
    /// PUBLISH Retain flag
    pub retain: bool,
}

impl FixedHeader {
    /// Creates a header with all flags cleared.
    pub fn new(packet_type: Type) -> Self {
        FixedHeader {
            packet_type,
            dup: false,
            qos: QoS::AtMostOnce,
            retain: false,
        }
    }

    /// Splits the first byte of a packet into its fields.
    ///
    /// Fails with `InvalidPacketType` if the type nibble is 0 or 15,
    /// and with `MalformedPacket` if the QoS bits are `11`, whatever the packet type.
    pub fn parse(b: u8) -> Result<Self> {
        let packet_type = Type::try_from(b >> 4).map_err(|_| Error::InvalidPacketType(b >> 4))?;
        let flags = HeaderFlags::from_bits_truncate(b);
        let qos = QoS::try_from((flags & HeaderFlags::QOS).bits() >> QOS_SHIFT)
            .map_err(|_| Error::malformed("QoS 3 in fixed header"))?;

        Ok(FixedHeader {
            packet_type,
            dup: flags.contains(HeaderFlags::DUP),
            qos,
            retain: flags.contains(HeaderFlags::RETAIN),
        })
    }

    /// The low nibble of the header byte.
    pub fn flags(&self) -> HeaderFlags {
        let mut flags = HeaderFlags::from_bits_truncate(u8::from(self.qos) << QOS_SHIFT);
        flags.set(HeaderFlags::DUP, self.dup);
        flags.set(HeaderFlags::RETAIN, self.retain);
        flags
    }

    /// Composes the header byte.
    pub fn to_byte(&self) -> u8 {
        (u8::from(self.packet_type) << 4) | self.flags().bits()
    }
}

impl From<FixedHeader> for u8 {
    fn from(header: FixedHeader) -> u8 {
        header.to_byte()
    }
}

/// Packet Identifier
///
/// The variable header component of many of the Control Packet types includes a 2 byte Packet Identifier field.
pub type PacketId = u16;

/// Client request to connect to Server
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Connect {
    /// the handling of the Session state.
    pub clean_session: bool,
    /// a time interval measured in seconds.
    pub keep_alive: u16,
    /// identifies the Client to the Server.
    pub client_id: String,
    /// Will Message be stored on the Server and associated with the Network Connection.
    pub last_will: Option<LastWill>,
    /// username can be used by the Server for authentication and authorization.
    pub username: Option<String>,
    /// password can be used by the Server for authentication and authorization.
    pub password: Option<Bytes>,
}

bitflags! {
    /// The Connect Flags byte contains a number of parameters specifying the behavior of the MQTT connection.
    /// It also indicates the presence or absence of fields in the payload.
    ///
    /// Bit 0 is reserved and must be zero, so it has no flag.
    #[derive(Default)]
    pub struct ConnectFlags: u8 {
        /// This bit specifies a user name be present in the payload.
        const USERNAME      = 0b1000_0000;
        /// This bit specifies a password MUST be present in the payload.
        const PASSWORD      = 0b0100_0000;
        /// This bit specifies if the Will Message is to be Retained when it is published.
        const WILL_RETAIN   = 0b0010_0000;
        /// These two bits specify the QoS level to be used when publishing the Will Message.
        const WILL_QOS      = 0b0001_1000;
        /// If the Will Flag is set to 1 this indicates that, if the Connect request is accepted,
        /// a Will Message MUST be stored on the Server and associated with the Network Connection.
        const LAST_WILL     = 0b0000_0100;
        /// This bit specifies the handling of the Session state.
        const CLEAN_SESSION = 0b0000_0010;
    }
}

const WILL_QOS_SHIFT: u8 = 3;

impl ConnectFlags {
    /// the QoS level to be used when publishing the Will Message.
    pub fn qos(self) -> Result<QoS> {
        QoS::try_from((self & Self::WILL_QOS).bits() >> WILL_QOS_SHIFT)
            .map_err(|_| Error::malformed("will QoS 3"))
    }
}

impl From<QoS> for ConnectFlags {
    fn from(qos: QoS) -> Self {
        Self::from_bits_truncate(u8::from(qos) << WILL_QOS_SHIFT)
    }
}

impl From<&Connect> for ConnectFlags {
    fn from(connect: &Connect) -> Self {
        let mut flags = ConnectFlags::empty();
        if let Some(ref will) = connect.last_will {
            flags |= ConnectFlags::LAST_WILL | will.qos.into();
            flags.set(ConnectFlags::WILL_RETAIN, will.retain);
        }
        flags.set(ConnectFlags::USERNAME, connect.username.is_some());
        flags.set(ConnectFlags::PASSWORD, connect.password.is_some());
        flags.set(ConnectFlags::CLEAN_SESSION, connect.clean_session);
        flags
    }
}

/// Connection Will
#[derive(Debug, PartialEq, Clone)]
pub struct LastWill {
    /// the QoS level to be used when publishing the Will Message.
    pub qos: QoS,
    /// the Will Message is to be Retained when it is published.
    pub retain: bool,
    /// the Will Topic
    pub topic_name: String,
    /// defines the Application Message that is to be published to the Will Topic
    pub message: Bytes,
}

/// Connect acknowledgment
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ConnectAck {
    /// The Session Present flag enables a Client to establish
    /// whether the Client and Server have a consistent view about whether there is already stored Session state.
    pub session_present: bool,
    /// If a well formed CONNECT Packet is received by the Server,
    /// but the Server is unable to process it for some reason,
    /// then the Server SHOULD attempt to send a CONNACK packet
    /// containing the appropriate non-zero Connect return code from this table.
    pub return_code: ConnectReturnCode,
}

bitflags! {
    /// The Connect Acknowledge Flags, bits 7-1 are reserved.
    #[derive(Default)]
    pub struct ConnectAckFlags: u8 {
        /// The Session Present flag.
        const SESSION_PRESENT = 0b0000_0001;
    }
}

/// Connect Return Code
#[repr(u8)]
#[derive(Debug, Eq, PartialEq, Copy, Clone, TryFromPrimitive, IntoPrimitive, Display)]
pub enum ConnectReturnCode {
    /// Connection accepted
    #[display(fmt = "Connection Accepted")]
    ConnectionAccepted = 0,
    /// Connection Refused, unacceptable protocol version
    #[display(fmt = "Connection Refused, unacceptable protocol version")]
    UnacceptableProtocolVersion = 1,
    /// Connection Refused, identifier rejected
    #[display(fmt = "Connection Refused, identifier rejected")]
    IdentifierRejected = 2,
    /// Connection Refused, Server unavailable
    #[display(fmt = "Connection Refused, Server unavailable")]
    ServiceUnavailable = 3,
    /// Connection Refused, bad user name or password
    #[display(fmt = "Connection Refused, bad user name or password")]
    BadUserNameOrPassword = 4,
    /// Connection Refused, not authorized
    #[display(fmt = "Connection Refused, not authorized")]
    NotAuthorized = 5,
}

/// The QoS level of a PUBLISH together with the Packet Identifier it requires.
///
/// The Packet Identifier field is only present in PUBLISH Packets where the QoS level is 1 or 2.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Delivery {
    /// QoS 0, no Packet Identifier.
    AtMostOnce,
    /// QoS 1, acknowledged by PUBACK.
    AtLeastOnce(PacketId),
    /// QoS 2, acknowledged by PUBREC, PUBREL and PUBCOMP.
    ExactlyOnce(PacketId),
}

impl Delivery {
    /// Pairs `qos` with `packet_id`, which is dropped for QoS 0.
    pub fn new(qos: QoS, packet_id: PacketId) -> Self {
        match qos {
            QoS::AtMostOnce => Delivery::AtMostOnce,
            QoS::AtLeastOnce => Delivery::AtLeastOnce(packet_id),
            QoS::ExactlyOnce => Delivery::ExactlyOnce(packet_id),
        }
    }

    /// The QoS level.
    pub fn qos(&self) -> QoS {
        match self {
            Delivery::AtMostOnce => QoS::AtMostOnce,
            Delivery::AtLeastOnce(_) => QoS::AtLeastOnce,
            Delivery::ExactlyOnce(_) => QoS::ExactlyOnce,
        }
    }

    /// The Packet Identifier, `None` for QoS 0.
    pub fn packet_id(&self) -> Option<PacketId> {
        match *self {
            Delivery::AtMostOnce => None,
            Delivery::AtLeastOnce(packet_id) | Delivery::ExactlyOnce(packet_id) => Some(packet_id),
        }
    }
}

impl Default for Delivery {
    fn default() -> Self {
        Delivery::AtMostOnce
    }
}

/// Publish message
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Publish {
    /// If the DUP flag is set to 0, it indicates that this is the first occasion
    /// that the Client or Server has attempted to send this MQTT PUBLISH Packet.
    /// If the DUP flag is set to 1, it indicates that this might be re-delivery of
    /// an earlier attempt to send the Packet.
    pub dup: bool,
    /// If the RETAIN flag is set to 1, in a PUBLISH Packet sent by a Client to a Server,
    /// the Server MUST store the Application Message and its QoS,
    /// so that it can be delivered to future subscribers whose subscriptions match its topic name [MQTT-3.3.1-5].
    pub retain: bool,
    /// The level of assurance for delivery and the matching Packet Identifier.
    pub delivery: Delivery,
    /// the information channel to which payload data is published.
    pub topic_name: String,
    /// the Application Message that is being published.
    pub payload: Bytes,
}

impl Publish {
    /// The level of assurance for delivery.
    pub fn qos(&self) -> QoS {
        self.delivery.qos()
    }

    /// The Packet Identifier, only present for QoS 1 and 2.
    pub fn packet_id(&self) -> Option<PacketId> {
        self.delivery.packet_id()
    }

    pub(crate) fn header(&self) -> FixedHeader {
        FixedHeader {
            packet_type: Type::PUBLISH,
            dup: self.dup,
            qos: self.qos(),
            retain: self.retain,
        }
    }
}

/// Acknowledgment carrying only a Packet Identifier.
///
/// Shared by PUBACK, PUBREC, PUBREL, PUBCOMP and UNSUBACK.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Ack {
    /// Packet Identifier
    pub packet_id: PacketId,
}

/// A Subscription comprises a Topic Filter and a maximum QoS.
#[derive(Debug, PartialEq, Clone)]
pub struct Subscription {
    /// An expression indicating an interest in one or more topics.
    pub topic_filter: String,
    /// The maximum QoS at which the Server can send Application Messages to the Client.
    pub qos: QoS,
}

impl<S: Into<String>> From<(S, QoS)> for Subscription {
    fn from((topic_filter, qos): (S, QoS)) -> Self {
        Subscription {
            topic_filter: topic_filter.into(),
            qos,
        }
    }
}

/// Client subscribe request
#[derive(Debug, PartialEq, Clone)]
pub struct Subscribe {
    /// Packet Identifier
    pub packet_id: PacketId,
    /// the list of Topic Filters and QoS to which the Client wants to subscribe.
    pub subscriptions: Vec<Subscription>,
}

/// Subscribe acknowledgment
#[derive(Debug, PartialEq, Clone)]
pub struct SubscribeAck {
    /// Packet Identifier
    pub packet_id: PacketId,
    /// corresponds to a Topic Filter in the SUBSCRIBE Packet being acknowledged.
    pub status: Vec<SubscribeReturnCode>,
}

/// Subscribe Return Code
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum SubscribeReturnCode {
    /// Success with the maximum granted QoS
    Success(QoS),
    /// Failure
    Failure,
}

impl SubscribeReturnCode {
    pub(crate) const FAILURE: u8 = 0x80;
}

impl From<SubscribeReturnCode> for u8 {
    fn from(code: SubscribeReturnCode) -> u8 {
        match code {
            SubscribeReturnCode::Success(qos) => qos.into(),
            SubscribeReturnCode::Failure => SubscribeReturnCode::FAILURE,
        }
    }
}

impl TryFrom<u8> for SubscribeReturnCode {
    type Error = Error;

    fn try_from(b: u8) -> Result<Self> {
        if b == Self::FAILURE {
            Ok(SubscribeReturnCode::Failure)
        } else {
            QoS::try_from(b)
                .map(SubscribeReturnCode::Success)
                .map_err(|_| Error::malformed(format!("subscribe return code {:#04x}", b)))
        }
    }
}

/// Unsubscribe request
#[derive(Debug, PartialEq, Clone)]
pub struct Unsubscribe {
    /// Packet Identifier
    pub packet_id: PacketId,
    /// the list of Topic Filters that the Client wishes to unsubscribe from.
    pub topic_filters: Vec<String>,
}

impl Packet {
    /// The MQTT control packet type.
    pub fn packet_type(&self) -> Type {
        match *self {
            Packet::Connect(_) => Type::CONNECT,
            Packet::ConnectAck(_) => Type::CONNACK,
            Packet::Publish(_) => Type::PUBLISH,
            Packet::PublishAck(_) => Type::PUBACK,
            Packet::PublishReceived(_) => Type::PUBREC,
            Packet::PublishRelease(_) => Type::PUBREL,
            Packet::PublishComplete(_) => Type::PUBCOMP,
            Packet::Subscribe(_) => Type::SUBSCRIBE,
            Packet::SubscribeAck(_) => Type::SUBACK,
            Packet::Unsubscribe(_) => Type::UNSUBSCRIBE,
            Packet::UnsubscribeAck(_) => Type::UNSUBACK,
            Packet::Ping => Type::PINGREQ,
            Packet::Pong => Type::PINGRESP,
            Packet::Disconnect => Type::DISCONNECT,
        }
    }

    /// The first byte of the packet.
    pub fn fixed_header(&self) -> FixedHeader {
        match self {
            Packet::Publish(ref publish) => publish.header(),
            Packet::PublishRelease(_) | Packet::Subscribe(_) | Packet::Unsubscribe(_) => {
                FixedHeader {
                    qos: QoS::AtLeastOnce,
                    ..FixedHeader::new(self.packet_type())
                }
            }
            _ => FixedHeader::new(self.packet_type()),
        }
    }

    /// The Packet Identifier, if the packet carries one.
    pub fn packet_id(&self) -> Option<PacketId> {
        match *self {
            Packet::Publish(ref publish) => publish.packet_id(),
            Packet::PublishAck(Ack { packet_id })
            | Packet::PublishReceived(Ack { packet_id })
            | Packet::PublishRelease(Ack { packet_id })
            | Packet::PublishComplete(Ack { packet_id })
            | Packet::UnsubscribeAck(Ack { packet_id })
            | Packet::Subscribe(Subscribe { packet_id, .. })
            | Packet::SubscribeAck(SubscribeAck { packet_id, .. })
            | Packet::Unsubscribe(Unsubscribe { packet_id, .. }) => Some(packet_id),
            _ => None,
        }
    }

    /// The number of heap bytes owned by the packet's variable-length fields.
    pub fn owned_len(&self) -> usize {
        match self {
            Packet::Connect(ref connect) => {
                connect.client_id.len()
                    + connect.last_will.as_ref().map_or(0, |will| {
                        will.topic_name.len() + will.message.len()
                    })
                    + connect.username.as_ref().map_or(0, String::len)
                    + connect.password.as_ref().map_or(0, Bytes::len)
            }
            Packet::Publish(ref publish) => publish.topic_name.len() + publish.payload.len(),
            Packet::Subscribe(ref subscribe) => subscribe
                .subscriptions
                .iter()
                .map(|subscription| subscription.topic_filter.len())
                .sum(),
            Packet::SubscribeAck(ref subscribe_ack) => subscribe_ack.status.len(),
            Packet::Unsubscribe(ref unsubscribe) => {
                unsubscribe.topic_filters.iter().map(String::len).sum()
            }
            _ => 0,
        }
    }

    /// Releases the buffers owned by the packet and returns how many bytes they held.
    ///
    /// Consuming the packet makes a second release impossible;
    /// acknowledgment and header-only packets own nothing and release 0 bytes.
    pub fn release(self) -> usize {
        let released = self.owned_len();

        if released > 0 {
            trace!("release {:?} packet, {} bytes", self.packet_type(), released);
        }

        released
    }
}

/// Releases the buffers owned by `packet`, see `Packet::release`.
pub fn release(packet: Packet) -> usize {
    packet.release()
}

#[cfg(test)]
mod tests {
    use matches::assert_matches;

    use super::*;

    #[test]
    fn test_fixed_header() {
        let header = FixedHeader::parse(0x32).unwrap();

        assert_eq!(
            header,
            FixedHeader {
                packet_type: Type::PUBLISH,
                dup: false,
                qos: QoS::AtLeastOnce,
                retain: false,
            }
        );
        assert_eq!(header.to_byte(), 0x32);

        let header = FixedHeader::parse(0x3d).unwrap();

        assert!(header.dup);
        assert!(header.retain);
        assert_eq!(header.qos, QoS::ExactlyOnce);
        assert_eq!(u8::from(header), 0x3d);

        assert_eq!(FixedHeader::parse(0x00), Err(Error::InvalidPacketType(0)));
        assert_eq!(FixedHeader::parse(0xf0), Err(Error::InvalidPacketType(15)));
        assert_matches!(FixedHeader::parse(0x36), Err(Error::MalformedPacket(_)));
        assert_matches!(FixedHeader::parse(0x86), Err(Error::MalformedPacket(_)));
        assert_matches!(FixedHeader::parse(0xc6), Err(Error::MalformedPacket(_)));
    }

    #[test]
    fn test_reply_bytes() {
        assert_eq!(FixedHeader::new(Type::CONNACK).to_byte(), CONNACK_BYTE);
        assert_eq!(FixedHeader::new(Type::PUBLISH).to_byte(), PUBLISH_BYTE);
        assert_eq!(FixedHeader::new(Type::PUBACK).to_byte(), PUBACK_BYTE);
        assert_eq!(FixedHeader::new(Type::PUBREC).to_byte(), PUBREC_BYTE);
        assert_eq!(FixedHeader::new(Type::PUBREL).to_byte(), PUBREL_BYTE);
        assert_eq!(FixedHeader::new(Type::PUBCOMP).to_byte(), PUBCOMP_BYTE);
        assert_eq!(FixedHeader::new(Type::SUBACK).to_byte(), SUBACK_BYTE);
        assert_eq!(SUBACK_BYTE, 0x90);
        assert_ne!(SUBACK_BYTE, FixedHeader::new(Type::SUBSCRIBE).to_byte());
        assert_eq!(FixedHeader::new(Type::UNSUBACK).to_byte(), UNSUBACK_BYTE);
        assert_eq!(FixedHeader::new(Type::PINGRESP).to_byte(), PINGRESP_BYTE);

        assert_eq!(
            Packet::PublishRelease(Ack { packet_id: 1 })
                .fixed_header()
                .to_byte(),
            0x62
        );
    }

    #[test]
    fn test_connect_flags() {
        let connect = Connect {
            clean_session: true,
            keep_alive: 60,
            client_id: "12345".to_owned(),
            last_will: Some(LastWill {
                qos: QoS::ExactlyOnce,
                retain: true,
                topic_name: "topic".to_owned(),
                message: Bytes::from_static(b"message"),
            }),
            username: Some("user".to_owned()),
            password: None,
        };
        let flags = ConnectFlags::from(&connect);

        assert_eq!(flags.bits(), 0b1011_0110);
        assert_eq!(flags.qos(), Ok(QoS::ExactlyOnce));
        assert_eq!(ConnectFlags::from_bits(0b0000_0001), None, "reserved bit");
        assert_matches!(
            ConnectFlags::from_bits_truncate(0b0001_1100).qos(),
            Err(Error::MalformedPacket(_))
        );
    }

    #[test]
    fn test_delivery() {
        assert_eq!(Delivery::new(QoS::AtMostOnce, 7), Delivery::AtMostOnce);
        assert_eq!(Delivery::new(QoS::AtLeastOnce, 7).packet_id(), Some(7));
        assert_eq!(Delivery::ExactlyOnce(7).qos(), QoS::ExactlyOnce);
        assert_eq!(Delivery::AtMostOnce.packet_id(), None);
    }

    #[test]
    fn test_subscribe_return_code() {
        assert_eq!(
            SubscribeReturnCode::try_from(0x01),
            Ok(SubscribeReturnCode::Success(QoS::AtLeastOnce))
        );
        assert_eq!(
            SubscribeReturnCode::try_from(0x80),
            Ok(SubscribeReturnCode::Failure)
        );
        assert_matches!(
            SubscribeReturnCode::try_from(0x03),
            Err(Error::MalformedPacket(_))
        );
        assert_eq!(u8::from(SubscribeReturnCode::Failure), 0x80);
    }

    #[test]
    fn test_release() {
        let packet = Packet::Publish(Publish {
            delivery: Delivery::AtLeastOnce(1),
            topic_name: "topic".to_owned(),
            payload: Bytes::from_static(b"hello"),
            ..Default::default()
        });

        assert_eq!(packet.release(), 10);
        assert_eq!(
            release(Packet::Subscribe(Subscribe {
                packet_id: 1,
                subscriptions: vec![("a/b", QoS::AtMostOnce).into()],
            })),
            3
        );
        assert_eq!(release(Packet::PublishAck(Ack { packet_id: 7 })), 0);
        assert_eq!(release(Packet::Disconnect), 0);
    }

    #[test]
    fn test_return_code_reason() {
        assert_eq!(
            ConnectReturnCode::BadUserNameOrPassword.to_string(),
            "Connection Refused, bad user name or password"
        );
    }
}
