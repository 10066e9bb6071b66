//! Constructors for the packets a broker replies with.
use bytes::Bytes;

use crate::{
    error::{Error, Result},
    packet::{
        Ack, ConnectAck, ConnectReturnCode, Delivery, Packet, PacketId, Publish, SubscribeAck,
        SubscribeReturnCode, Type,
    },
};

/// Creates a packet made of a fixed header only, PINGREQ, PINGRESP or DISCONNECT.
pub fn make_header_only(packet_type: Type) -> Result<Packet> {
    match packet_type {
        Type::PINGREQ => Ok(Packet::Ping),
        Type::PINGRESP => Ok(Packet::Pong),
        Type::DISCONNECT => Ok(Packet::Disconnect),
        _ => Err(Error::InvalidPacketType(packet_type.into())),
    }
}

/// Creates a CONNACK packet.
pub fn make_connack(session_present: bool, return_code: ConnectReturnCode) -> Packet {
    Packet::ConnectAck(ConnectAck {
        session_present,
        return_code,
    })
}

/// Creates a SUBACK packet with one return code per requested Topic Filter.
pub fn make_suback<I>(packet_id: PacketId, return_codes: I) -> Packet
where
    I: IntoIterator<Item = SubscribeReturnCode>,
{
    Packet::SubscribeAck(SubscribeAck {
        packet_id,
        status: return_codes.into_iter().collect(),
    })
}

/// Creates one of the packets carrying only a Packet Identifier,
/// PUBACK, PUBREC, PUBREL, PUBCOMP or UNSUBACK.
pub fn make_generic_ack(packet_type: Type, packet_id: PacketId) -> Result<Packet> {
    let ack = Ack { packet_id };

    match packet_type {
        Type::PUBACK => Ok(Packet::PublishAck(ack)),
        Type::PUBREC => Ok(Packet::PublishReceived(ack)),
        Type::PUBREL => Ok(Packet::PublishRelease(ack)),
        Type::PUBCOMP => Ok(Packet::PublishComplete(ack)),
        Type::UNSUBACK => Ok(Packet::UnsubscribeAck(ack)),
        _ => Err(Error::InvalidPacketType(packet_type.into())),
    }
}

/// Creates a PUBLISH packet with the DUP and RETAIN flags cleared.
pub fn make_publish<S, B>(delivery: Delivery, topic_name: S, payload: B) -> Packet
where
    S: Into<String>,
    B: Into<Bytes>,
{
    Packet::Publish(Publish {
        dup: false,
        retain: false,
        delivery,
        topic_name: topic_name.into(),
        payload: payload.into(),
    })
}
