use core::convert::TryFrom;
use core::str;

use bytes::Bytes;
use nom::{
    bytes::complete::{tag, take},
    combinator::{all_consuming, cond, eof, flat_map, map, map_opt, map_res, rest, verify},
    error::context,
    multi::many1,
    number::complete::{be_u16, be_u8},
    sequence::tuple,
    IResult,
};

use crate::{
    error::{Error, Result},
    packet::*,
    varint,
};

type ParseResult<'a, T> = IResult<&'a [u8], T, Error>;

/// The fixed header of a packet at the front of a buffer.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Frame {
    /// The first byte of the packet.
    pub header: FixedHeader,
    /// The number of bytes following the fixed header.
    pub remaining_length: usize,
    /// The size of the fixed header, the type byte and the Remaining Length field.
    pub header_len: usize,
}

impl Frame {
    /// The size of the whole packet.
    pub fn packet_len(&self) -> usize {
        self.header_len + self.remaining_length
    }
}

/// Reads the fixed header at the front of `input` without looking at the packet body.
///
/// Fails with `IncompleteBuffer` until the whole Remaining Length field is available.
pub fn peek_header(input: &[u8]) -> Result<Frame> {
    let (&b, mut cursor) = input.split_first().ok_or(Error::IncompleteBuffer {
        needed: MQTT_HEADER_LEN,
        available: 0,
    })?;
    let header = FixedHeader::parse(b)?;

    if let Some(reserved) = header.packet_type.reserved_flags() {
        let flags = header.flags().bits();

        if flags != reserved {
            return Err(Error::malformed(format!(
                "{:?} flags {:#06b}",
                header.packet_type, flags
            )));
        }
    }

    let remaining_length = varint::decode_length(&mut cursor).map_err(|err| match err {
        Error::IncompleteBuffer { needed, available } => Error::IncompleteBuffer {
            needed: needed + 1,
            available: available + 1,
        },
        err => err,
    })?;

    Ok(Frame {
        header,
        remaining_length,
        header_len: input.len() - cursor.len(),
    })
}

/// Unpacks one packet from the front of `input`, returning the bytes that follow it.
///
/// Fails with `IncompleteBuffer` if `input` holds less than the whole packet,
/// the caller should retry once more bytes are read.
pub fn unpack(input: &[u8]) -> Result<(&[u8], Packet)> {
    let frame = peek_header(input)?;
    let packet_len = frame.packet_len();

    if input.len() < packet_len {
        return Err(Error::IncompleteBuffer {
            needed: packet_len,
            available: input.len(),
        });
    }

    let (_, packet) = parse(frame.header, &input[frame.header_len..packet_len])?;

    trace!("unpack {:?} packet, {} bytes", frame.header.packet_type, packet_len);

    Ok((&input[packet_len..], packet))
}

fn parse(header: FixedHeader, body: &[u8]) -> ParseResult<Packet> {
    match header.packet_type {
        Type::CONNECT => context("Connect", all_consuming(map(connect, Packet::Connect)))(body),
        Type::CONNACK => context(
            "ConnectAck",
            all_consuming(map(connect_ack, Packet::ConnectAck)),
        )(body),
        Type::PUBLISH => context(
            "Publish",
            all_consuming(map(|input| publish(input, header), Packet::Publish)),
        )(body),
        Type::PUBACK => context("PublishAck", all_consuming(map(ack, Packet::PublishAck)))(body),
        Type::PUBREC => context(
            "PublishReceived",
            all_consuming(map(ack, Packet::PublishReceived)),
        )(body),
        Type::PUBREL => context(
            "PublishRelease",
            all_consuming(map(ack, Packet::PublishRelease)),
        )(body),
        Type::PUBCOMP => context(
            "PublishComplete",
            all_consuming(map(ack, Packet::PublishComplete)),
        )(body),
        Type::SUBSCRIBE => context(
            "Subscribe",
            all_consuming(map(subscribe, Packet::Subscribe)),
        )(body),
        Type::SUBACK => context(
            "SubscribeAck",
            all_consuming(map(subscribe_ack, Packet::SubscribeAck)),
        )(body),
        Type::UNSUBSCRIBE => context(
            "Unsubscribe",
            all_consuming(map(unsubscribe, Packet::Unsubscribe)),
        )(body),
        Type::UNSUBACK => context(
            "UnsubscribeAck",
            all_consuming(map(ack, Packet::UnsubscribeAck)),
        )(body),
        Type::PINGREQ => context("Ping", map(eof, |_| Packet::Ping))(body),
        Type::PINGRESP => context("Pong", map(eof, |_| Packet::Pong))(body),
        Type::DISCONNECT => context("Disconnect", map(eof, |_| Packet::Disconnect))(body),
    }
}

/// A Two Byte Integer length followed by that number of bytes.
///
/// Unlike `nom::multi::length_data`, a length running past the input is an error, not `Incomplete`.
fn length_prefixed(input: &[u8]) -> ParseResult<&[u8]> {
    flat_map(be_u16, |len| take(len))(input)
}

fn binary_data(input: &[u8]) -> ParseResult<Bytes> {
    context("binary data", map(length_prefixed, Bytes::copy_from_slice))(input)
}

/// Text fields in the Control Packets are encoded as UTF-8 strings.
fn utf8_str(input: &[u8]) -> ParseResult<&str> {
    context("utf8 string", map_res(length_prefixed, str::from_utf8))(input)
}

/// The Topic Name identifies the information channel to which payload data is published.
///
/// The Topic Name in the PUBLISH Packet MUST NOT contain wildcard characters [MQTT-3.3.2-2].
fn topic_name(input: &[u8]) -> ParseResult<&str> {
    context(
        "topic name",
        verify(utf8_str, |s: &str| !s.contains(&['+', '#'][..])),
    )(input)
}

fn topic_filter(input: &[u8]) -> ParseResult<String> {
    context("topic filter", map(utf8_str, str::to_owned))(input)
}

fn subscription(input: &[u8]) -> ParseResult<Subscription> {
    context(
        "subscription",
        map(
            tuple((
                topic_filter,
                context("requested qos", map_res(be_u8, QoS::try_from)),
            )),
            |(topic_filter, qos)| Subscription { topic_filter, qos },
        ),
    )(input)
}

fn packet_id(input: &[u8]) -> ParseResult<PacketId> {
    context("packet id", be_u16)(input)
}

fn protocol_level(input: &[u8]) -> ParseResult<u8> {
    let (input, level) = be_u8::<_, Error>(input)?;

    if level == PROTOCOL_LEVEL {
        Ok((input, level))
    } else {
        Err(nom::Err::Failure(Error::UnsupportedProtocolLevel(level)))
    }
}

/// Validates the Connect Flags and extracts the will QoS.
fn connect_flags(input: &[u8]) -> ParseResult<(ConnectFlags, QoS)> {
    let (input, flags) = map_opt(be_u8::<_, Error>, ConnectFlags::from_bits)(input)?;
    let will_qos = flags.qos().map_err(nom::Err::Error)?;

    if !flags.contains(ConnectFlags::LAST_WILL)
        && (will_qos != QoS::AtMostOnce || flags.contains(ConnectFlags::WILL_RETAIN))
    {
        return Err(nom::Err::Error(Error::malformed("will QoS or retain without will")));
    }
    if flags.contains(ConnectFlags::PASSWORD) && !flags.contains(ConnectFlags::USERNAME) {
        return Err(nom::Err::Error(Error::malformed("password without username")));
    }

    Ok((input, (flags, will_qos)))
}

fn connect(input: &[u8]) -> ParseResult<Connect> {
    let (input, (_, _, (flags, will_qos), keep_alive)) = tuple((
        context("protocol name", tag(PROTOCOL_NAME)),
        context("protocol level", protocol_level),
        context("flags", connect_flags),
        context("keepalive", be_u16),
    ))(input)?;

    let (input, (client_id, last_will, username, password)) = tuple((
        context("client id", utf8_str),
        cond(
            flags.contains(ConnectFlags::LAST_WILL),
            context(
                "will",
                map(
                    tuple((context("will topic", topic_name), context("will message", binary_data))),
                    |(topic_name, message)| LastWill {
                        qos: will_qos,
                        retain: flags.contains(ConnectFlags::WILL_RETAIN),
                        topic_name: topic_name.to_owned(),
                        message,
                    },
                ),
            ),
        ),
        cond(
            flags.contains(ConnectFlags::USERNAME),
            context("username", utf8_str),
        ),
        cond(
            flags.contains(ConnectFlags::PASSWORD),
            context("password", binary_data),
        ),
    ))(input)?;

    Ok((
        input,
        Connect {
            clean_session: flags.contains(ConnectFlags::CLEAN_SESSION),
            keep_alive,
            client_id: client_id.to_owned(),
            last_will,
            username: username.map(str::to_owned),
            password,
        },
    ))
}

fn connect_ack(input: &[u8]) -> ParseResult<ConnectAck> {
    map(
        tuple((
            context("flags", map_opt(be_u8, ConnectAckFlags::from_bits)),
            context("return code", map_res(be_u8, ConnectReturnCode::try_from)),
        )),
        |(flags, return_code)| ConnectAck {
            session_present: flags.contains(ConnectAckFlags::SESSION_PRESENT),
            return_code,
        },
    )(input)
}

fn publish(input: &[u8], header: FixedHeader) -> ParseResult<Publish> {
    let (input, (topic_name, packet_id, payload)) = tuple((
        topic_name,
        cond(header.qos > QoS::AtMostOnce, packet_id),
        rest,
    ))(input)?;

    Ok((
        input,
        Publish {
            dup: header.dup,
            retain: header.retain,
            delivery: Delivery::new(header.qos, packet_id.unwrap_or_default()),
            topic_name: topic_name.to_owned(),
            payload: Bytes::copy_from_slice(payload),
        },
    ))
}

fn ack(input: &[u8]) -> ParseResult<Ack> {
    map(packet_id, |packet_id| Ack { packet_id })(input)
}

fn subscribe(input: &[u8]) -> ParseResult<Subscribe> {
    map(
        tuple((packet_id, many1(subscription))),
        |(packet_id, subscriptions)| Subscribe {
            packet_id,
            subscriptions,
        },
    )(input)
}

fn subscribe_ack(input: &[u8]) -> ParseResult<SubscribeAck> {
    map(
        tuple((
            packet_id,
            many1(context(
                "return code",
                map_res(be_u8, SubscribeReturnCode::try_from),
            )),
        )),
        |(packet_id, status)| SubscribeAck { packet_id, status },
    )(input)
}

fn unsubscribe(input: &[u8]) -> ParseResult<Unsubscribe> {
    map(
        tuple((packet_id, many1(topic_filter))),
        |(packet_id, topic_filters)| Unsubscribe {
            packet_id,
            topic_filters,
        },
    )(input)
}
