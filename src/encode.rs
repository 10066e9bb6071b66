use core::mem;

use bytes::{BufMut, BytesMut};
use derive_more::Deref;

use crate::{
    error::{Error, Result},
    packet::{self, ConnectAckFlags, ConnectFlags, Packet, PacketId, PROTOCOL_LEVEL, PROTOCOL_NAME},
    varint::{self, MAX_REMAINING_LENGTH},
};

const LENGTH_FIELD_SIZE: usize = mem::size_of::<u16>();
const MAX_FIELD_LEN: usize = u16::MAX as usize;

trait BufMutExt: BufMut {
    fn put_utf8_str(&mut self, s: &str) {
        self.put_binary(s.as_bytes())
    }

    fn put_binary(&mut self, s: &[u8]) {
        self.put_u16(s.len() as u16);
        self.put_slice(s)
    }
}

impl<T: BufMut> BufMutExt for T {}

/// Fails if a length-prefixed field does not fit its 2 byte length.
fn check_field(name: &'static str, len: usize) -> Result<()> {
    if len > MAX_FIELD_LEN {
        Err(Error::LengthOverflow(name))
    } else {
        Ok(())
    }
}

/// Fails if a Topic Name is too long or carries wildcard characters.
fn check_topic_name(name: &'static str, topic_name: &str) -> Result<()> {
    check_field(name, topic_name.len())?;

    if topic_name.contains(&['+', '#'][..]) {
        Err(Error::malformed(format!("wildcard in {} {:?}", name, topic_name)))
    } else {
        Ok(())
    }
}

/// The variable header and payload of one packet variant.
trait WriteTo {
    /// Gets the size of this object.
    fn size(&self) -> usize;

    /// Checks that every field fits the wire format.
    fn check(&self) -> Result<()> {
        Ok(())
    }

    /// Writes this object to the given byte-oriented sink.
    fn write_to<T: BufMut>(&self, buf: &mut T);
}

impl Packet {
    fn remaining_length(&self) -> usize {
        match self {
            Packet::Connect(ref connect) => Connect(connect).size(),
            Packet::ConnectAck(ref connect_ack) => ConnectAck(connect_ack).size(),
            Packet::Publish(ref publish) => Publish(publish).size(),
            Packet::PublishAck(ref ack)
            | Packet::PublishReceived(ref ack)
            | Packet::PublishRelease(ref ack)
            | Packet::PublishComplete(ref ack)
            | Packet::UnsubscribeAck(ref ack) => Ack(ack).size(),
            Packet::Subscribe(ref subscribe) => Subscribe(subscribe).size(),
            Packet::SubscribeAck(ref subscribe_ack) => SubscribeAck(subscribe_ack).size(),
            Packet::Unsubscribe(ref unsubscribe) => Unsubscribe(unsubscribe).size(),
            Packet::Ping | Packet::Pong | Packet::Disconnect => 0,
        }
    }

    fn check(&self) -> Result<()> {
        match self {
            Packet::Connect(ref connect) => Connect(connect).check()?,
            Packet::Publish(ref publish) => Publish(publish).check()?,
            Packet::Subscribe(ref subscribe) => Subscribe(subscribe).check()?,
            Packet::SubscribeAck(ref subscribe_ack) => SubscribeAck(subscribe_ack).check()?,
            Packet::Unsubscribe(ref unsubscribe) => Unsubscribe(unsubscribe).check()?,
            _ => {}
        }

        if self.remaining_length() > MAX_REMAINING_LENGTH {
            Err(Error::LengthOverflow("remaining length"))
        } else {
            Ok(())
        }
    }

    /// The number of bytes `pack` produces, fixed header included.
    pub fn size(&self) -> usize {
        let remaining_length = self.remaining_length();

        mem::size_of::<u8>() + varint::size_of_length(remaining_length) + remaining_length
    }

    /// Writes the packet to `buf` and returns the number of bytes written.
    ///
    /// The packet is validated first, nothing is written if it fails.
    pub fn write_to<T: BufMut>(&self, buf: &mut T) -> Result<usize> {
        self.check()?;

        let size = self.size();

        if buf.remaining_mut() < size {
            return Err(Error::IncompleteBuffer {
                needed: size,
                available: buf.remaining_mut(),
            });
        }

        buf.put_u8(self.fixed_header().to_byte());
        varint::encode_length(buf, self.remaining_length())?;

        match self {
            Packet::Connect(ref connect) => Connect(connect).write_to(buf),
            Packet::ConnectAck(ref connect_ack) => ConnectAck(connect_ack).write_to(buf),
            Packet::Publish(ref publish) => Publish(publish).write_to(buf),
            Packet::PublishAck(ref ack)
            | Packet::PublishReceived(ref ack)
            | Packet::PublishRelease(ref ack)
            | Packet::PublishComplete(ref ack)
            | Packet::UnsubscribeAck(ref ack) => Ack(ack).write_to(buf),
            Packet::Subscribe(ref subscribe) => Subscribe(subscribe).write_to(buf),
            Packet::SubscribeAck(ref subscribe_ack) => SubscribeAck(subscribe_ack).write_to(buf),
            Packet::Unsubscribe(ref unsubscribe) => Unsubscribe(unsubscribe).write_to(buf),
            Packet::Ping | Packet::Pong | Packet::Disconnect => {}
        }

        trace!("pack {:?} packet to {} bytes", self.packet_type(), size);

        Ok(size)
    }

    /// Serializes the packet into a newly allocated buffer.
    pub fn pack(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(self.size());

        self.write_to(&mut buf)?;

        Ok(buf)
    }
}

/// Serializes `packet` into a newly allocated buffer.
pub fn pack(packet: &Packet) -> Result<BytesMut> {
    packet.pack()
}

#[derive(Deref)]
struct Connect<'a>(&'a packet::Connect);

impl WriteTo for Connect<'_> {
    fn size(&self) -> usize {
        PROTOCOL_NAME.len()
            + mem::size_of::<u8>()                      // protocol_level
            + mem::size_of::<ConnectFlags>()            // flags
            + mem::size_of::<u16>()                     // keep_alive
            + LENGTH_FIELD_SIZE + self.client_id.len()  // client_id
            + self.last_will.as_ref().map_or(0, |will| {
                LENGTH_FIELD_SIZE + will.topic_name.len()
                + LENGTH_FIELD_SIZE + will.message.len()
            })
            + self.username.as_ref().map_or(0, |s| LENGTH_FIELD_SIZE + s.len())
            + self.password.as_ref().map_or(0, |s| LENGTH_FIELD_SIZE + s.len())
    }

    fn check(&self) -> Result<()> {
        check_field("client id", self.client_id.len())?;
        if let Some(ref will) = self.last_will {
            check_topic_name("will topic", &will.topic_name)?;
            check_field("will message", will.message.len())?;
        }
        if let Some(ref username) = self.username {
            check_field("username", username.len())?;
        }
        if let Some(ref password) = self.password {
            if self.username.is_none() {
                return Err(Error::malformed("password without username"));
            }
            check_field("password", password.len())?;
        }
        Ok(())
    }

    fn write_to<T: BufMut>(&self, buf: &mut T) {
        buf.put_slice(PROTOCOL_NAME);
        buf.put_u8(PROTOCOL_LEVEL);
        buf.put_u8(ConnectFlags::from(self.0).bits());
        buf.put_u16(self.keep_alive);
        buf.put_utf8_str(&self.client_id);
        if let Some(ref will) = self.last_will {
            buf.put_utf8_str(&will.topic_name);
            buf.put_binary(&will.message);
        }
        if let Some(ref username) = self.username {
            buf.put_utf8_str(username);
        }
        if let Some(ref password) = self.password {
            buf.put_binary(password);
        }
    }
}

#[derive(Deref)]
struct ConnectAck<'a>(&'a packet::ConnectAck);

impl WriteTo for ConnectAck<'_> {
    fn size(&self) -> usize {
        mem::size_of::<ConnectAckFlags>() + mem::size_of::<u8>()
    }

    fn write_to<T: BufMut>(&self, buf: &mut T) {
        let mut flags = ConnectAckFlags::empty();
        flags.set(ConnectAckFlags::SESSION_PRESENT, self.session_present);

        buf.put_u8(flags.bits());
        buf.put_u8(self.return_code.into());
    }
}

#[derive(Deref)]
struct Publish<'a>(&'a packet::Publish);

impl WriteTo for Publish<'_> {
    fn size(&self) -> usize {
        LENGTH_FIELD_SIZE
            + self.topic_name.len()
            + self.packet_id().map_or(0, |_| mem::size_of::<PacketId>())
            + self.payload.len()
    }

    fn check(&self) -> Result<()> {
        check_topic_name("topic name", &self.topic_name)
    }

    fn write_to<T: BufMut>(&self, buf: &mut T) {
        buf.put_utf8_str(&self.topic_name);
        if let Some(packet_id) = self.packet_id() {
            buf.put_u16(packet_id);
        }
        buf.put_slice(&self.payload)
    }
}

#[derive(Deref)]
struct Ack<'a>(&'a packet::Ack);

impl WriteTo for Ack<'_> {
    fn size(&self) -> usize {
        mem::size_of::<PacketId>()
    }

    fn write_to<T: BufMut>(&self, buf: &mut T) {
        buf.put_u16(self.packet_id);
    }
}

#[derive(Deref)]
struct Subscribe<'a>(&'a packet::Subscribe);

impl WriteTo for Subscribe<'_> {
    fn size(&self) -> usize {
        mem::size_of::<PacketId>()
            + self
                .subscriptions
                .iter()
                .map(|subscription| {
                    LENGTH_FIELD_SIZE + subscription.topic_filter.len() + mem::size_of::<u8>()
                })
                .sum::<usize>()
    }

    fn check(&self) -> Result<()> {
        if self.subscriptions.is_empty() {
            return Err(Error::malformed("subscribe without topic filters"));
        }
        self.subscriptions
            .iter()
            .try_for_each(|subscription| check_field("topic filter", subscription.topic_filter.len()))
    }

    fn write_to<T: BufMut>(&self, buf: &mut T) {
        buf.put_u16(self.packet_id);
        for subscription in &self.subscriptions {
            buf.put_utf8_str(&subscription.topic_filter);
            buf.put_u8(subscription.qos.into());
        }
    }
}

#[derive(Deref)]
struct SubscribeAck<'a>(&'a packet::SubscribeAck);

impl WriteTo for SubscribeAck<'_> {
    fn size(&self) -> usize {
        mem::size_of::<PacketId>() + mem::size_of::<u8>() * self.status.len()
    }

    fn check(&self) -> Result<()> {
        if self.status.is_empty() {
            Err(Error::malformed("subscribe ack without return codes"))
        } else {
            Ok(())
        }
    }

    fn write_to<T: BufMut>(&self, buf: &mut T) {
        buf.put_u16(self.packet_id);
        for &return_code in &self.status {
            buf.put_u8(return_code.into());
        }
    }
}

#[derive(Deref)]
struct Unsubscribe<'a>(&'a packet::Unsubscribe);

impl WriteTo for Unsubscribe<'_> {
    fn size(&self) -> usize {
        mem::size_of::<PacketId>()
            + self
                .topic_filters
                .iter()
                .map(|topic_filter| LENGTH_FIELD_SIZE + topic_filter.len())
                .sum::<usize>()
    }

    fn check(&self) -> Result<()> {
        if self.topic_filters.is_empty() {
            return Err(Error::malformed("unsubscribe without topic filters"));
        }
        self.topic_filters
            .iter()
            .try_for_each(|topic_filter| check_field("topic filter", topic_filter.len()))
    }

    fn write_to<T: BufMut>(&self, buf: &mut T) {
        buf.put_u16(self.packet_id);
        for topic_filter in &self.topic_filters {
            buf.put_utf8_str(topic_filter);
        }
    }
}
