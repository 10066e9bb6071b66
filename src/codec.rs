use bytes::{Buf, BytesMut};

use crate::{
    decode::{peek_header, unpack},
    error::{Error, Result},
    packet::Packet,
    varint::{MAX_LENGTH_BYTES, MAX_REMAINING_LENGTH},
};

/// The largest packet the protocol can frame.
pub const MAX_PACKET_SIZE: usize = 1 + MAX_LENGTH_BYTES + MAX_REMAINING_LENGTH;

/// Limits applied by a `Codec`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Config {
    /// The largest packet accepted or produced, fixed header included.
    pub max_packet_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_packet_size: MAX_PACKET_SIZE,
        }
    }
}

/// MQTT protocol codec
///
/// Splits packets off a stream buffer and appends packets to one.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: Config,
}

impl Codec {
    /// Creates a codec with the default limits.
    pub fn new() -> Self {
        Codec::default()
    }

    /// Creates a codec with the given limits.
    pub fn with_config(config: Config) -> Self {
        Codec { config }
    }

    /// The limits of this codec.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Unpacks the packet at the front of `buf` and removes its bytes.
    ///
    /// Returns `None` until the whole packet has been buffered.
    /// On error `buf` is left untouched.
    pub fn decode(&self, buf: &mut BytesMut) -> Result<Option<Packet>> {
        let frame = match peek_header(buf) {
            Ok(frame) => frame,
            Err(err) if err.is_incomplete() => {
                debug!("skip incomplete header, {} bytes buffered", buf.len());

                return Ok(None);
            }
            Err(err) => {
                warn!("fail to decode packet header, {}", err);

                return Err(err);
            }
        };

        let packet_len = frame.packet_len();

        if packet_len > self.config.max_packet_size {
            warn!(
                "{:?} packet of {} bytes exceeds the limit of {} bytes",
                frame.header.packet_type, packet_len, self.config.max_packet_size
            );

            return Err(Error::LengthOverflow("packet"));
        }

        if buf.len() < packet_len {
            debug!(
                "skip incomplete {:?} packet, {} of {} bytes buffered",
                frame.header.packet_type,
                buf.len(),
                packet_len
            );

            buf.reserve(packet_len - buf.len());

            return Ok(None);
        }

        match unpack(&buf[..packet_len]) {
            Ok((_, packet)) => {
                buf.advance(packet_len);

                trace!("decode {} bytes to {:?} packet", packet_len, frame.header.packet_type);

                Ok(Some(packet))
            }
            Err(err) => {
                warn!("fail to decode {:?} packet, {}", frame.header.packet_type, err);

                Err(err)
            }
        }
    }

    /// Packs `packet` at the end of `buf`.
    pub fn encode(&self, packet: &Packet, buf: &mut BytesMut) -> Result<()> {
        let packet_len = packet.size();

        if packet_len > self.config.max_packet_size {
            warn!(
                "{:?} packet of {} bytes exceeds the limit of {} bytes",
                packet.packet_type(),
                packet_len,
                self.config.max_packet_size
            );

            return Err(Error::LengthOverflow("packet"));
        }

        buf.reserve(packet_len);
        packet.write_to(buf)?;

        trace!("encode {:?} packet to {} bytes", packet.packet_type(), packet_len);

        Ok(())
    }
}
