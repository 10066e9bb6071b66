//! The MQTT protocol works by exchanging a series of MQTT Control Packets in a defined way.
//!
//! This crate describes the format of these packets for the version 3.1.1 of the protocol,
//! packs them into bytes and unpacks them from bytes.
//!
//! ```
//! use mqtt_codec::{make_connack, unpack, ConnectReturnCode};
//!
//! let packet = make_connack(true, ConnectReturnCode::ConnectionAccepted);
//! let buf = packet.pack().unwrap();
//!
//! assert_eq!(&buf[..], b"\x20\x02\x01\x00");
//! assert_eq!(unpack(&buf).unwrap(), (&b""[..], packet));
//! ```
#![warn(missing_docs)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate bitflags;

mod builder;
mod codec;
mod decode;
mod encode;
mod error;
mod packet;
pub mod varint;

pub use crate::builder::*;
pub use crate::codec::{Codec, Config, MAX_PACKET_SIZE};
pub use crate::decode::{peek_header, unpack, Frame};
pub use crate::encode::pack;
pub use crate::error::{Error, Result};
pub use crate::packet::*;
pub use crate::varint::{decode_length, encode_length};
