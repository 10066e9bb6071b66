#[macro_use]
extern crate criterion;

use bytes::BytesMut;
use criterion::Criterion;

use mqtt_codec::*;

fn bench_decode_connect_packets(c: &mut Criterion) {
    let buf: &[u8] = b"\x10\x21\x00\x04MQTT\x04\x14\x00\x3C\x00\x0512345\x00\x05topic\x00\x07message";

    c.bench_function("decode_connect_packets", move |b| b.iter(|| unpack(buf)));
}

fn bench_decode_publish_packets(c: &mut Criterion) {
    let buf: &[u8] = b"\x3d\x0D\x00\x05topic\x43\x21data";

    c.bench_function("decode_publish_packets", move |b| b.iter(|| unpack(buf)));
}

fn bench_decode_subscribe_packets(c: &mut Criterion) {
    let buf: &[u8] = b"\x82\x12\x12\x34\x00\x04test\x01\x00\x06filter\x02";

    c.bench_function("decode_subscribe_packets", move |b| b.iter(|| unpack(buf)));
}

fn bench_decode_stream(c: &mut Criterion) {
    let codec = Codec::new();
    let stream: &[u8] = b"\x3d\x0D\x00\x05topic\x43\x21data\x40\x02\x43\x21\xc0\x00";

    c.bench_function("decode_stream", move |b| {
        b.iter(|| {
            let mut buf = BytesMut::from(stream);

            while let Ok(Some(packet)) = codec.decode(&mut buf) {
                packet.release();
            }
        })
    });
}

criterion_group!(
    decode,
    bench_decode_connect_packets,
    bench_decode_publish_packets,
    bench_decode_subscribe_packets,
    bench_decode_stream
);
criterion_main!(decode);
