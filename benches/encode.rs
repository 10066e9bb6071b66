#[macro_use]
extern crate criterion;

use bytes::Bytes;
use criterion::Criterion;

use mqtt_codec::*;

fn bench_encode_connect_packets(c: &mut Criterion) {
    let p = Packet::Connect(Connect {
        clean_session: false,
        keep_alive: 60,
        client_id: "12345".to_owned(),
        last_will: Some(LastWill {
            qos: QoS::ExactlyOnce,
            retain: false,
            topic_name: "topic".to_owned(),
            message: Bytes::from_static(b"message"),
        }),
        username: None,
        password: None,
    });

    c.bench_function("encode_connect_packets", move |b| {
        let mut v = Vec::new();

        b.iter(|| {
            v.clear();
            p.write_to(&mut v)
        })
    });
}

fn bench_encode_publish_packets(c: &mut Criterion) {
    let p = make_publish(Delivery::ExactlyOnce(0x4321), "topic", &b"data"[..]);

    c.bench_function("encode_publish_packets", move |b| {
        let mut v = Vec::new();

        b.iter(|| {
            v.clear();
            p.write_to(&mut v)
        })
    });
}

fn bench_encode_subscribe_packets(c: &mut Criterion) {
    let p = Packet::Subscribe(Subscribe {
        packet_id: 0x1234,
        subscriptions: vec![
            ("test", QoS::AtLeastOnce).into(),
            ("filter", QoS::ExactlyOnce).into(),
        ],
    });

    c.bench_function("encode_subscribe_packets", move |b| {
        let mut v = Vec::new();

        b.iter(|| {
            v.clear();
            p.write_to(&mut v)
        })
    });
}

fn bench_encode_subscribe_ack_packets(c: &mut Criterion) {
    let p = make_suback(
        0x1234,
        vec![
            SubscribeReturnCode::Success(QoS::AtLeastOnce),
            SubscribeReturnCode::Failure,
            SubscribeReturnCode::Success(QoS::ExactlyOnce),
        ],
    );

    c.bench_function("encode_subscribe_ack_packets", move |b| b.iter(|| p.pack()));
}

fn bench_encode_unsubscribe_packets(c: &mut Criterion) {
    let p = Packet::Unsubscribe(Unsubscribe {
        packet_id: 0x1234,
        topic_filters: vec!["test".to_owned(), "filter".to_owned()],
    });

    c.bench_function("encode_unsubscribe_packets", move |b| b.iter(|| p.pack()));
}

criterion_group!(
    encode,
    bench_encode_connect_packets,
    bench_encode_publish_packets,
    bench_encode_subscribe_packets,
    bench_encode_subscribe_ack_packets,
    bench_encode_unsubscribe_packets
);
criterion_main!(encode);
