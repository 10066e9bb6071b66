#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((_, packet)) = mqtt_codec::unpack(data) {
        let buf = packet.pack().expect("decoded packet must pack");

        assert_eq!(mqtt_codec::unpack(&buf).map(|(_, p)| p), Ok(packet));
    }
});
