//! Captures of frames from the frame builder

use std::io::Cursor;
use udpcap_capture::{LinkType, PcapReader, PcapWriter, RecordClock, TimestampMode};
use udpcap_packet::{FrameBuilder, NetworkConfig, ParsedFrame, FRAME_OVERHEAD};

#[test]
fn builder_frames_survive_the_container() {
    let mut builder = FrameBuilder::new(NetworkConfig::default());
    let clock = RecordClock::starting_at(TimestampMode::RunStart, 1_234_567_890);
    let mut writer =
        PcapWriter::with_options(Vec::new(), LinkType::Ethernet, 65536, clock).unwrap();

    let payloads: [&[u8]; 3] = [b"", b"odd", &[0xEE; 1024]];
    for payload in payloads {
        let frame = builder.assemble(payload).unwrap();
        writer.write_frame(&frame).unwrap();
    }
    writer.flush().unwrap();
    assert_eq!(writer.records_written(), 3);

    let reader = PcapReader::new(Cursor::new(writer.into_inner())).unwrap();
    for (i, record) in reader.enumerate() {
        let record = record.unwrap();
        assert_eq!(record.header.ts_sec, 1_234_567_890);
        assert_eq!(record.header.ts_usec, i as u32);
        assert_eq!(
            record.header.incl_len as usize,
            FRAME_OVERHEAD + payloads[i].len()
        );

        let frame = ParsedFrame::parse(&record.data).unwrap();
        assert_eq!(frame.payload, payloads[i]);
        assert_eq!(frame.ip.identification, 8189 + i as u16);
        assert!(frame.ip_checksum_valid());
        assert!(frame.udp_checksum_valid());
    }
}
