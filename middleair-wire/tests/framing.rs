use middleair_wire::{Envelope, Error, FramedStream, Schema, decode_frame, encode_frame};

#[test]
fn s2_framing_round_trip() {
    let m: Vec<u8> = (0..1000).flat_map(|_| [0x00, 0x01, 0x02, 0x03, 0x04]).collect();
    let wire = encode_frame(&m);
    assert_eq!(&wire[..8], &[0x88, 0x13, 0, 0, 0, 0, 0, 0]);
    assert_eq!(decode_frame(&wire).unwrap(), &m[..]);
}

struct Ping;

impl Schema for Ping {
    fn type_name() -> &'static str { "test.Ping" }
    fn encode(&self) -> Vec<u8> { vec![] }
    fn decode(_bytes: &[u8]) -> Result<Self, Error> { Ok(Ping) }
}

#[tokio::test]
async fn framed_stream_writes_and_reads_one_record() {
    let (mut a, mut b) = tokio::io::duplex(4096);

    let env = Envelope::pack(&Ping);
    let mut writer = FramedStream::new(&mut a);
    writer.write_frame(&env.to_bytes()).await.unwrap();

    let mut reader = FramedStream::new(&mut b);
    let payload = reader.read_frame().await.unwrap().expect("a record");
    let decoded = Envelope::from_bytes(&payload).unwrap();
    assert_eq!(decoded.type_name, "test.Ping");
}

#[tokio::test]
async fn framed_stream_reports_clean_eof() {
    let (a, mut b) = tokio::io::duplex(64);
    drop(a);
    let mut reader = FramedStream::new(&mut b);
    assert!(reader.read_frame().await.unwrap().is_none());
}
