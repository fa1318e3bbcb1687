//! End-to-end transfer of mixed-type values through counted streams on both
//! ends of a pipe.

use std::io::{BufRead, Read, Write};
use std::thread;

use fdlog::io::{ByteCount, CountedInputStream, CountedOutputStream};
use test_support::Pipe;

#[derive(Debug, Clone, PartialEq)]
struct Record {
    id: u32,
    delta: i64,
    ratio: f64,
    flag: bool,
    label: String,
}

fn sample_records() -> Vec<Record> {
    (0..64)
        .map(|i| Record {
            id: i,
            delta: i64::from(i) * -1_000_003,
            ratio: f64::from(i) / 7.0,
            flag: i % 3 == 0,
            label: format!("record-{i}"),
        })
        .collect()
}

fn encode<W: Write>(out: &mut W, record: &Record) -> std::io::Result<usize> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&record.id.to_le_bytes());
    bytes.extend_from_slice(&record.delta.to_le_bytes());
    bytes.extend_from_slice(&record.ratio.to_le_bytes());
    bytes.push(u8::from(record.flag));
    bytes.extend_from_slice(record.label.as_bytes());
    bytes.push(b'\n');
    out.write_all(&bytes)?;
    Ok(bytes.len())
}

fn decode<R: BufRead>(input: &mut R) -> std::io::Result<Record> {
    let mut id = [0u8; 4];
    let mut delta = [0u8; 8];
    let mut ratio = [0u8; 8];
    let mut flag = [0u8; 1];
    input.read_exact(&mut id)?;
    input.read_exact(&mut delta)?;
    input.read_exact(&mut ratio)?;
    input.read_exact(&mut flag)?;
    let mut label = Vec::new();
    input.read_until(b'\n', &mut label)?;
    label.pop();
    Ok(Record {
        id: u32::from_le_bytes(id),
        delta: i64::from_le_bytes(delta),
        ratio: f64::from_le_bytes(ratio),
        flag: flag[0] != 0,
        label: String::from_utf8(label).expect("label is UTF-8"),
    })
}

/// Verifies every value round-trips and both counters equal the bytes that
/// crossed the pipe.
#[test]
fn mixed_values_round_trip_with_matching_counters() {
    let mut pipe = Pipe::new();
    let records = sample_records();
    let outgoing = ByteCount::new();
    let incoming = ByteCount::new();

    let write_fd = pipe.take_write();
    let to_send = records.clone();
    let sent_counter = outgoing.clone();
    let producer = thread::spawn(move || {
        let mut output = CountedOutputStream::with_counter_fd(sent_counter, write_fd);
        let mut total = 0;
        for record in &to_send {
            total += encode(&mut output, record).unwrap();
        }
        output.close().unwrap();
        total
    });

    let mut input = CountedInputStream::with_counter_fd(incoming.clone(), pipe.read_fd());
    let received: Vec<Record> = (0..records.len())
        .map(|_| decode(&mut input).unwrap())
        .collect();
    let mut trailing = Vec::new();
    input.read_to_end(&mut trailing).unwrap();
    let written = producer.join().unwrap();

    assert_eq!(received, records);
    assert!(trailing.is_empty());
    assert!(input.eof());
    assert_eq!(outgoing.get(), written as u64);
    assert_eq!(incoming.get(), written as u64);
}

/// Verifies a reader can peek at a tag byte, push it back, and re-read it
/// while decoding a framed stream.
#[test]
fn peek_and_putback_drive_a_tagged_decoder() {
    let pipe = Pipe::new();
    pipe.feed(b"I\x2a\x00\x00\x00S5:hello");
    let mut input = CountedInputStream::with_counter_fd(ByteCount::new(), pipe.read_fd());

    let tag = input.get().unwrap().unwrap();
    assert_eq!(tag, b'I');
    let mut int = [0u8; 4];
    input.read_exact(&mut int).unwrap();
    assert_eq!(u32::from_le_bytes(int), 42);

    let tag = input.get().unwrap().unwrap();
    assert!(input.putback(tag));
    assert_eq!(input.peek().unwrap(), Some(b'S'));
    input.get().unwrap();

    let mut header = Vec::new();
    input.read_until(b':', &mut header).unwrap();
    assert_eq!(header, b"5:");
    let mut body = [0u8; 5];
    input.read_exact(&mut body).unwrap();
    assert_eq!(&body, b"hello");
    assert_eq!(input.counter().get(), 13);
}
