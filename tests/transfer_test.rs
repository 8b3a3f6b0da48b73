//! Scripted-peer protocol tests over loopback TCP.
//!
//! Each test binds a listener, scripts the MIP side of the dialogue in a
//! spawned task and drives the client through the public API.

use std::fs;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use mip_transfer::codec::ebcdic;
use mip_transfer::config::{Config, TransferConfig};
use mip_transfer::protocol::{receive_file, send_file, Direction, TransmissionId};
use mip_transfer::MipError;
use tempfile::tempdir;

fn test_config() -> Config {
    Config {
        transfer: TransferConfig {
            connect_timeout_secs: 2,
            read_timeout_secs: 2,
        },
        ..Config::default()
    }
}

async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut len = [0u8; 2];
    stream.read_exact(&mut len).await.expect("frame length");
    let mut buf = vec![0u8; u16::from_be_bytes(len) as usize];
    stream.read_exact(&mut buf).await.expect("frame payload");
    buf
}

async fn write_frame(stream: &mut TcpStream, payload: &[u8]) {
    stream
        .write_all(&(payload.len() as u16).to_be_bytes())
        .await
        .unwrap();
    stream.write_all(payload).await.unwrap();
    stream.flush().await.unwrap();
}

/// 998 acknowledgement with the given return code and count bytes.
fn ack_998(rc: &str, count: u32) -> Vec<u8> {
    let mut b = ebcdic::encode_string("998");
    b.extend_from_slice(&ebcdic::encode_string("01"));
    b.extend_from_slice(&ebcdic::encode_string(rc));
    b.extend_from_slice(&count.to_be_bytes());
    b
}

/// Sending a 3000-byte file produces the 004 header, data frames of
/// 1015/1015/973 bytes each led by the 'R' direction byte, and a trailer
/// counting data frames plus itself.
#[tokio::test]
async fn test_send_dialogue() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.ipm");
    fs::write(&path, vec![0x5Au8; 3000]).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let peer = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let header = read_frame(&mut stream).await;
        assert_eq!(header.len(), 60);
        assert_eq!(ebcdic::decode_string(&header[0..3]), "004");
        assert_eq!(ebcdic::decode_string(&header[5..14]), "R11902840");
        write_frame(&mut stream, &ack_998("00", 0)).await;

        let mut data_sizes = Vec::new();
        let trailer = loop {
            let frame = read_frame(&mut stream).await;
            if ebcdic::decode_string(&frame[0..3]) == "998" {
                break frame;
            }
            assert_eq!(frame[0], 0xD9, "data frames start with 'R'");
            data_sizes.push(frame.len());
        };
        write_frame(&mut stream, &ack_998("00", 0)).await;

        let trailer_count = u32::from_be_bytes(trailer[7..11].try_into().unwrap());
        (data_sizes, trailer_count)
    });

    let tx_id = TransmissionId::normalize("R11902840", Direction::Send).unwrap();
    let summary = send_file("127.0.0.1", port, &path, &tx_id, &test_config())
        .await
        .unwrap();

    assert_eq!(summary.data_frames, 3);
    assert_eq!(summary.bytes_sent, 3000);

    let (data_sizes, trailer_count) = peer.await.unwrap();
    assert_eq!(data_sizes, vec![1015, 1015, 973]);
    assert_eq!(trailer_count, 4);
}

/// A trailer acknowledgement with a non-zero return code fails the send.
#[tokio::test]
async fn test_send_rejected_trailer() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.ipm");
    fs::write(&path, vec![0x01u8; 10]).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_frame(&mut stream).await; // header
        write_frame(&mut stream, &ack_998("00", 0)).await;
        read_frame(&mut stream).await; // data
        read_frame(&mut stream).await; // trailer
        write_frame(&mut stream, &ack_998("12", 0)).await;
    });

    let tx_id = TransmissionId::normalize("R11902840", Direction::Send).unwrap();
    let err = send_file("127.0.0.1", port, &path, &tx_id, &test_config())
        .await
        .unwrap_err();
    match err {
        MipError::Protocol(msg) => assert!(msg.contains("rc=12"), "{msg}"),
        other => panic!("expected protocol error, got {other:?}"),
    }
}

/// Receive with the automatic sequence scan: sequences 01 and 02 are
/// rejected, sequence 03 is accepted via a positive 998 and followed by a
/// single data frame and the trailer; the client stores the 1014 payload
/// bytes, purges, and reports sequence 3.
#[tokio::test]
async fn test_receive_with_sequence_scan() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("in.ipm");

    let tx_id = TransmissionId::normalize("T11200157", Direction::Receive).unwrap();
    let expected_purge_id = tx_id.with_sequence(3).as_str().to_string();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let peer = tokio::spawn(async move {
        // Sequences 01 and 02: not available
        for expected_seq in ["01", "02"] {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_frame(&mut stream).await;
            assert_eq!(request.len(), 19);
            assert_eq!(ebcdic::decode_string(&request[0..3]), "101");
            assert_eq!(ebcdic::decode_string(&request[17..19]), expected_seq);

            let mut reply = ebcdic::encode_string("99801");
            reply.extend_from_slice(&ebcdic::encode_string("09"));
            write_frame(&mut stream, &reply).await;
        }

        // Sequence 03: accepted, one data frame, trailer, purge
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_frame(&mut stream).await;
        assert_eq!(ebcdic::decode_string(&request[17..19]), "03");

        let mut accept = ebcdic::encode_string("99801");
        accept.extend_from_slice(&ebcdic::encode_string("00"));
        accept.push(0x00);
        write_frame(&mut stream, &accept).await;

        let mut data = vec![0xE3u8];
        data.extend((0..1014u32).map(|i| (i % 256) as u8));
        write_frame(&mut stream, &data).await;

        write_frame(&mut stream, &ack_998("00", 2)).await;

        let purge = read_frame(&mut stream).await;
        assert_eq!(purge.len(), 21);
        assert_eq!(ebcdic::decode_string(&purge[0..3]), "999");
        let purge_id = ebcdic::decode_string(&purge[7..21]);
        write_frame(&mut stream, &ack_998("00", 0)).await;

        (data[1..].to_vec(), purge_id)
    });

    let summary = receive_file("127.0.0.1", port, &dest, &tx_id, &test_config())
        .await
        .unwrap();

    assert_eq!(summary.sequence_used, 3);
    assert_eq!(summary.frames_received, 1);
    assert_eq!(summary.bytes_written, 1014);

    let (expected_payload, purge_id) = peer.await.unwrap();
    assert_eq!(fs::read(&dest).unwrap(), expected_payload);
    assert_eq!(purge_id, expected_purge_id);
}

/// A data frame wrapped in its own RDW: the extractor skips the 4-byte
/// prefix and stores the remaining 1013 bytes.
#[tokio::test]
async fn test_receive_stray_rdw_data_frame() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("in.ipm");

    let tx_id = TransmissionId::normalize("T1120015721201", Direction::Receive).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let peer = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_frame(&mut stream).await; // request

        // 004 header naming the transmission, block count at bytes 36..40
        let mut header = ebcdic::encode_string("00401");
        header.extend_from_slice(&ebcdic::encode_string("T1120015721201"));
        header.resize(36, 0x00);
        header.extend_from_slice(&1u32.to_be_bytes());
        header.resize(60, 0x00);
        write_frame(&mut stream, &header).await;

        // 1018-byte frame: embedded RDW (1008), then 'T', then payload
        let mut data = vec![0x00, 0x00, 0x03, 0xF0, 0xE3];
        data.extend((0..1013u32).map(|i| (i % 251) as u8));
        assert_eq!(data.len(), 1018);
        write_frame(&mut stream, &data).await;

        write_frame(&mut stream, &ack_998("00", 2)).await;

        let purge = read_frame(&mut stream).await;
        assert_eq!(ebcdic::decode_string(&purge[7..21]), "T1120015721201");
        write_frame(&mut stream, &ack_998("00", 0)).await;

        data[5..].to_vec()
    });

    let summary = receive_file("127.0.0.1", port, &dest, &tx_id, &test_config())
        .await
        .unwrap();

    assert_eq!(summary.frames_received, 1);
    assert_eq!(summary.bytes_written, 1013);
    assert_eq!(summary.tx_id, "T1120015721201");

    let expected_payload = peer.await.unwrap();
    assert_eq!(fs::read(&dest).unwrap(), expected_payload);
}

/// Exhausting the sequence range yields a not-found error naming the
/// transmission prefix and the last rejection.
#[tokio::test]
async fn test_receive_scan_exhaustion() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("in.ipm");

    // Start at sequence 98 so only two attempts run
    let tx_id = TransmissionId::normalize("T1120015721298", Direction::Receive).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        for _ in 0..2 {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_frame(&mut stream).await;
            let mut reply = ebcdic::encode_string("99801");
            reply.extend_from_slice(&ebcdic::encode_string("09"));
            reply.extend_from_slice(&ebcdic::encode_string("NOT ON FILE"));
            write_frame(&mut stream, &reply).await;
        }
    });

    let err = receive_file("127.0.0.1", port, &dest, &tx_id, &test_config())
        .await
        .unwrap_err();
    match err {
        MipError::NotFound(msg) => {
            assert!(msg.contains("T11200157212XX"), "{msg}");
            assert!(msg.contains("rc=09"), "{msg}");
            assert!(msg.contains("NOT ON FILE"), "{msg}");
        }
        other => panic!("expected not-found, got {other:?}"),
    }
}

/// A peer that drops the connection mid-dialogue terminates the scan
/// immediately instead of probing the remaining sequences.
#[tokio::test]
async fn test_receive_socket_failure_terminates_scan() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("in.ipm");

    let tx_id = TransmissionId::normalize("T1120015721201", Direction::Receive).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_frame(&mut stream).await;
        // Close without replying
        drop(stream);
    });

    let err = receive_file("127.0.0.1", port, &dest, &tx_id, &test_config())
        .await
        .unwrap_err();
    assert!(
        matches!(err, MipError::Network(_) | MipError::Timeout(_)),
        "got {err:?}"
    );
}
