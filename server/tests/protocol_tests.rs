//! End-to-end tests driving a real listener over a loopback `TcpStream`,
//! covering the VMware extension handshake and console byte routing.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use vspc_server::config::Config;
use vspc_server::listener::Listener;
use vspc_server::{ServerMetrics, SessionRegistry};
use vspc_telnetcodec::consts::{option, vmware, DO, IAC, SB, SE, WILL};
use vspc_telnetcodec::VmwareMessage;

fn test_config(serial_log_dir: std::path::PathBuf, uri: &str) -> Arc<Config> {
    Arc::new(Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        web_port: 0,
        cert: None,
        key: None,
        uri: uri.to_string(),
        serial_log_dir,
        username: None,
        password: None,
    })
}

async fn read_exact_timeout(stream: &mut TcpStream, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    timeout(Duration::from_secs(2), stream.read_exact(&mut buf))
        .await
        .expect("timed out waiting for bytes")
        .expect("read_exact failed");
    buf
}

fn sub_negotiation(payload: &[u8]) -> Vec<u8> {
    let mut out = vec![IAC, SB];
    out.extend_from_slice(payload);
    out.push(IAC);
    out.push(SE);
    out
}

/// S1/S2: the server is purely reactive — it replies to the peer's `WILL
/// VMWARE_EXT` with `DO VMWARE_EXT`, and once the peer then announces
/// `KNOWN-SUBOPTIONS-1` it receives the canonical supported set followed
/// immediately by a `GET-VM-VC-UUID` request.
#[tokio::test]
async fn handshake_advertises_vmware_ext_and_requests_identity() {
    let dir = unique_dir("handshake");
    let config = test_config(dir.clone(), "vspc://host/");
    let registry = Arc::new(SessionRegistry::new());
    let metrics = Arc::new(ServerMetrics::new());
    let listener = Listener::bind(config, registry, metrics).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(listener.serve());

    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream.write_all(&[IAC, WILL, option::VMWARE_EXT]).await.unwrap();

    let reply = read_exact_timeout(&mut stream, 3).await;
    assert_eq!(reply, vec![IAC, DO, option::VMWARE_EXT]);

    let known_suboptions_1 = sub_negotiation(&[option::VMWARE_EXT, vmware::KNOWN_SUBOPTIONS_1]);
    stream.write_all(&known_suboptions_1).await.unwrap();

    let expected_reply = sub_negotiation(&VmwareMessage::supported_suboptions().encode());
    let reply = read_exact_timeout(&mut stream, expected_reply.len()).await;
    assert_eq!(reply, expected_reply);

    let get_uuid_request =
        sub_negotiation(&VmwareMessage::GetVmVcUuid.encode());
    let reply = read_exact_timeout(&mut stream, get_uuid_request.len()).await;
    assert_eq!(reply, get_uuid_request);

    let _ = std::fs::remove_dir_all(&dir);
}

/// S4/S5: once a VM identifies itself, subsequent data bytes are appended
/// to its log file, and a second connection under a different identity
/// writes to a different file.
#[tokio::test]
async fn console_bytes_are_appended_to_the_bound_vms_log_file() {
    let dir = unique_dir("append");
    let config = test_config(dir.clone(), "vspc://host/");
    let registry = Arc::new(SessionRegistry::new());
    let metrics = Arc::new(ServerMetrics::new());
    let listener = Listener::bind(config, registry, metrics).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(listener.serve());

    let mut stream = TcpStream::connect(addr).await.unwrap();

    let vm_vc_uuid = VmwareMessage::VmVcUuid("42 0d115c-b5d4-0fcd 0b0a-abcdef123456".to_string());
    stream.write_all(&sub_negotiation(&vm_vc_uuid.encode())).await.unwrap();

    stream.write_all(b"console boot messages\n").await.unwrap();

    // Give the connection task a moment to process and append.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let contents = tokio::fs::read(dir.join("420d115cb5d40fcd0b0aabcdef123456"))
        .await
        .unwrap();
    assert_eq!(contents, b"console boot messages\n");

    let _ = std::fs::remove_dir_all(&dir);
}

/// S6: data arriving before any identity has been bound is a protocol
/// violation; the server closes the connection rather than buffering or
/// discarding it silently.
#[tokio::test]
async fn unidentified_data_closes_the_connection() {
    let dir = unique_dir("unidentified");
    let config = test_config(dir.clone(), "vspc://host/");
    let registry = Arc::new(SessionRegistry::new());
    let metrics = Arc::new(ServerMetrics::new());
    let listener = Listener::bind(config, registry, metrics).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(listener.serve());

    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream.write_all(b"data before identity").await.unwrap();

    let mut buf = [0u8; 16];
    let read = timeout(Duration::from_secs(2), stream.read(&mut buf)).await.unwrap();
    assert_eq!(read.unwrap(), 0, "server must close the connection");

    let _ = std::fs::remove_dir_all(&dir);
}

fn unique_dir(label: &str) -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("vspc-protocol-test-{}-{label}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
