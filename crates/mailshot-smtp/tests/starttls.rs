//! STARTTLS against a real TLS server on loopback.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use mailshot_smtp::{Client, ClientConfig, Error, PlainAuth, SmtpStream};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{RootCertStore, ServerConfig};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

const CERT: &str = include_str!("fixtures/localhost.crt");
const KEY: &str = include_str!("fixtures/localhost.key");

fn acceptor() -> TlsAcceptor {
    let cert = CertificateDer::from_pem_slice(CERT.as_bytes()).unwrap();
    let key = PrivateKeyDer::from_pem_slice(KEY.as_bytes()).unwrap();
    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert], key)
        .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

fn trusting(roots: RootCertStore) -> Arc<ClientConfig> {
    Arc::new(
        ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
}

fn pinned_roots() -> RootCertStore {
    let mut roots = RootCertStore::empty();
    roots
        .add(CertificateDer::from_pem_slice(CERT.as_bytes()).unwrap())
        .unwrap();
    roots
}

async fn line(reader: &mut (impl AsyncBufRead + Unpin)) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap();
    line.trim_end().to_string()
}

/// Accepts one session: EHLO and STARTTLS in the clear, then EHLO, AUTH and
/// QUIT over TLS. Returns every command line received.
async fn serve(listener: TcpListener) -> Vec<String> {
    let (socket, _) = listener.accept().await.unwrap();
    let mut seen = Vec::new();

    let mut plain = BufReader::new(socket);
    plain.get_mut().write_all(b"220 localhost ESMTP\r\n").await.unwrap();
    seen.push(line(&mut plain).await);
    plain
        .get_mut()
        .write_all(b"250-localhost\r\n250 STARTTLS\r\n")
        .await
        .unwrap();
    seen.push(line(&mut plain).await);
    plain.get_mut().write_all(b"220 ready to start TLS\r\n").await.unwrap();

    let Ok(tls) = acceptor().accept(plain.into_inner()).await else {
        return seen;
    };
    let mut secure = BufReader::new(tls);
    for reply in [
        &b"250-localhost\r\n250 AUTH PLAIN LOGIN\r\n"[..],
        &b"235 2.7.0 accepted\r\n"[..],
        &b"221 bye\r\n"[..],
    ] {
        seen.push(line(&mut secure).await);
        secure.get_mut().write_all(reply).await.unwrap();
    }
    seen
}

async fn connected() -> (Client, tokio::task::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve(listener));

    let socket = TcpStream::connect(addr).await.unwrap();
    let client = Client::from_stream(SmtpStream::new(socket), "localhost")
        .await
        .unwrap();
    (client, server)
}

#[tokio::test]
async fn upgrade_greets_again_over_tls() {
    let (mut client, server) = connected().await;

    client.hello("client.test").await.unwrap();
    assert!(client.extension("STARTTLS"));
    assert!(!client.extension("AUTH"));

    client
        .starttls(trusting(pinned_roots()), "localhost")
        .await
        .unwrap();
    assert!(client.is_tls());
    assert!(client.extension("AUTH"));
    assert!(!client.extension("STARTTLS"));

    let mut auth = PlainAuth::new("user", "pass", "localhost");
    client.auth(&mut auth).await.unwrap();
    client.quit().await.unwrap();

    assert_eq!(
        server.await.unwrap(),
        [
            "EHLO client.test",
            "STARTTLS",
            "EHLO client.test",
            "AUTH PLAIN AHVzZXIAcGFzcw==",
            "QUIT",
        ]
    );
}

#[tokio::test]
async fn untrusted_certificate_fails_the_upgrade() {
    let (mut client, server) = connected().await;

    client.hello("client.test").await.unwrap();
    let err = client
        .starttls(trusting(RootCertStore::empty()), "localhost")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert!(!client.is_tls());
    assert_eq!(server.await.unwrap(), ["EHLO client.test", "STARTTLS"]);
}
