//! End to end zone transfers over TCP.

use bytes::Bytes;
use futures_util::StreamExt;
use std::str::FromStr;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use zonexfr::base::{
    Class, Message, Name, Record, RecordData, Rtype, Serial, Soa,
};
use zonexfr::net::conn::StreamConn;
use zonexfr::net::xfr::{
    Channel, Config, Envelope, StreamResponseWriter, Transfer,
};
use zonexfr::tsig::Algorithm;

#[tokio::test]
async fn axfr_over_tcp() {
    init_logging();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_one(
        listener,
        Config::new(),
        vec![vec![
            soa(1),
            a_record("a.example.com"),
            a_record("b.example.com"),
            soa(1),
        ]],
    ));

    let transfer = Transfer::new(Config::new());
    let query = Message::axfr_query(name("example.com"));
    let mut stream = transfer.begin(query, addr).await.unwrap();

    let mut envelopes = Vec::new();
    while let Some(envelope) = stream.next().await {
        assert!(envelope.error().is_none(), "{:?}", envelope.error());
        envelopes.push(envelope);
    }
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].records().len(), 4);
    assert_eq!(envelopes[0].records()[0].rtype(), Rtype::SOA);
    server.await.unwrap();
}

#[tokio::test]
async fn signed_axfr_over_tcp() {
    init_logging();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_one(
        listener,
        tsig_config(),
        vec![vec![soa(1)], vec![a_record("a.example.com"), soa(1)]],
    ));

    let transfer = Transfer::new(tsig_config());
    let mut query = Message::axfr_query(name("example.com"));
    query.set_tsig(
        name("tsig-key.example.com"),
        Algorithm::Sha256.to_name(),
        0,
    );
    let mut stream = transfer.begin(query, addr).await.unwrap();

    // The reply to the first envelope carries one record; the reply to
    // the second carries the accumulated three. All of them verified
    // over the chained signatures.
    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none(), "{:?}", envelope.error());
    assert_eq!(envelope.records().len(), 1);
    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none(), "{:?}", envelope.error());
    assert_eq!(envelope.records().len(), 3);
    assert!(stream.recv().await.is_none());
    server.await.unwrap();
}

//------------ Helper functions ----------------------------------------------

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_ids(true)
        .without_time()
        .try_init()
        .ok();
}

fn name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

fn soa(serial: u32) -> Record {
    Record::new(
        name("example.com"),
        Rtype::SOA,
        Class::IN,
        3600,
        RecordData::Soa(Soa::new(
            name("ns.example.com"),
            name("hostmaster.example.com"),
            Serial(serial),
            10800,
            3600,
            604800,
            3600,
        )),
    )
}

fn a_record(owner: &str) -> Record {
    Record::new(
        name(owner),
        Rtype::A,
        Class::IN,
        300,
        RecordData::Other(Bytes::from_static(&[192, 0, 2, 1])),
    )
}

fn tsig_config() -> Config {
    let mut config = Config::new();
    config
        .add_secret(name("tsig-key.example.com"), "c2VjcmV0IHNlY3JldA==")
        .unwrap();
    config
}

/// Accepts one connection and answers one transfer query on it.
async fn serve_one(
    listener: TcpListener,
    config: Config,
    batches: Vec<Vec<Record>>,
) {
    let (stream, _addr) = listener.accept().await.unwrap();
    let mut chan = Channel::new(StreamConn::new(stream), config.clone());
    let query = chan.read_msg().await.unwrap();

    let transfer = Transfer::new(config);
    let (tx, rx) = mpsc::channel(1);
    let running =
        transfer.answer(StreamResponseWriter::new(chan), &query, rx);
    for batch in batches {
        tx.send(Envelope::new(batch)).await.unwrap();
    }
    drop(tx);

    // The writer comes back with the connection for whatever follows.
    let writer = running.join().await.unwrap();
    drop(writer.into_inner());
}
