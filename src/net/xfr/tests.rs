use super::*;
use crate::base::iana::{Class, Rtype};
use crate::base::message::Message;
use crate::base::name::Name;
use crate::base::rdata::{RecordData, Soa};
use crate::base::record::Record;
use crate::base::serial::Serial;
use crate::net::conn::StreamConn;
use crate::tsig::Algorithm;
use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use std::str::FromStr;
use tokio::io::DuplexStream;
use tokio::sync::mpsc;

#[tokio::test]
async fn axfr_multi_message() {
    init_logging();

    let (client, server) = tokio::io::duplex(4096);
    let server_task = tokio::spawn(serve(
        server,
        Config::new(),
        vec![
            vec![soa(1)],
            vec![a_record("a.example.com"), a_record("b.example.com")],
            vec![a_record("c.example.com"), soa(1)],
        ],
    ));

    let transfer = Transfer::new(Config::new());
    let query = Message::axfr_query(name("example.com"));
    let mut stream = transfer.begin_stream(query, client).await.unwrap();

    // One envelope per message, in order, and the stream closes right
    // after the message carrying the trailing SOA.
    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none());
    assert_eq!(envelope.records().len(), 1);
    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none());
    assert_eq!(envelope.records().len(), 2);
    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none());
    assert_eq!(envelope.records().len(), 2);
    assert!(stream.recv().await.is_none());
    server_task.await.unwrap();
}

#[tokio::test]
async fn axfr_single_message() {
    init_logging();

    let (client, server) = tokio::io::duplex(4096);
    tokio::spawn(serve(
        server,
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
    let mut stream = transfer.begin_stream(query, client).await.unwrap();

    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none());
    assert_eq!(envelope.records().len(), 4);
    assert!(stream.recv().await.is_none());
}

#[tokio::test]
async fn axfr_single_record_first_message() {
    init_logging();

    // A first message of just the opening SOA must not be taken for the
    // end of the transfer.
    let (client, server) = tokio::io::duplex(4096);
    tokio::spawn(serve(
        server,
        Config::new(),
        vec![vec![soa(1)], vec![a_record("a.example.com"), soa(1)]],
    ));

    let transfer = Transfer::new(Config::new());
    let query = Message::axfr_query(name("example.com"));
    let mut stream = transfer.begin_stream(query, client).await.unwrap();

    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none());
    assert_eq!(envelope.records().len(), 1);
    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none());
    assert_eq!(envelope.records().len(), 2);
    assert!(stream.recv().await.is_none());
}

#[tokio::test]
async fn axfr_id_mismatch() {
    init_logging();

    let (client, server) = tokio::io::duplex(4096);
    tokio::spawn(async move {
        let mut chan =
            Channel::new(StreamConn::new(server), Config::new());
        let query = chan.read_msg().await.unwrap();
        let mut reply = query.reply();
        reply
            .header_mut()
            .set_id(query.header().id().wrapping_add(1));
        reply.push_answer(soa(1));
        chan.write_msg(&reply).await.unwrap();
    });

    let transfer = Transfer::new(Config::new());
    let query = Message::axfr_query(name("example.com"));
    let mut stream = transfer.begin_stream(query, client).await.unwrap();

    // The offending message's answers still ride on the terminal
    // envelope.
    let envelope = stream.recv().await.unwrap();
    assert_eq!(envelope.records().len(), 1);
    assert!(matches!(envelope.error(), Some(Error::IdMismatch)));
    assert!(stream.recv().await.is_none());
}

#[tokio::test]
async fn axfr_missing_soa() {
    init_logging();

    let (client, server) = tokio::io::duplex(4096);
    tokio::spawn(serve(
        server,
        Config::new(),
        vec![vec![a_record("a.example.com")]],
    ));

    let transfer = Transfer::new(Config::new());
    let query = Message::axfr_query(name("example.com"));
    let mut stream = transfer.begin_stream(query, client).await.unwrap();

    let envelope = stream.recv().await.unwrap();
    assert_eq!(envelope.records().len(), 1);
    assert!(matches!(envelope.error(), Some(Error::MissingSoa)));
    assert!(stream.recv().await.is_none());
}

#[tokio::test]
async fn ixfr_no_changes() {
    init_logging();

    // A single SOA record as the whole response means the client is up
    // to date.
    let (client, server) = tokio::io::duplex(4096);
    tokio::spawn(serve(server, Config::new(), vec![vec![soa(5)]]));

    let transfer = Transfer::new(Config::new());
    let query = Message::ixfr_query(name("example.com"), Serial(5));
    let mut stream = transfer.begin_stream(query, client).await.unwrap();

    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none());
    assert_eq!(envelope.records().len(), 1);
    assert!(stream.recv().await.is_none());
}

#[tokio::test]
async fn ixfr_terminates_on_matching_serial() {
    init_logging();

    // SOA records with other serials inside the diff sequence must not
    // end the transfer; only the server's own serial seen first does.
    let (client, server) = tokio::io::duplex(4096);
    tokio::spawn(serve(
        server,
        Config::new(),
        vec![
            vec![soa(5), a_record("a.example.com")],
            vec![a_record("b.example.com"), soa(3)],
            vec![a_record("c.example.com"), soa(5)],
        ],
    ));

    let transfer = Transfer::new(Config::new());
    let query = Message::ixfr_query(name("example.com"), Serial(3));
    let mut stream = transfer.begin_stream(query, client).await.unwrap();

    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none());
    assert_eq!(envelope.records().len(), 2);
    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none());
    assert_eq!(envelope.records().len(), 2);
    let envelope = stream.recv().await.unwrap();
    assert!(envelope.error().is_none());
    assert_eq!(envelope.records().len(), 2);
    assert!(stream.recv().await.is_none());
}

#[tokio::test]
async fn ixfr_missing_soa() {
    init_logging();

    let (client, server) = tokio::io::duplex(4096);
    tokio::spawn(serve(
        server,
        Config::new(),
        vec![vec![a_record("a.example.com"), a_record("b.example.com")]],
    ));

    let transfer = Transfer::new(Config::new());
    let query = Message::ixfr_query(name("example.com"), Serial(3));
    let mut stream = transfer.begin_stream(query, client).await.unwrap();

    let envelope = stream.recv().await.unwrap();
    assert_eq!(envelope.records().len(), 2);
    assert!(matches!(envelope.error(), Some(Error::MissingSoa)));
    assert!(stream.recv().await.is_none());
}

#[tokio::test]
async fn axfr_tsig_chained() {
    init_logging();

    // Three signed messages: the first verifies over the full TSIG
    // variables, the rest in timers only mode, each chained to the MAC
    // before it.
    let (client, server) = tokio::io::duplex(4096);
    tokio::spawn(serve(
        server,
        tsig_config(),
        vec![
            vec![soa(1)],
            vec![a_record("a.example.com")],
            vec![a_record("b.example.com"), soa(1)],
        ],
    ));

    let transfer = Transfer::new(tsig_config());
    let mut query = Message::axfr_query(name("example.com"));
    query.set_tsig(
        name("tsig-key.example.com"),
        Algorithm::Sha256.to_name(),
        0,
    );
    let mut stream = transfer.begin_stream(query, client).await.unwrap();

    let mut total = 0;
    while let Some(envelope) = stream.recv().await {
        assert!(envelope.error().is_none(), "{:?}", envelope.error());
        total += envelope.records().len();
    }
    assert_eq!(total, 4);
}

#[tokio::test]
async fn tsig_unknown_key() {
    init_logging();

    // The server signs with a key the client has no secret for.
    let (client, server) = tokio::io::duplex(4096);
    let mut server_config = Config::new();
    server_config
        .add_secret(name("other-key.example.com"), "c2VjcmV0IHNlY3JldA==")
        .unwrap();
    tokio::spawn(async move {
        let mut chan =
            Channel::new(StreamConn::new(server), server_config);
        let query = chan.read_msg().await.unwrap();
        let mut reply = query.reply();
        reply.push_answer(soa(1));
        reply.set_tsig(
            name("other-key.example.com"),
            Algorithm::Sha256.to_name(),
            0,
        );
        chan.write_msg(&reply).await.unwrap();
    });

    let transfer = Transfer::new(tsig_config());
    let query = Message::axfr_query(name("example.com"));
    let mut stream = transfer.begin_stream(query, client).await.unwrap();

    let envelope = stream.recv().await.unwrap();
    assert!(matches!(envelope.error(), Some(Error::UnknownKey(_))));
    assert!(stream.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn read_timeout_ends_transfer() {
    init_logging();

    // Keep the server end alive but silent so the read deadline is what
    // ends the transfer.
    let (client, _server) = tokio::io::duplex(4096);
    let transfer = Transfer::new(Config::new());
    let query = Message::axfr_query(name("example.com"));
    let mut stream = transfer.begin_stream(query, client).await.unwrap();

    let envelope = stream.recv().await.unwrap();
    assert!(envelope.records().is_empty());
    match envelope.error() {
        Some(Error::Transport(err)) => {
            assert_eq!(err.kind(), io::ErrorKind::TimedOut)
        }
        other => panic!("expected transport error, got {:?}", other),
    }
    assert!(stream.recv().await.is_none());
}

#[tokio::test]
async fn unsupported_question_is_refused() {
    let (client, _server) = tokio::io::duplex(4096);
    let transfer = Transfer::new(Config::new());
    let query = Message::query(name("example.com"), Rtype::A);
    assert!(matches!(
        transfer.begin_stream(query, client).await,
        Err(Error::UnsupportedQuestion)
    ));
}

#[tokio::test]
async fn dropping_the_stream_cancels() {
    init_logging();

    let (client, server) = tokio::io::duplex(4096);
    let mut server_chan =
        Channel::new(StreamConn::new(server), Config::new());

    let transfer = Transfer::new(Config::new());
    let query = Message::axfr_query(name("example.com"));
    let stream = transfer.begin_stream(query, client).await.unwrap();
    server_chan.read_msg().await.unwrap();

    // Walking away from the stream closes the connection, which the
    // server notices as its next read failing.
    drop(stream);
    assert!(server_chan.read_msg().await.is_err());
}

#[tokio::test]
async fn outbound_accumulates_answers() {
    init_logging();

    let query = Message::axfr_query(name("example.com"));
    let (tx, rx) = mpsc::channel(1);
    let transfer = Transfer::new(Config::new());
    let running = transfer.answer(MockWriter::default(), &query, rx);

    tx.send(Envelope::new(vec![soa(1)])).await.unwrap();
    tx.send(Envelope::new(vec![a_record("a.example.com"), soa(1)]))
        .await
        .unwrap();
    drop(tx);

    let writer = running.join().await.unwrap();
    assert_eq!(writer.sent.len(), 2);
    assert_eq!(writer.sent[0].answer().len(), 1);
    // Replies grow; the second one repeats the records sent so far.
    assert_eq!(writer.sent[1].answer().len(), 3);
    assert_eq!(writer.sent[0].header().id(), query.header().id());
    assert!(writer.sent[0].header().qr());
    assert!(writer.sent[0].header().aa());
    // The engine downgrades the writer once, after the whole answer.
    assert!(writer.timers_only);
    assert_eq!(writer.timers_only_calls, 1);
}

#[tokio::test]
async fn outbound_write_failure_surfaces() {
    init_logging();

    let query = Message::axfr_query(name("example.com"));
    let (tx, rx) = mpsc::channel(1);
    let transfer = Transfer::new(Config::new());
    let running = transfer.answer(FailingWriter, &query, rx);

    tx.send(Envelope::new(vec![soa(1)])).await.unwrap();
    match running.join().await {
        Err(Error::Transport(err)) => {
            assert_eq!(err.kind(), io::ErrorKind::BrokenPipe)
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn channel_round_trip() {
    init_logging();

    let (left, right) = tokio::io::duplex(4096);
    let mut sender = Channel::new(StreamConn::new(left), tsig_config());
    let mut receiver = Channel::new(StreamConn::new(right), tsig_config());

    let mut msg = Message::axfr_query(name("example.com"));
    msg.push_answer(soa(1));
    msg.set_tsig(
        name("tsig-key.example.com"),
        Algorithm::Sha256.to_name(),
        0,
    );
    sender.write_msg(&msg).await.unwrap();
    let received = receiver.read_msg().await.unwrap();
    assert_eq!(received.answer(), msg.answer());
    assert!(received.tsig().is_some());

    // Both ends advanced their chain state, so later messages keep
    // verifying after the switch to timers only signing.
    sender.set_timers_only(true);
    receiver.set_timers_only(true);
    let mut second = msg.clone();
    second.push_answer(a_record("a.example.com"));
    sender.write_msg(&second).await.unwrap();
    let received = receiver.read_msg().await.unwrap();
    assert_eq!(received.answer(), second.answer());
}

//------------ Helper functions ----------------------------------------------

fn init_logging() {
    // Initialize tracing based logging. Override with env var RUST_LOG,
    // e.g. RUST_LOG=trace.
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

/// Serves one transfer query on `stream`, one message per batch.
async fn serve(
    stream: DuplexStream,
    config: Config,
    batches: Vec<Vec<Record>>,
) {
    let mut chan = Channel::new(StreamConn::new(stream), config);
    let query = chan.read_msg().await.unwrap();
    let mut reply = query.reply();
    reply.header_mut().set_aa(true);
    if let Some((key_name, tsig)) = query.tsig() {
        reply.set_tsig(
            key_name.clone(),
            tsig.algorithm().clone(),
            tsig.fudge(),
        );
    }
    for batch in batches {
        let mut msg = reply.clone();
        for record in batch {
            msg.push_answer(record);
        }
        chan.write_msg(&msg).await.unwrap();
        chan.set_timers_only(true);
    }
}

//------------ Test writers --------------------------------------------------

/// A response writer remembering what the engine did with it.
#[derive(Debug, Default)]
struct MockWriter {
    sent: Vec<Message>,
    timers_only: bool,
    timers_only_calls: usize,
}

#[async_trait]
impl ResponseWriter for MockWriter {
    async fn write_msg(&mut self, msg: &Message) -> Result<(), Error> {
        self.sent.push(msg.clone());
        Ok(())
    }

    fn set_timers_only(&mut self, timers_only: bool) {
        self.timers_only = self.timers_only || timers_only;
        self.timers_only_calls += 1;
    }
}

/// A response writer whose connection is always gone.
#[derive(Debug)]
struct FailingWriter;

#[async_trait]
impl ResponseWriter for FailingWriter {
    async fn write_msg(&mut self, _msg: &Message) -> Result<(), Error> {
        Err(Error::Transport(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "peer gone",
        )))
    }

    fn set_timers_only(&mut self, _timers_only: bool) {}
}
