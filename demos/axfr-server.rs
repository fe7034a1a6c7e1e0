//! A zone transfer server.
//!
//! Serves a small built-in zone over AXFR to anyone who asks. Passing a
//! TSIG key makes the server sign responses to signed queries; unsigned
//! queries keep working.

use std::str::FromStr;
use std::vec::Vec;

use bytes::Bytes;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use zonexfr::base::{Class, Name, Record, RecordData, Rtype, Serial, Soa};
use zonexfr::net::conn::StreamConn;
use zonexfr::net::xfr::{
    Channel, Config, Envelope, Error, StreamResponseWriter, Transfer,
};

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 || args.len() > 4 {
        eprintln!(
            "Usage: {} <listen addr:port> <zone name> \
             [<key name>:<base64 secret>]",
            args[0]
        );
        eprintln!("E.g.:  {} 127.0.0.1:8053 example.com", args[0]);
        std::process::exit(1);
    }

    let zone = Name::from_str(&args[2]).unwrap();
    let mut config = Config::new();
    if let Some(arg) = args.get(3) {
        let (name, secret) = arg.split_once(':').unwrap();
        config
            .add_secret(Name::from_str(name).unwrap(), secret)
            .unwrap();
    }

    let listener = TcpListener::bind(&args[1]).await.unwrap();
    eprintln!("Serving zone {} on {}", zone, args[1]);

    loop {
        let (stream, peer) = listener.accept().await.unwrap();
        let zone = zone.clone();
        let config = config.clone();
        tokio::spawn(async move {
            match serve(stream, zone, config).await {
                Ok(count) => {
                    eprintln!("Sent {count} records to {peer}")
                }
                Err(err) => {
                    eprintln!("Transfer to {peer} failed: {err}")
                }
            }
        });
    }
}

/// Answers one transfer query on a fresh connection.
async fn serve(
    stream: TcpStream,
    zone: Name,
    config: Config,
) -> Result<usize, Error> {
    let mut chan = Channel::new(StreamConn::new(stream), config.clone());
    let query = chan.read_msg().await?;

    let records = zone_records(&zone);
    let count = records.len();

    let transfer = Transfer::new(config);
    let (tx, rx) = mpsc::channel(1);
    let running =
        transfer.answer(StreamResponseWriter::new(chan), &query, rx);
    let _ = tx.send(Envelope::new(records)).await;
    drop(tx);
    running.join().await?;
    Ok(count)
}

/// Returns the records of the built-in zone, SOA first and last.
fn zone_records(zone: &Name) -> Vec<Record> {
    let soa = Record::new(
        zone.clone(),
        Rtype::SOA,
        Class::IN,
        3600,
        RecordData::Soa(Soa::new(
            child(zone, "ns"),
            child(zone, "hostmaster"),
            Serial(2020080302),
            10800,
            3600,
            604800,
            3600,
        )),
    );
    let mut records = vec![soa.clone()];
    for host in ["ns", "www", "mail"] {
        records.push(Record::new(
            child(zone, host),
            Rtype::A,
            Class::IN,
            300,
            RecordData::Other(Bytes::from_static(&[192, 0, 2, 1])),
        ));
    }
    records.push(soa);
    records
}

fn child(zone: &Name, label: &str) -> Name {
    Name::from_str(&format!("{label}.{zone}")).unwrap()
}
