//! A zone transfer client.
//!
//! Requests a transfer from a server and prints the records received.
//! Passing a serial number turns the request into an IXFR, passing a
//! TSIG key signs the exchange.

use std::net::SocketAddr;
use std::str::FromStr;
use std::vec::Vec;

use zonexfr::base::{Message, Name, Serial};
use zonexfr::net::xfr::{Config, Transfer};
use zonexfr::tsig::Algorithm;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 || args.len() > 5 {
        eprintln!(
            "Usage: {} <ip addr:port> <zone name> [<SOA serial>] \
             [<key name>:<base64 secret>]",
            args[0]
        );
        eprintln!("E.g.:  {} 127.0.0.1:8053 example.com 2020080302", args[0]);
        std::process::exit(1);
    }

    let addr: SocketAddr = args[1].parse().unwrap();
    let zone = Name::from_str(&args[2]).unwrap();
    let mut serial = None;
    let mut key = None;
    for arg in &args[3..] {
        match arg.split_once(':') {
            Some((name, secret)) => {
                key = Some((name.to_string(), secret.to_string()))
            }
            None => serial = Some(arg.parse::<u32>().unwrap()),
        }
    }

    let mut query = match serial {
        Some(serial) => {
            eprintln!(
                "Requesting IXFR from {} for zone {} from serial {}",
                addr, zone, serial
            );
            Message::ixfr_query(zone, Serial(serial))
        }
        None => {
            eprintln!("Requesting AXFR from {} for zone {}", addr, zone);
            Message::axfr_query(zone)
        }
    };

    let mut config = Config::new();
    if let Some((name, secret)) = key {
        let key_name = Name::from_str(&name).unwrap();
        config.add_secret(key_name.clone(), &secret).unwrap();
        query.set_tsig(key_name, Algorithm::Sha256.to_name(), 0);
    }

    let transfer = Transfer::new(config);
    let mut stream = transfer.begin(query, addr).await.unwrap();

    let mut total = 0;
    while let Some(envelope) = stream.recv().await {
        if let Some(err) = envelope.error() {
            eprintln!("Transfer failed: {err}");
            std::process::exit(1);
        }
        for record in envelope.records() {
            println!("{record}");
        }
        total += envelope.records().len();
    }
    eprintln!("Received {total} records");
}
