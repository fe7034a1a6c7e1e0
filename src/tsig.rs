//! TSIG message authentication.
//!
//! TSIG, defined in [RFC 2845], provides a simple means for two parties
//! that share a secret key to authenticate DNS messages exchanged between
//! them. Each signed message carries a final additional record of type
//! TSIG holding a HMAC over the message content and a few extra values.
//!
//! Zone transfers sign whole sequences of messages. The MAC of each
//! message is mixed into the digest of the next one, so a verified message
//! also proves that the sequence before it arrived unchanged and complete.
//! After the first message of a response sequence, the digested TSIG
//! variables shrink to just the time signed and the fudge.
//!
//! The functions here operate on one message at a time and take the MAC
//! of the previous message as an argument. [`generate`] signs a message
//! that carries an unsigned TSIG stub and [`verify`] checks a received
//! message. Both return the MAC to chain into the next call. The
//! [`Channel`][crate::net::xfr::Channel] type keeps that chain state for
//! a whole connection.
//!
//! This implementation supports the HMAC-SHA1, HMAC-SHA256, HMAC-SHA384,
//! and HMAC-SHA512 algorithms defined in [RFC 4635].
//!
//! [RFC 2845]: https://tools.ietf.org/html/rfc2845
//! [RFC 4635]: https://tools.ietf.org/html/rfc4635

use crate::base::iana::{Class, Rtype, TsigRcode};
use crate::base::message::Message;
use crate::base::name::Name;
use crate::base::question::Question;
use crate::base::rdata::{RecordData, Time48, Tsig};
use crate::base::record::Record;
use crate::base::wire::{ParseError, Parser};
use bytes::{Bytes, BytesMut};
use ring::{constant_time, hmac};
use std::{error, fmt, str};

//------------ Constants -----------------------------------------------------

/// The fudge value used when a TSIG stub leaves it at zero.
///
/// This is the value [RFC 2845] recommends.
///
/// [RFC 2845]: https://tools.ietf.org/html/rfc2845
pub const DEFAULT_FUDGE: u16 = 300;

//------------ generate ------------------------------------------------------

/// Signs a message with the given secret.
///
/// The message must carry an unsigned TSIG stub as its last additional
/// record, normally placed there via
/// [`Message::set_tsig`][crate::base::Message::set_tsig]. The stub names
/// the key and algorithm; a zero time signed is replaced with `now` and a
/// zero fudge with [`DEFAULT_FUDGE`].
///
/// If `prior_mac` is not empty, it is digested before the message content,
/// chaining this signature to the previous message of the exchange. If
/// `timers_only` is set, only the time signed and fudge are digested
/// instead of the full TSIG variables, the form [RFC 2845] prescribes for
/// all but the first message of a response sequence.
///
/// Returns the wire format of the signed message and the MAC to chain
/// into the next message.
///
/// [RFC 2845]: https://tools.ietf.org/html/rfc2845
pub fn generate(
    msg: &Message,
    secret: &[u8],
    prior_mac: &[u8],
    timers_only: bool,
    now: Time48,
) -> Result<(Bytes, Bytes), TsigError> {
    let (key_name, stub) = match msg.tsig() {
        Some((key_name, stub)) => (key_name.clone(), stub.clone()),
        None => return Err(TsigError::Unsigned),
    };
    let algorithm =
        Algorithm::from_name(stub.algorithm()).ok_or(TsigError::BadAlg)?;
    let time_signed = if stub.time_signed() == Time48::default() {
        now
    } else {
        stub.time_signed()
    };
    let fudge = if stub.fudge() == 0 {
        DEFAULT_FUDGE
    } else {
        stub.fudge()
    };

    let mut signed = msg.clone();
    signed.take_tsig();
    let unsigned = signed.to_octets();

    let key = hmac::Key::new(algorithm.into_hmac_algorithm(), secret);
    let mut context = hmac::Context::with_key(&key);
    if !prior_mac.is_empty() {
        context.update(&(prior_mac.len() as u16).to_be_bytes());
        context.update(prior_mac);
    }
    context.update(&unsigned);
    update_variables(
        &mut context,
        &key_name,
        algorithm,
        time_signed,
        fudge,
        stub.error(),
        stub.other(),
        timers_only,
    );
    let mac = Bytes::copy_from_slice(context.sign().as_ref());

    signed.push_additional(Record::new(
        key_name,
        Rtype::TSIG,
        Class::ANY,
        0,
        RecordData::Tsig(Tsig::new(
            algorithm.to_name(),
            time_signed,
            fudge,
            mac.clone(),
            msg.header().id(),
            stub.error(),
            stub.other().clone(),
        )),
    ));
    Ok((signed.to_octets(), mac))
}

//------------ verify --------------------------------------------------------

/// Verifies the TSIG signature of a received message.
///
/// The function works on the raw wire format since the digest covers the
/// message exactly as it was signed, before the TSIG record was appended
/// and possibly with a different id than it arrived with. The message is
/// truncated at the TSIG record, the additional count decremented, and
/// the id replaced with the original id recorded in the TSIG data.
///
/// `prior_mac` and `timers_only` must mirror the state of the signer as
/// described for [`generate`]. The signature is checked before the time,
/// as [RFC 2845] requires. Returns the received MAC to chain into the
/// next message.
///
/// [RFC 2845]: https://tools.ietf.org/html/rfc2845
pub fn verify(
    octets: &[u8],
    secret: &[u8],
    prior_mac: &[u8],
    timers_only: bool,
    now: Time48,
) -> Result<Bytes, TsigError> {
    let (start, record) = match find_tsig(octets)? {
        Some(found) => found,
        None => return Err(TsigError::Unsigned),
    };
    let tsig = match record.data() {
        RecordData::Tsig(tsig) => tsig,
        _ => return Err(TsigError::Unsigned),
    };
    let algorithm =
        Algorithm::from_name(tsig.algorithm()).ok_or(TsigError::BadAlg)?;

    // Reconstruct the message as it was when it was signed.
    let mut unsigned = BytesMut::from(&octets[..start]);
    unsigned[0..2].copy_from_slice(&tsig.original_id().to_be_bytes());
    let arcount = u16::from_be_bytes([octets[10], octets[11]]);
    unsigned[10..12].copy_from_slice(&(arcount - 1).to_be_bytes());

    let key = hmac::Key::new(algorithm.into_hmac_algorithm(), secret);
    let mut context = hmac::Context::with_key(&key);
    if !prior_mac.is_empty() {
        context.update(&(prior_mac.len() as u16).to_be_bytes());
        context.update(prior_mac);
    }
    context.update(&unsigned);
    update_variables(
        &mut context,
        record.owner(),
        algorithm,
        tsig.time_signed(),
        tsig.fudge(),
        tsig.error(),
        tsig.other(),
        timers_only,
    );
    constant_time::verify_slices_are_equal(
        context.sign().as_ref(),
        tsig.mac(),
    )
    .map_err(|_| TsigError::BadSig)?;
    if !tsig.time_signed().eq_fudged(now, tsig.fudge().into()) {
        return Err(TsigError::BadTime);
    }
    Ok(tsig.mac().clone())
}

//------------ Helper Functions ----------------------------------------------

/// Finds the TSIG record of a message in its wire format.
///
/// Returns the position the record starts at and the record itself if the
/// last record of the additional section is of type TSIG, or `None` if the
/// message is unsigned.
fn find_tsig(octets: &[u8]) -> Result<Option<(usize, Record)>, TsigError> {
    let mut parser = Parser::from_octets(octets);
    parser.advance(4)?;
    let qdcount = parser.parse_u16_be()?;
    let ancount = parser.parse_u16_be()?;
    let nscount = parser.parse_u16_be()?;
    let arcount = parser.parse_u16_be()?;
    for _ in 0..qdcount {
        Question::parse(&mut parser)?;
    }
    for _ in 0..u32::from(ancount) + u32::from(nscount) {
        Record::parse(&mut parser)?;
    }
    let mut last = None;
    for _ in 0..arcount {
        let start = parser.pos();
        let record = Record::parse(&mut parser)?;
        last = Some((start, record));
    }
    Ok(last.filter(|(_, record)| record.rtype() == Rtype::TSIG))
}

/// Digests the TSIG variables.
///
/// With `timers_only`, only the time signed and fudge are digested.
/// Otherwise the full variables defined in [RFC 2845] go in: the key
/// name and algorithm name in canonical form, the fixed class and TTL,
/// the timers, and the error and other data fields.
///
/// [RFC 2845]: https://tools.ietf.org/html/rfc2845
#[allow(clippy::too_many_arguments)]
fn update_variables(
    context: &mut hmac::Context,
    key_name: &Name,
    algorithm: Algorithm,
    time_signed: Time48,
    fudge: u16,
    error: TsigRcode,
    other: &Bytes,
    timers_only: bool,
) {
    if !timers_only {
        let mut name = BytesMut::new();
        key_name.compose_canonical(&mut name);
        context.update(&name);
        context.update(&Class::ANY.to_int().to_be_bytes());
        context.update(&0u32.to_be_bytes());
        context.update(algorithm.into_wire_slice());
    }
    context.update(&time_signed.into_octets());
    context.update(&fudge.to_be_bytes());
    if !timers_only {
        context.update(&error.to_int().to_be_bytes());
        debug_assert!(other.len() <= usize::from(u16::MAX));
        context.update(&(other.len() as u16).to_be_bytes());
        context.update(other);
    }
}

//------------ Algorithm -----------------------------------------------------

/// The supported TSIG algorithms.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Algorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    /// Creates a value from its domain name representation.
    ///
    /// Returns `None` if the name doesn't represent a known algorithm.
    pub fn from_name(name: &Name) -> Option<Self> {
        let mut labels = name.iter_labels();
        let first = labels.next()?;
        if labels.next().is_some() {
            return None;
        }
        if first.eq_ignore_ascii_case(b"hmac-sha1") {
            Some(Algorithm::Sha1)
        } else if first.eq_ignore_ascii_case(b"hmac-sha256") {
            Some(Algorithm::Sha256)
        } else if first.eq_ignore_ascii_case(b"hmac-sha384") {
            Some(Algorithm::Sha384)
        } else if first.eq_ignore_ascii_case(b"hmac-sha512") {
            Some(Algorithm::Sha512)
        } else {
            None
        }
    }

    /// Returns the ring HMAC algorithm for this TSIG algorithm.
    fn into_hmac_algorithm(self) -> hmac::Algorithm {
        match self {
            Algorithm::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            Algorithm::Sha256 => hmac::HMAC_SHA256,
            Algorithm::Sha384 => hmac::HMAC_SHA384,
            Algorithm::Sha512 => hmac::HMAC_SHA512,
        }
    }

    /// Returns an octets slice with the wire-format domain name for this
    /// value.
    fn into_wire_slice(self) -> &'static [u8] {
        match self {
            Algorithm::Sha1 => b"\x09hmac-sha1\0",
            Algorithm::Sha256 => b"\x0Bhmac-sha256\0",
            Algorithm::Sha384 => b"\x0Bhmac-sha384\0",
            Algorithm::Sha512 => b"\x0Bhmac-sha512\0",
        }
    }

    /// Returns a domain name for this value.
    pub fn to_name(self) -> Name {
        Name::from_wire_unchecked(Bytes::from_static(self.into_wire_slice()))
    }
}

//--- FromStr

impl str::FromStr for Algorithm {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hmac-sha1" => Ok(Algorithm::Sha1),
            "hmac-sha256" => Ok(Algorithm::Sha256),
            "hmac-sha384" => Ok(Algorithm::Sha384),
            "hmac-sha512" => Ok(Algorithm::Sha512),
            _ => Err(AlgorithmError),
        }
    }
}

//--- Display

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Algorithm::Sha1 => "hmac-sha1",
            Algorithm::Sha256 => "hmac-sha256",
            Algorithm::Sha384 => "hmac-sha384",
            Algorithm::Sha512 => "hmac-sha512",
        })
    }
}

//============ Error Types ===================================================

//------------ TsigError -----------------------------------------------------

/// A TSIG record of a received message couldn't be validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TsigError {
    /// The message does not carry a TSIG record.
    Unsigned,

    /// The TSIG record uses an unsupported algorithm.
    BadAlg,

    /// The MAC of the TSIG record does not match the message.
    BadSig,

    /// The time signed is too far off the local time.
    BadTime,

    /// The message is not correctly formatted.
    FormErr,
}

//--- From

impl From<ParseError> for TsigError {
    fn from(_: ParseError) -> Self {
        TsigError::FormErr
    }
}

//--- Display and Error

impl fmt::Display for TsigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TsigError::Unsigned => f.write_str("message is not signed"),
            TsigError::BadAlg => f.write_str("unknown algorithm"),
            TsigError::BadSig => f.write_str("bad signature"),
            TsigError::BadTime => f.write_str("bad time"),
            TsigError::FormErr => f.write_str("malformed message"),
        }
    }
}

impl error::Error for TsigError {}

//------------ AlgorithmError ------------------------------------------------

/// A string does not name a supported TSIG algorithm.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AlgorithmError;

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unknown algorithm")
    }
}

impl error::Error for AlgorithmError {}

//============ Tests =========================================================
