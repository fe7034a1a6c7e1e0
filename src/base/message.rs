//! DNS messages.
//!
//! [`Message`] is an owned, eagerly parsed DNS message. Parsing pulls the
//! whole message apart into its sections up front, which suits a zone
//! transfer engine: every message of a transfer is inspected record by
//! record anyway, and an error anywhere in the message must abort the
//! transfer rather than surface halfway through iteration.

use super::header::Header;
use super::iana::{Class, Opcode, Rtype, TsigRcode};
use super::name::Name;
use super::question::Question;
use super::rdata::{RecordData, Soa, Time48, Tsig};
use super::record::Record;
use super::serial::Serial;
use super::wire::{ParseError, Parser};
use bytes::{BufMut, Bytes, BytesMut};

//------------ Message -------------------------------------------------------

/// A DNS message.
///
/// The section counts of the wire format are not stored; they are derived
/// from the section vectors when composing and checked when parsing.
#[derive(Clone, Debug, Default)]
pub struct Message {
    /// The id and flags part of the header.
    header: Header,

    /// The question section.
    question: Vec<Question>,

    /// The answer section.
    answer: Vec<Record>,

    /// The authority section.
    authority: Vec<Record>,

    /// The additional section.
    additional: Vec<Record>,
}

impl Message {
    /// Creates an empty message.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a query for the given name and record type.
    ///
    /// The message gets a random id, the QUERY opcode, and a single
    /// question with the IN class.
    pub fn query(qname: Name, qtype: Rtype) -> Self {
        let mut res = Message::new();
        res.header.set_random_id();
        res.header.set_opcode(Opcode::QUERY);
        res.push_question(Question::new(qname, qtype, Class::IN));
        res
    }

    /// Creates a query requesting a full transfer of `zone`.
    pub fn axfr_query(zone: Name) -> Self {
        Self::query(zone, Rtype::AXFR)
    }

    /// Creates a query requesting the changes to `zone` since `serial`.
    ///
    /// The serial the client knows rides along in a SOA record in the
    /// authority section; all its other fields are zero.
    pub fn ixfr_query(zone: Name, serial: Serial) -> Self {
        let mut res = Self::query(zone.clone(), Rtype::IXFR);
        res.push_authority(Record::new(
            zone,
            Rtype::SOA,
            Class::IN,
            0,
            RecordData::Soa(Soa::new(
                Name::root(),
                Name::root(),
                serial,
                0,
                0,
                0,
                0,
            )),
        ));
        res
    }

    /// Creates a response to this message.
    ///
    /// The reply copies the id and opcode, sets the response flag, and
    /// echoes the question section. All its other sections are empty.
    pub fn reply(&self) -> Self {
        let mut res = Message::new();
        res.header.set_id(self.header.id());
        res.header.set_qr(true);
        res.header.set_opcode(self.header.opcode());
        res.question = self.question.clone();
        res
    }

    /// Returns a reference to the header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to the header.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the question of the message if there is exactly one.
    pub fn sole_question(&self) -> Option<&Question> {
        if self.question.len() == 1 {
            self.question.first()
        } else {
            None
        }
    }

    /// Returns the question section.
    pub fn question(&self) -> &[Question] {
        &self.question
    }

    /// Appends a question to the question section.
    pub fn push_question(&mut self, question: Question) {
        self.question.push(question)
    }

    /// Returns the answer section.
    pub fn answer(&self) -> &[Record] {
        &self.answer
    }

    /// Returns a mutable reference to the answer section.
    pub fn answer_mut(&mut self) -> &mut Vec<Record> {
        &mut self.answer
    }

    /// Converts the message into its answer section.
    pub fn into_answer(self) -> Vec<Record> {
        self.answer
    }

    /// Appends a record to the answer section.
    pub fn push_answer(&mut self, record: Record) {
        self.answer.push(record)
    }

    /// Returns the authority section.
    pub fn authority(&self) -> &[Record] {
        &self.authority
    }

    /// Appends a record to the authority section.
    pub fn push_authority(&mut self, record: Record) {
        self.authority.push(record)
    }

    /// Returns the additional section.
    pub fn additional(&self) -> &[Record] {
        &self.additional
    }

    /// Appends a record to the additional section.
    pub fn push_additional(&mut self, record: Record) {
        self.additional.push(record)
    }

    /// Appends an unsigned TSIG record to the message.
    ///
    /// The record becomes the last record of the additional section, the
    /// place [RFC 2845] requires, with an empty MAC and a zero time. An
    /// authenticated channel replaces it with the real signature when the
    /// message is written; a zero time signed means "the time of signing"
    /// and a zero fudge the default of 300 seconds.
    ///
    /// [RFC 2845]: https://tools.ietf.org/html/rfc2845
    pub fn set_tsig(&mut self, key_name: Name, algorithm: Name, fudge: u16) {
        self.push_additional(Record::new(
            key_name,
            Rtype::TSIG,
            Class::ANY,
            0,
            RecordData::Tsig(Tsig::new(
                algorithm,
                Time48::default(),
                fudge,
                Bytes::new(),
                0,
                TsigRcode::NOERROR,
                Bytes::new(),
            )),
        ));
    }

    /// Returns the key name and TSIG data if the message carries a TSIG.
    ///
    /// Only the last record of the additional section counts; a TSIG
    /// anywhere else makes the message malformed per [RFC 2845] and is
    /// ignored here.
    ///
    /// [RFC 2845]: https://tools.ietf.org/html/rfc2845
    pub fn tsig(&self) -> Option<(&Name, &Tsig)> {
        let record = self.additional.last()?;
        record.as_tsig().map(|tsig| (record.owner(), tsig))
    }

    /// Removes and returns the TSIG record if the message carries one.
    pub fn take_tsig(&mut self) -> Option<Record> {
        if self.tsig().is_some() {
            self.additional.pop()
        } else {
            None
        }
    }

    /// Parses a message from its wire format.
    pub fn from_octets(octets: &[u8]) -> Result<Self, ParseError> {
        let mut parser = Parser::from_octets(octets);
        let header = Header::parse(&mut parser)?;
        let qdcount = parser.parse_u16_be()?;
        let ancount = parser.parse_u16_be()?;
        let nscount = parser.parse_u16_be()?;
        let arcount = parser.parse_u16_be()?;
        let mut question = Vec::with_capacity(qdcount.into());
        for _ in 0..qdcount {
            question.push(Question::parse(&mut parser)?);
        }
        let answer = Self::parse_records(&mut parser, ancount)?;
        let authority = Self::parse_records(&mut parser, nscount)?;
        let additional = Self::parse_records(&mut parser, arcount)?;
        if parser.remaining() != 0 {
            return Err(ParseError::form_error("trailing data in message"));
        }
        Ok(Message {
            header,
            question,
            answer,
            authority,
            additional,
        })
    }

    /// Parses `count` records.
    fn parse_records(
        parser: &mut Parser,
        count: u16,
    ) -> Result<Vec<Record>, ParseError> {
        let mut res = Vec::with_capacity(count.into());
        for _ in 0..count {
            res.push(Record::parse(parser)?);
        }
        Ok(res)
    }

    /// Composes the wire format of the message.
    pub fn to_octets(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(512);
        self.header.compose(&mut buf);
        debug_assert!(self.question.len() <= usize::from(u16::MAX));
        debug_assert!(self.answer.len() <= usize::from(u16::MAX));
        debug_assert!(self.authority.len() <= usize::from(u16::MAX));
        debug_assert!(self.additional.len() <= usize::from(u16::MAX));
        buf.put_u16(self.question.len() as u16);
        buf.put_u16(self.answer.len() as u16);
        buf.put_u16(self.authority.len() as u16);
        buf.put_u16(self.additional.len() as u16);
        for question in &self.question {
            question.compose(&mut buf);
        }
        for record in self
            .answer
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
        {
            record.compose(&mut buf);
        }
        buf.freeze()
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn soa_record(serial: u32) -> Record {
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

    #[test]
    fn axfr_query() {
        let query = Message::axfr_query(name("example.com"));
        let question = query.sole_question().unwrap();
        assert_eq!(question.qtype(), Rtype::AXFR);
        assert_eq!(question.qclass(), Class::IN);
        assert_eq!(question.qname(), &name("example.com"));
        assert!(!query.header().qr());
    }

    #[test]
    fn ixfr_query_carries_serial() {
        let query = Message::ixfr_query(name("example.com"), Serial(12));
        assert_eq!(query.sole_question().unwrap().qtype(), Rtype::IXFR);
        let soa = query.authority()[0].as_soa().unwrap();
        assert_eq!(soa.serial(), Serial(12));
    }

    #[test]
    fn reply_echoes_query() {
        let query = Message::axfr_query(name("example.com"));
        let reply = query.reply();
        assert_eq!(reply.header().id(), query.header().id());
        assert!(reply.header().qr());
        assert_eq!(reply.question(), query.question());
        assert!(reply.answer().is_empty());
    }

    #[test]
    fn round_trip() {
        let mut msg = Message::axfr_query(name("example.com"));
        msg.push_answer(soa_record(1));
        msg.push_answer(Record::new(
            name("www.example.com"),
            Rtype::A,
            Class::IN,
            300,
            RecordData::Other(Bytes::from_static(&[192, 0, 2, 1])),
        ));
        msg.push_answer(soa_record(1));
        let octets = msg.to_octets();
        let parsed = Message::from_octets(&octets).unwrap();
        assert_eq!(parsed.header().id(), msg.header().id());
        assert_eq!(parsed.question(), msg.question());
        assert_eq!(parsed.answer(), msg.answer());
    }

    #[test]
    fn trailing_data_is_an_error() {
        let mut octets = Message::axfr_query(name("example.com"))
            .to_octets()
            .to_vec();
        octets.push(0);
        assert!(matches!(
            Message::from_octets(&octets),
            Err(ParseError::Form(_))
        ));
    }

    #[test]
    fn tsig_is_last_additional_record() {
        let mut msg = Message::axfr_query(name("example.com"));
        assert!(msg.tsig().is_none());
        msg.set_tsig(name("key.example.com"), name("hmac-sha256"), 300);
        let (key_name, tsig) = msg.tsig().unwrap();
        assert_eq!(key_name, &name("key.example.com"));
        assert_eq!(tsig.fudge(), 300);
        assert_eq!(tsig.mac().len(), 0);

        // A record appended after the TSIG hides it.
        msg.push_additional(Record::new(
            name("example.com"),
            Rtype::A,
            Class::IN,
            0,
            RecordData::Other(Bytes::from_static(&[192, 0, 2, 1])),
        ));
        assert!(msg.tsig().is_none());
    }

    #[test]
    fn take_tsig_removes_the_record() {
        let mut msg = Message::axfr_query(name("example.com"));
        msg.set_tsig(name("key.example.com"), name("hmac-sha256"), 300);
        assert!(msg.take_tsig().is_some());
        assert!(msg.tsig().is_none());
        assert!(msg.additional().is_empty());
        assert!(msg.take_tsig().is_none());
    }
}
