//! A single question of a DNS message.

use super::iana::{Class, Rtype};
use super::name::Name;
use super::wire::{ParseError, Parser};
use bytes::BufMut;
use std::fmt;

//------------ Question ------------------------------------------------------

/// A question of a DNS message.
///
/// A question carries the name, type, and class a query asks about. Zone
/// transfer queries use the requested zone's apex as the name and AXFR or
/// IXFR as the type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Question {
    /// The name of the question.
    qname: Name,

    /// The record type of the question.
    qtype: Rtype,

    /// The class of the question.
    qclass: Class,
}

impl Question {
    /// Creates a new question from its components.
    pub fn new(qname: Name, qtype: Rtype, qclass: Class) -> Self {
        Question {
            qname,
            qtype,
            qclass,
        }
    }

    /// Returns the name of the question.
    pub fn qname(&self) -> &Name {
        &self.qname
    }

    /// Returns the record type of the question.
    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    /// Returns the class of the question.
    pub fn qclass(&self) -> Class {
        self.qclass
    }

    /// Parses a question from the beginning of `parser`.
    pub fn parse(parser: &mut Parser) -> Result<Self, ParseError> {
        Ok(Question {
            qname: Name::parse(parser)?,
            qtype: Rtype::from_int(parser.parse_u16_be()?),
            qclass: Class::from_int(parser.parse_u16_be()?),
        })
    }

    /// Appends the wire format of the question to `buf`.
    pub fn compose<B: BufMut>(&self, buf: &mut B) {
        self.qname.compose(buf);
        buf.put_u16(self.qtype.to_int());
        buf.put_u16(self.qclass.to_int());
    }
}

//--- Display

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.qname, self.qclass, self.qtype)
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parse_and_compose() {
        let question = Question::new(
            Name::from_str("example.com").unwrap(),
            Rtype::AXFR,
            Class::IN,
        );
        let mut buf = bytes::BytesMut::new();
        question.compose(&mut buf);
        let mut parser = Parser::from_octets(&buf);
        assert_eq!(Question::parse(&mut parser).unwrap(), question);
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn display() {
        let question = Question::new(
            Name::from_str("example.com").unwrap(),
            Rtype::IXFR,
            Class::IN,
        );
        assert_eq!(format!("{}", question), "example.com. IN IXFR");
    }
}
