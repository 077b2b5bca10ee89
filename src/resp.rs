//! RESP2 framing for the client side of the connection.
//!
//! Commands go out as arrays of bulk strings; replies come back as any of
//! the five RESP2 types. Decoding works on a borrowed slice and only
//! consumes from the read buffer once a whole reply is available.

use bytes::{Buf, BufMut, BytesMut};

const MAX_BULK_LEN: usize = 512 * 1024 * 1024;
const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// A RESP2 value.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    /// `None` is the null bulk string, `$-1`.
    BulkString(Option<Vec<u8>>),
    /// `None` is the null array, `*-1`.
    Array(Option<Vec<RespValue>>),
}

impl RespValue {
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    pub fn simple_string(s: impl Into<String>) -> Self {
        RespValue::SimpleString(s.into())
    }

    pub fn error(s: impl Into<String>) -> Self {
        RespValue::Error(s.into())
    }

    pub fn integer(n: i64) -> Self {
        RespValue::Integer(n)
    }

    pub fn bulk_string(data: impl Into<Vec<u8>>) -> Self {
        RespValue::BulkString(Some(data.into()))
    }

    pub fn null_bulk_string() -> Self {
        RespValue::BulkString(None)
    }

    pub fn null_array() -> Self {
        RespValue::Array(None)
    }

    pub fn array(items: Vec<RespValue>) -> Self {
        RespValue::Array(Some(items))
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    /// Append the wire form of this value to `out`.
    pub fn encode(&self, out: &mut impl BufMut) {
        match self {
            RespValue::SimpleString(s) => line(out, b'+', s.as_bytes()),
            RespValue::Error(s) => line(out, b'-', s.as_bytes()),
            RespValue::Integer(n) => line(out, b':', n.to_string().as_bytes()),
            RespValue::BulkString(None) => out.put_slice(b"$-1\r\n"),
            RespValue::BulkString(Some(data)) => {
                line(out, b'$', data.len().to_string().as_bytes());
                out.put_slice(data);
                out.put_slice(b"\r\n");
            }
            RespValue::Array(None) => out.put_slice(b"*-1\r\n"),
            RespValue::Array(Some(items)) => {
                line(out, b'*', items.len().to_string().as_bytes());
                for item in items {
                    item.encode(out);
                }
            }
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RespValue::BulkString(Some(data)) => Some(data),
            RespValue::SimpleString(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn to_string_lossy(&self) -> Option<String> {
        self.as_bytes()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RespValue::BulkString(None) | RespValue::Array(None))
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, RespValue::SimpleString(s) if s == "OK")
    }
}

fn line(out: &mut impl BufMut, prefix: u8, body: &[u8]) {
    out.put_u8(prefix);
    out.put_slice(body);
    out.put_slice(b"\r\n");
}

/// Incremental reply decoder over a connection's read buffer.
pub struct RespParser;

impl RespParser {
    /// Take one complete reply off the front of `buf`. Returns `Ok(None)`
    /// and leaves `buf` untouched while the reply is still incomplete.
    pub fn parse(buf: &mut BytesMut) -> Result<Option<RespValue>, RespError> {
        match decode(buf, 0)? {
            Some((value, consumed)) => {
                buf.advance(consumed);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

/// Decode the value starting at `pos`, returning it with the offset just
/// past its end.
fn decode(buf: &[u8], pos: usize) -> Result<Option<(RespValue, usize)>, RespError> {
    let Some(&prefix) = buf.get(pos) else {
        return Ok(None);
    };
    let Some((header, mut next)) = read_line(buf, pos + 1) else {
        return Ok(None);
    };
    let value = match prefix {
        b'+' => RespValue::SimpleString(String::from_utf8_lossy(header).into_owned()),
        b'-' => RespValue::Error(String::from_utf8_lossy(header).into_owned()),
        b':' => RespValue::Integer(parse_int(header)?),
        b'$' => match parse_len(header, MAX_BULK_LEN)? {
            None => RespValue::BulkString(None),
            Some(len) => {
                let end = next + len;
                if buf.len() < end + 2 {
                    return Ok(None);
                }
                if &buf[end..end + 2] != b"\r\n" {
                    return Err(RespError::MissingTerminator);
                }
                let data = buf[next..end].to_vec();
                next = end + 2;
                RespValue::BulkString(Some(data))
            }
        },
        b'*' => match parse_len(header, MAX_ARRAY_LEN)? {
            None => RespValue::Array(None),
            Some(len) => {
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    let Some((item, after)) = decode(buf, next)? else {
                        return Ok(None);
                    };
                    items.push(item);
                    next = after;
                }
                RespValue::Array(Some(items))
            }
        },
        other => return Err(RespError::UnknownPrefix(other)),
    };
    Ok(Some((value, next)))
}

/// The bytes between `start` and the next CRLF, and the offset after it.
fn read_line(buf: &[u8], start: usize) -> Option<(&[u8], usize)> {
    let rest = buf.get(start..)?;
    let end = rest.windows(2).position(|w| w == b"\r\n")?;
    Some((&rest[..end], start + end + 2))
}

fn parse_int(raw: &[u8]) -> Result<i64, RespError> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| RespError::BadInteger(String::from_utf8_lossy(raw).into_owned()))
}

/// A length header: `-1` means null, anything else must be within `max`.
fn parse_len(raw: &[u8], max: usize) -> Result<Option<usize>, RespError> {
    match parse_int(raw)? {
        -1 => Ok(None),
        n if n >= 0 && n as usize <= max => Ok(Some(n as usize)),
        n => Err(RespError::BadLength(n)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RespError {
    #[error("unexpected RESP type byte '{}'", *.0 as char)]
    UnknownPrefix(u8),

    #[error("invalid integer {0:?}")]
    BadInteger(String),

    #[error("invalid length {0}")]
    BadLength(i64),

    #[error("bulk string not terminated by CRLF")]
    MissingTerminator,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(raw: &[u8]) -> Vec<RespValue> {
        let mut buf = BytesMut::from(raw);
        let mut values = Vec::new();
        while let Some(value) = RespParser::parse(&mut buf).unwrap() {
            values.push(value);
        }
        assert!(buf.is_empty(), "trailing bytes: {buf:?}");
        values
    }

    #[test]
    fn test_status_and_error_replies() {
        let values = parse_all(b"+OK\r\n-WRONGTYPE Operation against a key\r\n:-42\r\n");
        assert!(values[0].is_ok());
        assert_eq!(
            values[1],
            RespValue::error("WRONGTYPE Operation against a key")
        );
        assert_eq!(values[2], RespValue::integer(-42));
    }

    #[test]
    fn test_bulk_replies() {
        let values = parse_all(b"$4\r\n\xde\xad\xbe\xef\r\n$-1\r\n$0\r\n\r\n");
        assert_eq!(values[0].as_bytes(), Some(&[0xde, 0xad, 0xbe, 0xef][..]));
        assert!(values[1].is_null());
        assert_eq!(values[2], RespValue::bulk_string(""));
        assert!(!values[2].is_null());
    }

    #[test]
    fn test_bulk_reply_containing_crlf() {
        let values = parse_all(b"$4\r\na\r\nb\r\n");
        assert_eq!(values[0], RespValue::bulk_string("a\r\nb"));
    }

    #[test]
    fn test_nested_arrays() {
        let values = parse_all(b"*2\r\n*1\r\n:1\r\n*1\r\n$-1\r\n*-1\r\n");
        assert_eq!(
            values[0],
            RespValue::array(vec![
                RespValue::array(vec![RespValue::integer(1)]),
                RespValue::array(vec![RespValue::null_bulk_string()]),
            ])
        );
        assert_eq!(values[1], RespValue::null_array());
    }

    #[test]
    fn test_incomplete_reply_is_left_in_buffer() {
        for partial in [&b"$6\r\nfoo"[..], b"*2\r\n$3\r\nfoo\r\n$3\r\nb", b":12", b"+O"] {
            let mut buf = BytesMut::from(partial);
            assert!(RespParser::parse(&mut buf).unwrap().is_none());
            assert_eq!(&buf[..], partial);
        }
    }

    #[test]
    fn test_reply_split_across_reads() {
        let mut buf = BytesMut::from(&b"*2\r\n$3\r\nfoo"[..]);
        assert!(RespParser::parse(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"\r\n:7\r\n");
        assert_eq!(
            RespParser::parse(&mut buf).unwrap(),
            Some(RespValue::array(vec![
                RespValue::bulk_string("foo"),
                RespValue::integer(7),
            ]))
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_malformed_replies() {
        let mut buf = BytesMut::from(&b"PING\r\n"[..]);
        assert!(matches!(
            RespParser::parse(&mut buf),
            Err(RespError::UnknownPrefix(b'P'))
        ));
        let mut buf = BytesMut::from(&b":abc\r\n"[..]);
        assert!(matches!(RespParser::parse(&mut buf), Err(RespError::BadInteger(_))));
        let mut buf = BytesMut::from(&b"*-5\r\n"[..]);
        assert!(matches!(RespParser::parse(&mut buf), Err(RespError::BadLength(-5))));
        let mut buf = BytesMut::from(&b"$3\r\nfooXY"[..]);
        assert!(matches!(
            RespParser::parse(&mut buf),
            Err(RespError::MissingTerminator)
        ));
    }

    #[test]
    fn test_encode_command() {
        let cmd = RespValue::array(vec![
            RespValue::bulk_string("GET"),
            RespValue::bulk_string("Brewery:frmt:name"),
        ]);
        assert_eq!(
            cmd.serialize(),
            b"*2\r\n$3\r\nGET\r\n$17\r\nBrewery:frmt:name\r\n"
        );
        assert_eq!(RespValue::null_bulk_string().serialize(), b"$-1\r\n");
        assert_eq!(RespValue::null_array().serialize(), b"*-1\r\n");
    }
}
