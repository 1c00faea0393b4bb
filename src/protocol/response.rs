//! Reply line definitions
//!
//! Classifies a single line received from the server.

/// One reply line from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyLine {
    /// `VALUE <key> <flags> <bytes> [<cas>]`
    Value { key: String, flags: u32, len: usize },
    Stored,
    NotStored,
    Exists,
    NotFound,
    Deleted,
    End,
    /// Unknown command
    Error,
    ClientError(String),
    ServerError(String),
    /// Anything else, including a `VALUE` header that cannot be framed
    Other(String),
}

impl ReplyLine {
    /// Classify a trimmed line.
    ///
    /// `STORED` is matched case-insensitively; every other keyword exactly.
    pub fn parse(line: &[u8]) -> Self {
        if line.eq_ignore_ascii_case(b"STORED") {
            return ReplyLine::Stored;
        }

        match line {
            b"NOT_STORED" => return ReplyLine::NotStored,
            b"EXISTS" => return ReplyLine::Exists,
            b"NOT_FOUND" => return ReplyLine::NotFound,
            b"DELETED" => return ReplyLine::Deleted,
            b"END" => return ReplyLine::End,
            b"ERROR" => return ReplyLine::Error,
            _ => {}
        }

        let text = String::from_utf8_lossy(line);
        if let Some(msg) = text.strip_prefix("CLIENT_ERROR") {
            return ReplyLine::ClientError(msg.trim().to_string());
        }
        if let Some(msg) = text.strip_prefix("SERVER_ERROR") {
            return ReplyLine::ServerError(msg.trim().to_string());
        }
        if let Some(header) = parse_value_header(&text) {
            return header;
        }

        ReplyLine::Other(text.into_owned())
    }

    /// Lines that end a retrieval response
    pub fn is_terminator(&self) -> bool {
        matches!(self, ReplyLine::End | ReplyLine::Error)
    }
}

fn parse_value_header(text: &str) -> Option<ReplyLine> {
    let mut tokens = text.split_ascii_whitespace();
    if tokens.next()? != "VALUE" {
        return None;
    }
    let key = tokens.next()?.to_string();
    let flags = tokens.next()?.parse().ok()?;
    let len = tokens.next()?.parse().ok()?;
    Some(ReplyLine::Value { key, flags, len })
}
