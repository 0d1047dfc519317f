//! Source dedicated server log datagrams.
//!
//! Each packet is `FF FF FF FF`, a type byte (`R` plain, `S` when the server
//! uses a log secret, followed by the secret), then `L <timestamp>: <text>`
//! terminated by a newline and a NUL.

const HEADER: [u8; 4] = [0xFF; 4];
const PLAIN: u8 = b'R';
const SECRET: u8 = b'S';

/// Extracts the log text from a datagram.
///
/// Datagrams without the header are taken as bare text. Invalid UTF-8 is
/// replaced rather than rejected.
pub fn decode_datagram(data: &[u8]) -> String {
    let mut body = data;
    if let Some(rest) = body.strip_prefix(&HEADER[..]) {
        body = match rest.first() {
            Some(&PLAIN) => &rest[1..],
            Some(&SECRET) => skip_secret(&rest[1..]),
            _ => rest,
        };
    }

    String::from_utf8_lossy(body)
        .trim_end_matches(['\0', '\n', '\r'])
        .to_string()
}

// The secret runs up to the "L " that opens the log line.
fn skip_secret(data: &[u8]) -> &[u8] {
    data.windows(2)
        .position(|pair| pair == b"L ")
        .map_or(data, |ix| &data[ix..])
}
