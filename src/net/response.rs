//! Response decoding: header/body split on the first blank line.

use crate::error::Error;

/// Splits a complete response into its header block and body.
///
/// The delimiter is the first blank line — two consecutive line terminators.
/// CRLF is what the protocol prescribes; a bare `\n\n` is accepted from
/// sloppy peers. A response with no delimiter at all is malformed and
/// reported as [`Error::Decode`].
pub fn split(raw: &[u8]) -> Result<(String, String), Error> {
    let crlf = find(raw, b"\r\n\r\n").map(|at| (at, at + 4));
    let lf = find(raw, b"\n\n").map(|at| (at, at + 2));

    let (head_end, body_start) = match (crlf, lf) {
        (Some(a), Some(b)) => {
            if a.0 < b.0 {
                a
            } else {
                b
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return Err(Error::Decode),
    };

    let head = String::from_utf8_lossy(&raw[..head_end]).into_owned();
    let body = String::from_utf8_lossy(&raw[body_start..]).into_owned();
    Ok((head, body))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
