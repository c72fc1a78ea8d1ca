/// Replacement byte produced for each unit of a digit's value.
pub const MARKER: u8 = b'*';

/// What a single input byte becomes in the output.
///
/// The rule is pure and per-byte, which is what lets two workers derive
/// output positions independently: any prefix of the input determines the
/// output offset of the byte that follows it, no matter who writes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rewrite {
    /// ASCII letter, replaced by its uppercase form.
    Upper(u8),
    /// ASCII digit `d`, replaced by `d` marker bytes. `0` produces none.
    Markers(u8),
    /// Any other byte, copied through unchanged.
    Copy(u8),
}

impl Rewrite {
    /// Number of output bytes this rewrite produces.
    #[inline]
    pub fn out_len(self) -> usize {
        match self {
            Rewrite::Upper(_) | Rewrite::Copy(_) => 1,
            Rewrite::Markers(n) => n as usize,
        }
    }
}

/// Classify one input byte. ASCII-only: bytes outside the ASCII letter and
/// digit ranges pass through, including UTF-8 continuation bytes.
#[inline]
pub fn rewrite(byte: u8) -> Rewrite {
    if byte.is_ascii_alphabetic() {
        Rewrite::Upper(byte.to_ascii_uppercase())
    } else if byte.is_ascii_digit() {
        Rewrite::Markers(byte - b'0')
    } else {
        Rewrite::Copy(byte)
    }
}

/// Exact output length of the transform over `input`.
/// Letters and passthrough bytes contribute one byte each; a digit `d`
/// contributes `d`. Runs to completion before any output buffer is sized;
/// the buffer never grows mid-transform.
pub fn output_len(input: &[u8]) -> usize {
    input.iter().map(|&b| rewrite(b).out_len()).sum()
}

/// Sequential reference application of the rule.
/// The cooperative engine in `transform` must produce exactly these bytes.
pub fn apply(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(output_len(input));
    for &byte in input {
        match rewrite(byte) {
            Rewrite::Upper(b) | Rewrite::Copy(b) => output.push(b),
            Rewrite::Markers(n) => {
                for _ in 0..n {
                    output.push(MARKER);
                }
            }
        }
    }
    output
}
