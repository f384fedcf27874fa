//! In-process string scanners for ASCII and UTF-16LE runs.
//!
//! Used when the `strings` binary is unavailable. Run rules follow
//! `strings -n <min>`: printable ASCII plus tab and space.

/// Byte accepted inside a printable run.
fn is_run_byte(b: u8) -> bool {
    (b.is_ascii_graphic() || b == b'\t' || b == b' ') && b != 0x7f
}

/// Printable ASCII runs of at least `min_len` bytes, in file order.
pub fn scan_ascii(data: &[u8], min_len: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur: Vec<u8> = Vec::new();
    for &b in data {
        if is_run_byte(b) {
            cur.push(b);
        } else {
            flush(&mut cur, min_len, &mut out);
        }
    }
    flush(&mut cur, min_len, &mut out);
    out
}

/// UTF-16LE runs of printable ASCII code units, at least `min_len` characters.
pub fn scan_utf16le(data: &[u8], min_len: usize) -> Vec<String> {
    let mut out = Vec::new();
    // Both alignments, merged by starting offset so output stays in file order.
    let mut found: Vec<(usize, String)> = Vec::new();
    for align in 0..2 {
        let mut cur: Vec<u8> = Vec::new();
        let mut start = align;
        let mut i = align;
        while i + 1 < data.len() {
            let (lo, hi) = (data[i], data[i + 1]);
            if hi == 0 && is_run_byte(lo) {
                if cur.is_empty() {
                    start = i;
                }
                cur.push(lo);
            } else if !cur.is_empty() {
                if cur.len() >= min_len {
                    found.push((start, String::from_utf8_lossy(&cur).into_owned()));
                }
                cur.clear();
            }
            i += 2;
        }
        if cur.len() >= min_len {
            found.push((start, String::from_utf8_lossy(&cur).into_owned()));
        }
    }
    found.sort_by_key(|(offset, _)| *offset);
    out.extend(found.into_iter().map(|(_, s)| s));
    out
}

fn flush(cur: &mut Vec<u8>, min_len: usize, out: &mut Vec<String>) {
    if cur.len() >= min_len {
        out.push(String::from_utf8_lossy(cur).into_owned());
    }
    cur.clear();
}
