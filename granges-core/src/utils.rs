use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::errors::Result;

///
/// Compare two strings in natural (numeric-aware) order, so that
/// `chr2` sorts before `chr10`.
///
/// Runs of ASCII digits are compared by numeric value, everything else
/// byte-wise. Strings that are numerically equal but spelled differently
/// (`chr01` vs `chr1`) fall back to plain lexical order, which keeps the
/// ordering consistent with `Eq`.
///
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut x, mut y) = (a.as_bytes(), b.as_bytes());

    loop {
        match (x.first(), y.first()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(cx), Some(cy)) if cx.is_ascii_digit() && cy.is_ascii_digit() => {
                let (run_x, rest_x) = split_digit_run(x);
                let (run_y, rest_y) = split_digit_run(y);

                let ord = cmp_digit_runs(run_x, run_y);
                if ord != Ordering::Equal {
                    return ord;
                }
                x = rest_x;
                y = rest_y;
            }
            (Some(cx), Some(cy)) => {
                if cx != cy {
                    return cx.cmp(cy);
                }
                x = &x[1..];
                y = &y[1..];
            }
        }
    }
}

fn split_digit_run(s: &[u8]) -> (&[u8], &[u8]) {
    let end = s.iter().position(|c| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn cmp_digit_runs(x: &[u8], y: &[u8]) -> Ordering {
    let trim = |s: &[u8]| -> usize { s.iter().take_while(|&&c| c == b'0').count() };
    let x = &x[trim(x)..];
    let y = &y[trim(y)..];

    // no leading zeros left, so a longer run is a larger number
    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
}

///
/// Sort a list of strings in natural order, in place.
///
pub fn natural_sort<S: AsRef<str>>(values: &mut [S]) {
    values.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path)?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Get a reader for a gzipped file, a plain file, or stdin when `file_path_str` is `-`.
pub fn get_dynamic_reader_w_stdin(file_path_str: &str) -> Result<BufReader<Box<dyn Read>>> {
    if file_path_str == "-" {
        Ok(BufReader::new(Box::new(std::io::stdin()) as Box<dyn Read>))
    } else {
        get_dynamic_reader(Path::new(file_path_str))
    }
}
