//! Parser for `oto.ini` voicebank configuration files.
//!
//! Every non-blank line maps a sample to a lyric:
//!
//! ```text
//! de.wav=de,10,50,-200,30,15
//! ```
//!
//! An empty alias means the lyric is the file stem.

use super::lyric::CONFIG_VALUE_COUNT;
use std::path::Path;
use thiserror::Error;

/// Names a configuration file may have. Checked in this order.
pub const OTO_FILE_NAMES: [&str; 2] = ["oto.ini", "oto_ini.txt"];

/// One parsed configuration line. Numeric fields are kept as text until the entry is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtoLine<'a> {
    pub line: usize,
    pub file_name: &'a str,
    pub lyric: String,
    pub values: [&'a str; CONFIG_VALUE_COUNT],
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum OtoError {
    #[error("line {line}: missing '='")]
    MissingSeparator { line: usize },
    #[error("line {line}: expected an alias and 5 values, found {found} fields")]
    WrongFieldCount { line: usize, found: usize },
    #[error("line {line}: {message}")]
    BadEntry { line: usize, message: String },
}

impl OtoError {
    pub fn line(&self) -> usize {
        match self {
            OtoError::MissingSeparator { line }
            | OtoError::WrongFieldCount { line, .. }
            | OtoError::BadEntry { line, .. } => *line,
        }
    }
}

/// Parses the text of a configuration file. Line numbers in errors start at 1.
pub fn parse_oto(text: &str) -> Vec<Result<OtoLine<'_>, OtoError>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_line(i + 1, line.trim_start_matches('\u{feff}').trim()))
        .collect()
}

fn parse_line(line: usize, text: &str) -> Result<OtoLine<'_>, OtoError> {
    let (file_name, rest) = text
        .split_once('=')
        .ok_or(OtoError::MissingSeparator { line })?;
    let fields: Vec<&str> = rest.split(',').collect();
    let [alias, values @ ..] = &fields[..] else {
        return Err(OtoError::WrongFieldCount { line, found: 0 });
    };
    let values: [&str; CONFIG_VALUE_COUNT] =
        values
            .try_into()
            .map_err(|_| OtoError::WrongFieldCount {
                line,
                found: fields.len(),
            })?;

    let file_name = file_name.trim();
    let alias = alias.trim();
    let lyric = if alias.is_empty() {
        Path::new(file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        alias.to_string()
    };
    Ok(OtoLine {
        line,
        file_name,
        lyric,
        values,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_lines() {
        let text = "de.wav=de,10,50,-200,30,15\r\n\n- a.wav=,1,2,3,4,5\n";
        let lines = parse_oto(text);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            Ok(OtoLine {
                line: 1,
                file_name: "de.wav",
                lyric: "de".to_string(),
                values: ["10", "50", "-200", "30", "15"],
            })
        );
        let second = lines[1].as_ref().unwrap();
        assert_eq!(second.line, 3);
        assert_eq!(second.file_name, "- a.wav");
        assert_eq!(second.lyric, "- a");
    }

    #[test]
    fn test_bad_lines() {
        let lines = parse_oto("ka.wav\nki.wav=ki,1,2,3\nku.wav=ku,1,2,3,4,5,6\n");
        assert_eq!(
            lines,
            vec![
                Err(OtoError::MissingSeparator { line: 1 }),
                Err(OtoError::WrongFieldCount { line: 2, found: 4 }),
                Err(OtoError::WrongFieldCount { line: 3, found: 7 }),
            ]
        );
        assert_eq!(lines[2].as_ref().unwrap_err().line(), 3);
    }

    #[test]
    fn test_byte_order_mark() {
        let lines = parse_oto("\u{feff}a.wav=a,0,0,0,0,0");
        assert_eq!(lines[0].as_ref().unwrap().file_name, "a.wav");
    }
}
