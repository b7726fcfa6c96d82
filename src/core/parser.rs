// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/parser.rs
//!
//! Keystroke script parser
//!
//! A keystroke script describes a burst of typing compactly, for the
//! `simulate` command and for tests:
//!
//! - Plain characters are single-character keypresses, back to back
//! - `<Name>` is a named key such as `<Shift>` or `<ArrowLeft>`
//! - `<wait 120>` lets 120 ms pass
//! - `<blur>` and `<focus>` take input focus away from the editor and back
//! - `<<` types a literal `<`
//!
//! # Example
//! ```
//! use chords::core::parser::{parse_script, ScriptStep};
//! use chords::core::KeyEvent;
//! use std::time::Duration;
//!
//! let steps = parse_script("sv<wait 60>").unwrap();
//! assert_eq!(steps, vec![
//!     ScriptStep::Key(KeyEvent::Char('s')),
//!     ScriptStep::Key(KeyEvent::Char('v')),
//!     ScriptStep::Wait(Duration::from_millis(60)),
//! ]);
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, none_of, space0, space1},
    combinator::{map, map_res},
    sequence::delimited,
    IResult, Parser,
};
use std::time::Duration;
use thiserror::Error;

use crate::core::accumulator::KeyEvent;

/// Parse errors with byte offset context
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Malformed tag at offset {offset}: '{fragment}'")]
    MalformedTag { offset: usize, fragment: String },
}

/// One step of a keystroke script
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScriptStep {
    /// A keydown event
    Key(KeyEvent),
    /// Time passing with no input
    Wait(Duration),
    /// The editor loses input focus
    Blur,
    /// The editor regains input focus
    Focus,
}

/// Parse a complete keystroke script
///
/// # Returns
/// Every step in order, or the first malformed tag with its byte offset
pub fn parse_script(script: &str) -> Result<Vec<ScriptStep>, ParseError> {
    let mut steps = Vec::new();
    let mut rest = script;

    while !rest.is_empty() {
        match parse_step(rest) {
            Ok((remaining, step)) => {
                steps.push(step);
                rest = remaining;
            }
            Err(_) => {
                let fragment = match rest.find('>') {
                    Some(end) => &rest[..=end],
                    None => rest,
                };
                return Err(ParseError::MalformedTag {
                    offset: script.len() - rest.len(),
                    fragment: fragment.to_string(),
                });
            }
        }
    }

    Ok(steps)
}

/// Parse a single step
///
/// The order matters: `<<` must be tried before any tag, and `<wait N>`
/// before the generic named key.
pub fn parse_step(input: &str) -> IResult<&str, ScriptStep> {
    alt((parse_literal_lt, parse_wait, parse_tag, parse_plain_char)).parse(input)
}

/// `<<` → a literal `<` keypress
fn parse_literal_lt(input: &str) -> IResult<&str, ScriptStep> {
    map(tag("<<"), |_| ScriptStep::Key(KeyEvent::Char('<'))).parse(input)
}

/// `<wait 120>` → 120 ms of silence
fn parse_wait(input: &str) -> IResult<&str, ScriptStep> {
    map(
        delimited(
            (tag("<wait"), space1),
            map_res(digit1, |digits: &str| digits.parse::<u64>()),
            (space0, char('>')),
        ),
        |ms| ScriptStep::Wait(Duration::from_millis(ms)),
    )
    .parse(input)
}

/// `<blur>`, `<focus>` or a named key like `<Enter>`
fn parse_tag(input: &str) -> IResult<&str, ScriptStep> {
    map_res(
        delimited(
            char('<'),
            take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
            char('>'),
        ),
        |name: &str| match name {
            "blur" => Ok(ScriptStep::Blur),
            "focus" => Ok(ScriptStep::Focus),
            // A wait without its duration
            "wait" => Err("missing duration"),
            _ => Ok(ScriptStep::Key(KeyEvent::from_key(name))),
        },
    )
    .parse(input)
}

fn parse_plain_char(input: &str) -> IResult<&str, ScriptStep> {
    map(none_of("<"), |c| ScriptStep::Key(KeyEvent::Char(c))).parse(input)
}
