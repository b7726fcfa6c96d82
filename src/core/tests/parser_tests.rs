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

//! Parser module tests
//!
//! Tests for parsing keystroke scripts:
//! - Plain characters and literal `<`
//! - Named keys, focus changes and waits
//! - Error offsets for malformed tags

use crate::core::{accumulator::KeyEvent, parser::*};
use std::time::Duration;

fn key(c: char) -> ScriptStep {
    ScriptStep::Key(KeyEvent::Char(c))
}

#[test]
fn test_parse_plain_characters() {
    assert_eq!(parse_script("sv").unwrap(), vec![key('s'), key('v')]);
    assert_eq!(parse_script("").unwrap(), Vec::<ScriptStep>::new());
}

#[test]
fn test_parse_literal_lt() {
    assert_eq!(parse_script("a<<b").unwrap(), vec![key('a'), key('<'), key('b')]);
}

#[test]
fn test_parse_named_key() {
    assert_eq!(
        parse_script("<Shift>a").unwrap(),
        vec![ScriptStep::Key(KeyEvent::Named("Shift".to_string())), key('a')]
    );
}

#[test]
fn test_parse_single_char_tag_is_char() {
    assert_eq!(parse_script("<x>").unwrap(), vec![key('x')]);
}

#[test]
fn test_parse_wait() {
    assert!(matches!(
        parse_step("<wait 120>rest"),
        Ok(("rest", ScriptStep::Wait(d))) if d == Duration::from_millis(120)
    ));
    assert_eq!(
        parse_script("<wait   5 >").unwrap(),
        vec![ScriptStep::Wait(Duration::from_millis(5))]
    );
}

#[test]
fn test_parse_focus_changes() {
    assert_eq!(
        parse_script("a<blur>b<focus>").unwrap(),
        vec![key('a'), ScriptStep::Blur, key('b'), ScriptStep::Focus]
    );
}

#[test]
fn test_parse_non_ascii_and_whitespace() {
    assert_eq!(parse_script("é ").unwrap(), vec![key('é'), key(' ')]);
}

#[test]
fn test_unterminated_tag_reports_offset() {
    let err = parse_script("ab<Shift").unwrap_err();
    assert_eq!(
        err,
        ParseError::MalformedTag {
            offset: 2,
            fragment: "<Shift".to_string(),
        }
    );
}

#[test]
fn test_wait_without_duration_is_error() {
    let err = parse_script("x<wait>").unwrap_err();
    assert!(matches!(err, ParseError::MalformedTag { offset: 1, .. }));
    assert!(err.to_string().contains("<wait>"));
}

#[test]
fn test_wait_with_bad_number_is_error() {
    assert!(parse_script("<wait soon>").is_err());
    assert!(parse_script("<wait 99999999999999999999999>").is_err());
}

#[test]
fn test_empty_tag_is_error() {
    assert!(parse_script("<>").is_err());
}
