//! Decoding of recognition-server replies into [`Card`] values.
//!
//! Two reply shapes exist: a single `{"suit": .., "rank": ..}` object, and an
//! object carrying a `"result"` array of such objects. An object with neither
//! shape is the server's "no card found" answer and decodes to nothing.

use crate::model::card::Card;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unrecognized card suit: {0:?}")]
    UnknownSuit(String),
    #[error("unrecognized card rank: {0:?}")]
    UnknownRank(String),
    #[error("detection is missing the {0:?} field")]
    MissingField(&'static str),
    #[error("not a card: {0:?}")]
    InvalidCard(String),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("malformed recognition response: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseForm {
    Single,
    Batch,
    NoDetection,
}

#[derive(Debug)]
pub struct RejectedDetection {
    pub index: usize,
    pub error: ParseError,
}

/// Cards decoded from one reply plus any array entries that failed to decode.
#[derive(Debug)]
pub struct ParsedResponse {
    pub form: ResponseForm,
    pub cards: Vec<Card>,
    pub rejected: Vec<RejectedDetection>,
}

impl ParsedResponse {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Decode a reply body. A bad code fails the whole reply in the single-object
/// form but only its own entry in the array form.
pub fn parse_response(json: &str) -> Result<ParsedResponse, ParseError> {
    let body: Value = serde_json::from_str(json)?;
    parse_value(&body)
}

pub fn parse_value(body: &Value) -> Result<ParsedResponse, ParseError> {
    let Some(object) = body.as_object() else {
        return Err(ParseError::UnexpectedShape(format!(
            "expected a JSON object, found {}",
            kind_of(body)
        )));
    };

    if let Some(result) = object.get("result") {
        let Some(entries) = result.as_array() else {
            return Err(ParseError::UnexpectedShape(format!(
                "\"result\" must be an array, found {}",
                kind_of(result)
            )));
        };
        return Ok(parse_batch(entries));
    }

    if object.contains_key("suit") || object.contains_key("rank") {
        let card = parse_detection(object)?;
        return Ok(ParsedResponse {
            form: ResponseForm::Single,
            cards: vec![card],
            rejected: Vec::new(),
        });
    }

    Ok(ParsedResponse {
        form: ResponseForm::NoDetection,
        cards: Vec::new(),
        rejected: Vec::new(),
    })
}

fn parse_batch(entries: &[Value]) -> ParsedResponse {
    let mut cards = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        let decoded = match entry.as_object() {
            Some(object) => parse_detection(object),
            None => Err(ParseError::UnexpectedShape(format!(
                "detection must be an object, found {}",
                kind_of(entry)
            ))),
        };
        match decoded {
            Ok(card) => cards.push(card),
            Err(error) => {
                event!(
                    target: "cardcount::detection",
                    Level::WARN,
                    index,
                    %error,
                    "discarding malformed detection"
                );
                rejected.push(RejectedDetection { index, error });
            }
        }
    }
    ParsedResponse {
        form: ResponseForm::Batch,
        cards,
        rejected,
    }
}

fn parse_detection(object: &Map<String, Value>) -> Result<Card, ParseError> {
    let suit = string_field(object, "suit")?;
    let rank = string_field(object, "rank")?;
    Card::from_codes(suit, rank)
}

fn string_field<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ParseError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or(ParseError::MissingField(field))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Rank, Suit};

    #[test]
    fn single_object_decodes_one_card() {
        let parsed = parse_response(r#"{"suit":"H","rank":"K"}"#).unwrap();
        assert_eq!(parsed.form, ResponseForm::Single);
        assert_eq!(parsed.cards, vec![Card::new(Rank::King, Suit::Hearts)]);
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn single_object_with_bad_suit_fails_whole_reply() {
        let err = parse_response(r#"{"suit":"X","rank":"K"}"#).unwrap_err();
        assert!(matches!(err, ParseError::UnknownSuit(code) if code == "X"));
    }

    #[test]
    fn single_object_missing_rank_fails() {
        let err = parse_response(r#"{"suit":"S"}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("rank")));
    }

    #[test]
    fn batch_keeps_good_siblings() {
        let parsed = parse_response(
            r#"{"result":[{"suit":"S","rank":"10"},{"suit":"*","rank":"*"},{"suit":"D","rank":"A"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.form, ResponseForm::Batch);
        assert_eq!(
            parsed.cards,
            vec![
                Card::new(Rank::Ten, Suit::Spades),
                Card::new(Rank::Ace, Suit::Diamonds)
            ]
        );
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.rejected[0].index, 1);
    }

    #[test]
    fn empty_batch_is_not_an_error() {
        let parsed = parse_response(r#"{"result":[]}"#).unwrap();
        assert!(parsed.is_empty());
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn reply_without_card_fields_means_nothing_found() {
        let parsed = parse_response(r#"{"height":480,"width":640}"#).unwrap();
        assert_eq!(parsed.form, ResponseForm::NoDetection);
        assert!(parsed.is_empty());
    }

    #[test]
    fn malformed_shapes_are_rejected() {
        assert!(matches!(parse_response("not json"), Err(ParseError::Json(_))));
        assert!(matches!(
            parse_response("[]"),
            Err(ParseError::UnexpectedShape(_))
        ));
        assert!(matches!(
            parse_response(r#"{"result":{"suit":"H","rank":"2"}}"#),
            Err(ParseError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn noncanonical_codes_are_not_cards() {
        for reply in [
            r#"{"suit":"H","rank":"05"}"#,
            r#"{"suit":"H","rank":"+5"}"#,
            r#"{"suit":"h","rank":"k"}"#,
            r#"{"suit":" S ","rank":"010"}"#,
        ] {
            assert!(parse_response(reply).is_err(), "{reply} decoded to a card");
        }

        let parsed = parse_response(
            r#"{"result":[{"suit":"H","rank":"05"},{"suit":"h","rank":"K"},{"suit":"H","rank":"5"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.cards, vec![Card::new(Rank::Five, Suit::Hearts)]);
        assert_eq!(parsed.rejected.len(), 2);
        assert!(matches!(
            &parsed.rejected[0].error,
            ParseError::UnknownRank(code) if code == "05"
        ));
        assert!(matches!(
            &parsed.rejected[1].error,
            ParseError::UnknownSuit(code) if code == "h"
        ));
    }

    #[test]
    fn batch_entry_that_is_not_an_object_is_rejected_alone() {
        let parsed = parse_response(r#"{"result":["KH",{"suit":"C","rank":"3"}]}"#).unwrap();
        assert_eq!(parsed.cards, vec![Card::new(Rank::Three, Suit::Clubs)]);
        assert_eq!(parsed.rejected.len(), 1);
    }
}
