//! APIレスポンスパーサー
//!
//! 認識APIのレスポンスからJSONを抽出し、DetectedItemの配列に変換する

use crate::error::{Error, Result};
use crate::geometry::NormalizedBox;
use crate::types::DetectedItem;
use serde_json::Value;

/// パース結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedItems {
    /// 検証を通過したカード（レスポンス順）
    pub items: Vec<DetectedItem>,
    /// 検証で除外した件数
    pub rejected: usize,
}

/// APIレスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} オブジェクト / [...] 配列（先に現れた方）
/// 3. エラー
///
/// # Examples
/// ```
/// use vocab_crop_common::extract_json;
///
/// let response = "result: {\"items\": []}";
/// assert_eq!(extract_json(response).unwrap(), "{\"items\": []}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    // ```json ... ``` ブロックを探す
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    let object_start = response.find('{');
    let array_start = response.find('[');

    let (start, close) = match (object_start, array_start) {
        (Some(o), Some(a)) if a < o => (a, ']'),
        (Some(o), _) => (o, '}'),
        (None, Some(a)) => (a, ']'),
        (None, None) => return Err(Error::Parse("JSONが見つかりません".into())),
    };

    match response.rfind(close) {
        Some(end) if end >= start => Ok(&response[start..=end]),
        _ => Err(Error::Parse("JSONが見つかりません".into())),
    }
}

/// 認識レスポンスをパース
///
/// `{"items": [...]}` と素の配列の両方を受け付ける。
/// 各要素は `word`（空でない文字列）と `box_2d`（数値4要素）のみ検証し、
/// 不正な要素は除外して件数を `rejected` に数える。
pub fn parse_recognition_response(response: &str) -> Result<ParsedItems> {
    let json_str = extract_json(response)?;
    let value: Value = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("認識結果 JSONパースエラー: {}", e)))?;

    let entries = match &value {
        Value::Array(entries) => entries,
        Value::Object(map) => match map.get("items") {
            Some(Value::Array(entries)) => entries,
            Some(Value::Null) | None => {
                return Err(Error::Parse("itemsが見つかりません".into()));
            }
            Some(_) => return Err(Error::Parse("itemsが配列ではありません".into())),
        },
        _ => return Err(Error::Parse("JSONオブジェクトではありません".into())),
    };

    let mut parsed = ParsedItems::default();
    for entry in entries {
        match to_detected_item(entry) {
            Some(item) => parsed.items.push(item),
            None => parsed.rejected += 1,
        }
    }

    Ok(parsed)
}

fn to_detected_item(entry: &Value) -> Option<DetectedItem> {
    let word = entry.get("word")?.as_str()?.trim();
    if word.is_empty() {
        return None;
    }

    let values = entry
        .get("box_2d")?
        .as_array()?
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()?;
    let box_2d = NormalizedBox::from_slice(&values).ok()?;

    Some(DetectedItem {
        word: word.to_string(),
        box_2d,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // extract_json テスト
    // =============================================

    #[test]
    fn test_extract_json_with_block() {
        let response = r#"Here is the result:
```json
{"items": [{"word": "apple", "box_2d": [0, 0, 100, 100]}]}
```
Some additional text."#;

        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.contains("apple"));
    }

    #[test]
    fn test_extract_json_raw_object() {
        let response = r#"{"items": []}"#;
        assert_eq!(extract_json(response).unwrap(), r#"{"items": []}"#);
    }

    #[test]
    fn test_extract_json_raw_array_first() {
        let response = r#"[{"word": "a", "box_2d": [0, 0, 1, 1]}]"#;
        assert_eq!(extract_json(response).unwrap(), response);
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = r#"Result: {"items": [1, 2]} done."#;
        assert_eq!(extract_json(response).unwrap(), r#"{"items": [1, 2]}"#);
    }

    #[test]
    fn test_extract_json_error() {
        let result = extract_json("No JSON here, just plain text.");
        if let Err(Error::Parse(msg)) = result {
            assert!(msg.contains("JSONが見つかりません"));
        } else {
            panic!("Expected Parse error");
        }
    }

    #[test]
    fn test_extract_json_empty_response() {
        assert!(extract_json("").is_err());
    }

    // =============================================
    // parse_recognition_response テスト
    // =============================================

    #[test]
    fn test_parse_items_object() {
        let response = r#"{
  "items": [
    {"word": "apple", "box_2d": [100, 100, 300, 300]},
    {"word": " banana ", "box_2d": [100, 400, 300, 600]},
    {"word": "cherry", "box_2d": [400, 100, 600, 300]}
  ]
}"#;
        let parsed = parse_recognition_response(response).unwrap();
        assert_eq!(parsed.rejected, 0);
        let words: Vec<&str> = parsed.items.iter().map(|i| i.word.as_str()).collect();
        assert_eq!(words, vec!["apple", "banana", "cherry"]);
        assert_eq!(parsed.items[0].box_2d, NormalizedBox::new(100.0, 100.0, 300.0, 300.0));
    }

    #[test]
    fn test_parse_bare_array() {
        let response = r#"[{"word": "dog", "box_2d": [0, 0, 500, 500]}]"#;
        let parsed = parse_recognition_response(response).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].word, "dog");
    }

    #[test]
    fn test_parse_empty_items() {
        let parsed = parse_recognition_response(r#"{"items": []}"#).unwrap();
        assert!(parsed.items.is_empty());
        assert_eq!(parsed.rejected, 0);
    }

    #[test]
    fn test_parse_rejects_invalid_entries_and_keeps_order() {
        let response = r#"{"items": [
            {"word": "one", "box_2d": [0, 0, 10, 10]},
            {"word": "short", "box_2d": [0, 0, 10]},
            {"box_2d": [0, 0, 10, 10]},
            {"word": 42, "box_2d": [0, 0, 10, 10]},
            {"word": "   ", "box_2d": [0, 0, 10, 10]},
            {"word": "text", "box_2d": ["a", 0, 10, 10]},
            {"word": "two", "box_2d": [10, 10, 20, 20]}
        ]}"#;
        let parsed = parse_recognition_response(response).unwrap();
        let words: Vec<&str> = parsed.items.iter().map(|i| i.word.as_str()).collect();
        assert_eq!(words, vec!["one", "two"]);
        assert_eq!(parsed.rejected, 5);
    }

    #[test]
    fn test_parse_missing_items_key() {
        let result = parse_recognition_response(r#"{"cards": []}"#);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_recognition_response(r#"{"items": [ {"word": }"#);
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
