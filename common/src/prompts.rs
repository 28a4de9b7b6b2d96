//! プロンプト生成モジュール
//!
//! 認識APIに渡す固定指示文と構造化レスポンスのスキーマ

use serde_json::{json, Value};

/// 認識用の固定プロンプト
pub const RECOGNITION_PROMPT: &str = r#"This image is a vocabulary sheet made of cards. Each card shows one illustration and the word that names it.

For every card, return:
- "word": the word printed on the card, exactly as written (no numbering, no translation)
- "box_2d": the bounding box of the card's illustration only (exclude the printed word), as [ymin, xmin, ymax, xmax] normalized to 0-1000

List the cards in reading order: left to right, then top to bottom.
Output ONLY JSON in this exact shape:
{"items": [{"word": "apple", "box_2d": [ymin, xmin, ymax, xmax]}]}
If there are no cards, output {"items": []}."#;

/// 構造化レスポンスのスキーマ（Gemini responseSchema形式）
pub fn recognition_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "items": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": { "type": "STRING" },
                        "box_2d": {
                            "type": "ARRAY",
                            "items": { "type": "NUMBER" }
                        }
                    },
                    "required": ["word", "box_2d"]
                }
            }
        },
        "required": ["items"]
    })
}
