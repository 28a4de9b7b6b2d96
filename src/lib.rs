//! 単語カード画像のAI認識・切り抜き・一覧出力
//!
//! 単語シートの画像を認識APIに送り、カードごとの単語とボックスを受け取って
//! イラストを切り抜き、Excel（単語一覧）とZIP（画像）に書き出す。

pub mod cli;
pub mod config;
pub mod cropper;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod progress;
pub mod recognizer;
pub mod scanner;
