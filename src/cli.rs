use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vocab_crop_common::HeaderLanguage;

#[derive(Parser)]
#[command(name = "vocab-crop")]
#[command(about = "単語カード画像のAI認識・切り抜き・一覧出力ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を認識・切り抜きしてExcel/ZIPを出力
    Run {
        /// 画像ファイルまたはフォルダ（複数可）
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 出力ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (excel/zip/both)
        #[arg(short, long, default_value = "both")]
        format: ExportFormat,

        /// 出力ファイル名（拡張子なし、デフォルト: vocab_日時）
        #[arg(short, long)]
        name: Option<String>,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,

        /// カード0件のファイルをエラーにせず完了扱いにする
        #[arg(long)]
        empty_as_completed: bool,

        /// JPEG品質 (1-100、デフォルト: 設定値)
        #[arg(short, long)]
        quality: Option<u8>,

        /// Excelヘッダーの言語 (zh/en)
        #[arg(long, value_parser = parse_header_language)]
        lang: Option<HeaderLanguage>,

        /// ZIP内のサブフォルダ名
        #[arg(long)]
        archive_folder: Option<String>,
    },

    /// 認識のみ実行して検出結果をJSONで出力
    Detect {
        /// 画像ファイルまたはフォルダ（複数可）
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// APIキーを対話入力で設定
        #[arg(long, conflicts_with = "set_api_key")]
        prompt_api_key: bool,

        /// モデル名を設定
        #[arg(long)]
        set_model: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Zip,
    #[default]
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "zip" => Ok(ExportFormat::Zip),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use excel, zip, or both", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Zip => write!(f, "zip"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}

pub fn parse_header_language(s: &str) -> Result<HeaderLanguage, String> {
    match s.to_lowercase().as_str() {
        "zh" | "cn" | "chinese" => Ok(HeaderLanguage::Zh),
        "en" | "english" => Ok(HeaderLanguage::En),
        _ => Err(format!("Unknown language: {}. Use zh or en", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("zip".parse::<ExportFormat>().unwrap(), ExportFormat::Zip);
        assert_eq!("both".parse::<ExportFormat>().unwrap(), ExportFormat::Both);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_parse_header_language() {
        assert_eq!(parse_header_language("zh").unwrap(), HeaderLanguage::Zh);
        assert_eq!(parse_header_language("EN").unwrap(), HeaderLanguage::En);
        assert!(parse_header_language("fr").is_err());
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "vocab-crop", "run", "a.jpg", "sheets", "-f", "zip", "--lang", "en", "--empty-as-completed",
        ])
        .unwrap();

        match cli.command {
            Commands::Run { inputs, format, lang, empty_as_completed, .. } => {
                assert_eq!(inputs, vec![PathBuf::from("a.jpg"), PathBuf::from("sheets")]);
                assert_eq!(format, ExportFormat::Zip);
                assert_eq!(lang, Some(HeaderLanguage::En));
                assert!(empty_as_completed);
            }
            _ => panic!("Expected Run"),
        }
    }
}
